//! Key-to-byte encoding and app keybindings.
//!
//! The GUI frontend owns raw key capture; it hands the core a decoded
//! [`KeyEvent`] (via the C ABI's `send_key(key_u8, mods_u8)`) and the
//! core is responsible for everything downstream: either dispatching
//! to an app keybinding or turning the event into the xterm byte
//! sequence a PTY expects.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Esc,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub super_: bool,
}

impl Modifiers {
    /// Bit 0=shift 1=alt 2=ctrl 3=super, matching the ABI's `mods_u8`.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            shift: bits & 0b0001 != 0,
            alt: bits & 0b0010 != 0,
            ctrl: bits & 0b0100 != 0,
            super_: bits & 0b1000 != 0,
        }
    }

    pub fn to_bits(self) -> u8 {
        (self.shift as u8) | (self.alt as u8) << 1 | (self.ctrl as u8) << 2 | (self.super_ as u8) << 3
    }

    pub fn any(self) -> bool {
        self.ctrl || self.alt || self.shift || self.super_
    }

    /// xterm modifier parameter: `1 + shift + 2*alt + 4*ctrl`.
    pub fn xterm_param(self) -> u8 {
        1 + self.shift as u8 + 2 * self.alt as u8 + 4 * self.ctrl as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub mods: Modifiers,
}

impl KeyEvent {
    pub fn new(key: KeyCode, mods: Modifiers) -> Self {
        Self { key, mods }
    }
}

fn esc_prefixed(alt: bool, rest: &[u8], out: &mut Vec<u8>) {
    if alt {
        out.push(0x1b);
    }
    out.extend_from_slice(rest);
}

/// Shift-mapped US-QWERTY table for printable ASCII.
fn shift_char(c: char) -> char {
    match c {
        '1' => '!',
        '2' => '@',
        '3' => '#',
        '4' => '$',
        '5' => '%',
        '6' => '^',
        '7' => '&',
        '8' => '*',
        '9' => '(',
        '0' => ')',
        '-' => '_',
        '=' => '+',
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        ';' => ':',
        '\'' => '"',
        ',' => '<',
        '.' => '>',
        '/' => '?',
        '`' => '~',
        c if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
        c => c,
    }
}

/// `ESC [ <letter>` for unmodified arrows/home/end, or
/// `ESC [ 1 ; <m> <letter>` when any modifier is present.
fn arrow_like(letter: u8, mods: Modifiers, out: &mut Vec<u8>) {
    out.push(0x1b);
    out.push(b'[');
    if mods.any() {
        out.extend_from_slice(format!("1;{}", mods.xterm_param()).as_bytes());
    }
    out.push(letter);
}

/// `ESC [ <vt> ~` unmodified, or `ESC [ <vt> ; <m> ~` with a modifier
/// Used for PageUp/Down/Insert/Delete and F5..F12.
fn tilde_like(vt: u8, mods: Modifiers, out: &mut Vec<u8>) {
    out.push(0x1b);
    out.push(b'[');
    if mods.any() {
        out.extend_from_slice(format!("{vt};{}", mods.xterm_param()).as_bytes());
    } else {
        out.extend_from_slice(vt.to_string().as_bytes());
    }
    out.push(b'~');
}

/// Translate a decoded key event into the byte sequence written to the
/// focused pane's PTY.
pub fn key_event_to_bytes(event: KeyEvent) -> Vec<u8> {
    let KeyEvent { key, mods } = event;
    let mut out = Vec::with_capacity(8);

    match key {
        KeyCode::Char(c) if mods.ctrl && c.is_ascii_alphabetic() => {
            let byte = (c.to_ascii_lowercase() as u8) - b'a' + 1;
            esc_prefixed(mods.alt, &[byte], &mut out);
        }
        KeyCode::Char(c) => {
            let actual = if mods.shift { shift_char(c) } else { c };
            let mut buf = [0u8; 4];
            let s = actual.encode_utf8(&mut buf);
            esc_prefixed(mods.alt, s.as_bytes(), &mut out);
        }
        KeyCode::Enter => esc_prefixed(mods.alt, b"\r", &mut out),
        KeyCode::Tab if mods.shift => out.extend_from_slice(b"\x1b[Z"),
        KeyCode::Tab => esc_prefixed(mods.alt, b"\t", &mut out),
        KeyCode::Esc => out.push(0x1b),
        KeyCode::Backspace if mods.ctrl => out.push(0x08),
        KeyCode::Backspace => esc_prefixed(mods.alt, &[0x7f], &mut out),
        KeyCode::Up => arrow_like(b'A', mods, &mut out),
        KeyCode::Down => arrow_like(b'B', mods, &mut out),
        KeyCode::Right => arrow_like(b'C', mods, &mut out),
        KeyCode::Left => arrow_like(b'D', mods, &mut out),
        KeyCode::Home => arrow_like(b'H', mods, &mut out),
        KeyCode::End => arrow_like(b'F', mods, &mut out),
        KeyCode::PageUp => tilde_like(5, mods, &mut out),
        KeyCode::PageDown => tilde_like(6, mods, &mut out),
        KeyCode::Insert => tilde_like(2, mods, &mut out),
        KeyCode::Delete => tilde_like(3, mods, &mut out),
        KeyCode::F1 => function_key_1_to_4(b'P', mods, &mut out),
        KeyCode::F2 => function_key_1_to_4(b'Q', mods, &mut out),
        KeyCode::F3 => function_key_1_to_4(b'R', mods, &mut out),
        KeyCode::F4 => function_key_1_to_4(b'S', mods, &mut out),
        KeyCode::F5 => tilde_like(15, mods, &mut out),
        KeyCode::F6 => tilde_like(17, mods, &mut out),
        KeyCode::F7 => tilde_like(18, mods, &mut out),
        KeyCode::F8 => tilde_like(19, mods, &mut out),
        KeyCode::F9 => tilde_like(20, mods, &mut out),
        KeyCode::F10 => tilde_like(21, mods, &mut out),
        KeyCode::F11 => tilde_like(23, mods, &mut out),
        KeyCode::F12 => tilde_like(24, mods, &mut out),
    }
    out
}

/// `ESC O <letter>` unmodified, or `ESC [ 1 ; <m> <letter>` with a
/// modifier.
fn function_key_1_to_4(letter: u8, mods: Modifiers, out: &mut Vec<u8>) {
    if mods.any() {
        out.push(0x1b);
        out.push(b'[');
        out.extend_from_slice(format!("1;{}", mods.xterm_param()).as_bytes());
        out.push(letter);
    } else {
        out.push(0x1b);
        out.push(b'O');
        out.push(letter);
    }
}

/// App-level keybindings: all require `Ctrl+Shift`
/// with no Super, and are consumed by the controller before the event
/// reaches [`key_event_to_bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKeybinding {
    NewPane,
    ClosePane,
    NavigateUp,
    NavigateDown,
    NavigateLeft,
    NavigateRight,
    JumpToPane(u8),
    RenamePane,
    BroadcastToggle,
    FontSizeIncrease,
    FontSizeDecrease,
    CommandOverlayToggle,
    HelpToggle,
}

/// Match an event against the fixed app-keybinding table. Returns
/// `None` for anything that isn't `Ctrl+Shift` (no `Super`), or that
/// doesn't match a bound key.
pub fn match_app_keybinding(event: KeyEvent) -> Option<AppKeybinding> {
    let mods = event.mods;
    if !mods.ctrl || !mods.shift || mods.super_ {
        return None;
    }
    match event.key {
        KeyCode::Char('n') | KeyCode::Char('N') => Some(AppKeybinding::NewPane),
        KeyCode::Char('w') | KeyCode::Char('W') => Some(AppKeybinding::ClosePane),
        KeyCode::Up => Some(AppKeybinding::NavigateUp),
        KeyCode::Down => Some(AppKeybinding::NavigateDown),
        KeyCode::Left => Some(AppKeybinding::NavigateLeft),
        KeyCode::Right => Some(AppKeybinding::NavigateRight),
        KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
            Some(AppKeybinding::JumpToPane(c as u8 - b'0'))
        }
        KeyCode::Char('r') | KeyCode::Char('R') => Some(AppKeybinding::RenamePane),
        KeyCode::Char('b') | KeyCode::Char('B') => Some(AppKeybinding::BroadcastToggle),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(AppKeybinding::FontSizeIncrease),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(AppKeybinding::FontSizeDecrease),
        KeyCode::Enter => Some(AppKeybinding::CommandOverlayToggle),
        KeyCode::Char('/') => Some(AppKeybinding::HelpToggle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl(key: KeyCode) -> KeyEvent {
        KeyEvent::new(
            key,
            Modifiers {
                ctrl: true,
                ..Default::default()
            },
        )
    }

    #[test]
    fn ctrl_a_is_0x01() {
        assert_eq!(key_event_to_bytes(ctrl(KeyCode::Char('a'))), vec![0x01]);
    }

    #[test]
    fn ctrl_right_is_escape_1_5_c() {
        let mods = Modifiers {
            ctrl: true,
            ..Default::default()
        };
        let event = KeyEvent::new(KeyCode::Right, mods);
        assert_eq!(key_event_to_bytes(event), b"\x1b[1;5C".to_vec());
    }

    #[test]
    fn f5_is_escape_1_5_tilde() {
        let event = KeyEvent::new(KeyCode::F5, Modifiers::default());
        assert_eq!(key_event_to_bytes(event), b"\x1b[15~".to_vec());
    }

    #[test]
    fn enter_is_cr() {
        let event = KeyEvent::new(KeyCode::Enter, Modifiers::default());
        assert_eq!(key_event_to_bytes(event), b"\r".to_vec());
    }

    #[test]
    fn shift_tab_is_back_tab_sequence() {
        let mods = Modifiers {
            shift: true,
            ..Default::default()
        };
        let event = KeyEvent::new(KeyCode::Tab, mods);
        assert_eq!(key_event_to_bytes(event), b"\x1b[Z".to_vec());
    }

    #[test]
    fn backspace_is_del_unless_ctrl() {
        assert_eq!(
            key_event_to_bytes(KeyEvent::new(KeyCode::Backspace, Modifiers::default())),
            vec![0x7f]
        );
        assert_eq!(key_event_to_bytes(ctrl(KeyCode::Backspace)), vec![0x08]);
    }

    #[test]
    fn shifted_digit_maps_to_symbol() {
        let mods = Modifiers {
            shift: true,
            ..Default::default()
        };
        let event = KeyEvent::new(KeyCode::Char('1'), mods);
        assert_eq!(key_event_to_bytes(event), b"!".to_vec());
    }

    #[test]
    fn key_byte_round_trip_table() {
        // A sampling of the full key-byte encoding table.
        let cases: &[(KeyEvent, &[u8])] = &[
            (ctrl(KeyCode::Char('z')), &[0x1a]),
            (
                KeyEvent::new(KeyCode::Up, Modifiers::default()),
                b"\x1b[A",
            ),
            (
                KeyEvent::new(KeyCode::Home, Modifiers::default()),
                b"\x1b[H",
            ),
            (
                KeyEvent::new(KeyCode::PageDown, Modifiers::default()),
                b"\x1b[6~",
            ),
            (KeyEvent::new(KeyCode::F12, Modifiers::default()), b"\x1b[24~"),
            (KeyEvent::new(KeyCode::F1, Modifiers::default()), b"\x1bOP"),
            (KeyEvent::new(KeyCode::Esc, Modifiers::default()), &[0x1b]),
        ];
        for (event, expected) in cases {
            assert_eq!(&key_event_to_bytes(*event), expected);
        }
    }

    #[test]
    fn app_keybinding_requires_ctrl_shift_no_super() {
        let mods = Modifiers {
            ctrl: true,
            shift: true,
            ..Default::default()
        };
        let event = KeyEvent::new(KeyCode::Char('n'), mods);
        assert_eq!(match_app_keybinding(event), Some(AppKeybinding::NewPane));

        let mods_with_super = Modifiers {
            ctrl: true,
            shift: true,
            super_: true,
            ..Default::default()
        };
        let event2 = KeyEvent::new(KeyCode::Char('n'), mods_with_super);
        assert_eq!(match_app_keybinding(event2), None);
    }

    #[test]
    fn mods_bits_round_trip() {
        let mods = Modifiers {
            ctrl: true,
            shift: true,
            alt: false,
            super_: true,
        };
        assert_eq!(Modifiers::from_bits(mods.to_bits()), mods);
    }
}
