//! The stable C ABI shim (`spec.md` §4.I, §6.5).
//!
//! A flat set of `extern "C"` functions, all taking an opaque
//! `*mut TermaniaHandle`. Every rule in `spec.md` §4.I/§7 is enforced
//! here and nowhere else: a null handle yields a safe default, every
//! pointer argument is bounds-checked before use, every string output
//! writes at most `max` bytes without a null-terminator guarantee
//! (length is the return value), and no Rust panic is ever allowed to
//! unwind across the boundary — [`guard`] catches it and logs instead.
//!
//! This is the only place in the workspace that deals in raw
//! pointers; everything it calls into (`termania_core`) is ordinary
//! safe Rust.

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::slice;

use termania_core::config::Config;
use termania_core::controller::{Controller, GuiAction};
use termania_core::grid::LayoutConfig;
use termania_core::keymap::{KeyCode, KeyEvent, Modifiers};
use termania_core::llm::LlmStatus;

/// Opaque handle returned by `termania_create`/`termania_create_with_config`.
/// The GUI frontend only ever holds the pointer; it never reaches
/// inside.
pub struct TermaniaHandle {
    controller: Controller,
    /// Persistent, NUL-terminated buffer backing
    /// [`termania_font_family`] — the one accessor the ABI documents
    /// as returning a pointer with a lifetime longer than the call
    /// (`spec.md` §4.I), kept alive as long as the handle is.
    font_family: CString,
}

/// Run `f`, catching any panic so it never unwinds across the ABI
/// boundary (`spec.md` §4.I/§7: ABI entry points are infallible at the
/// signature level). On panic, logs and returns `default`.
fn guard<R>(default: R, f: impl FnOnce() -> R) -> R {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            tracing::error!("panic caught at the C ABI boundary, returning a safe default");
            default
        }
    }
}

/// Copy as much of `s` as fits into `buf[..max]`. Returns the number
/// of bytes written; never null-terminates (`spec.md` §4.I).
unsafe fn write_str(s: &str, buf: *mut u8, max: u32) -> u32 {
    if buf.is_null() || max == 0 {
        return 0;
    }
    let bytes = s.as_bytes();
    let n = bytes.len().min(max as usize);
    let dst = slice::from_raw_parts_mut(buf, n);
    dst.copy_from_slice(&bytes[..n]);
    n as u32
}

unsafe fn read_str<'a>(ptr: *const u8, len: u32) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    let bytes = slice::from_raw_parts(ptr, len as usize);
    std::str::from_utf8(bytes).ok()
}

/// Create a controller with defaults (`spec.md` §4.H "startup"). Never
/// returns null except on allocation failure (`spec.md` §7 "the only
/// fatal condition").
#[no_mangle]
pub extern "C" fn termania_create() -> *mut TermaniaHandle {
    guard(std::ptr::null_mut(), || {
        let mut controller = Controller::new(Config::default());
        controller.start();
        new_handle(controller)
    })
}

/// Create a controller from a TOML config file at `path` (NUL-terminated
/// UTF-8 path). Falls back to defaults if the file is unreadable or
/// malformed, matching `spec.md` §1's "config parsing is a pure
/// function" framing: a bad config is never a fatal error for the ABI.
///
/// # Safety
/// `path` must be a valid pointer to a NUL-terminated C string, or null.
#[no_mangle]
pub unsafe extern "C" fn termania_create_with_config(path: *const c_char) -> *mut TermaniaHandle {
    guard(std::ptr::null_mut(), || {
        let config = if path.is_null() {
            Config::default()
        } else {
            let c_str = std::ffi::CStr::from_ptr(path);
            match c_str.to_str().ok().and_then(|p| std::fs::read_to_string(p).ok()) {
                Some(bytes) => Config::from_toml_str(&bytes).unwrap_or_default(),
                None => Config::default(),
            }
        };
        let mut controller = Controller::new(config);
        controller.start();
        new_handle(controller)
    })
}

fn new_handle(controller: Controller) -> *mut TermaniaHandle {
    let font_family = CString::new("monospace").unwrap_or_default();
    Box::into_raw(Box::new(TermaniaHandle {
        controller,
        font_family,
    }))
}

/// Destroy a controller created by `termania_create*`. Null is a no-op.
///
/// # Safety
/// `handle` must be a pointer previously returned by `termania_create*`
/// and not yet destroyed.
#[no_mangle]
pub unsafe extern "C" fn termania_destroy(handle: *mut TermaniaHandle) {
    guard((), || {
        if !handle.is_null() {
            drop(Box::from_raw(handle));
        }
    })
}

/// # Safety
/// `handle` must be null or a live pointer from `termania_create*`.
unsafe fn with_handle<R>(handle: *mut TermaniaHandle, default: R, f: impl FnOnce(&mut TermaniaHandle) -> R) -> R {
    guard(default, || {
        if handle.is_null() {
            return default;
        }
        f(&mut *handle)
    })
}

/// Drain PTY output and queued Text Tap/GUI actions for one tick
/// (`spec.md` §4.H `poll()`). Returns the number of panes that became
/// dirty.
///
/// # Safety
/// `handle` must be null or a live pointer from `termania_create*`.
#[no_mangle]
pub unsafe extern "C" fn termania_poll(handle: *mut TermaniaHandle) -> u32 {
    with_handle(handle, 0, |h| h.controller.poll())
}

/// # Safety
/// `handle` must be null or a live pointer from `termania_create*`.
#[no_mangle]
pub unsafe extern "C" fn termania_pane_count(handle: *mut TermaniaHandle) -> u32 {
    with_handle(handle, 0, |h| h.controller.pane_count())
}

/// Packed pane summary for the ABI (`spec.md` §6.5 `PaneInfo`). `flags`
/// bit 0 = dirty, bit 1 = has_error, bit 2 = is_exited, bit 3 = is_focused.
#[repr(C)]
pub struct PaneInfo {
    pub rows: u16,
    pub cols: u16,
    pub cursor_row: u32,
    pub cursor_col: u32,
    pub title: [u8; 128],
    pub title_len: u32,
    pub flags: u8,
}

const FLAG_DIRTY: u8 = 1 << 0;
const FLAG_HAS_ERROR: u8 = 1 << 1;
const FLAG_IS_EXITED: u8 = 1 << 2;
const FLAG_IS_FOCUSED: u8 = 1 << 3;

/// Fill `*out` with pane `pane`'s summary. Returns `1` on success, `0`
/// if the handle, pointer, or pane index is invalid.
///
/// # Safety
/// `handle` must be null or live; `out` must point to a valid,
/// writable `PaneInfo` when non-null.
#[no_mangle]
pub unsafe extern "C" fn termania_pane_info(handle: *mut TermaniaHandle, pane: u32, out: *mut PaneInfo) -> u8 {
    with_handle(handle, 0, |h| {
        if out.is_null() {
            return 0;
        }
        let Some(render) = h.controller.pane_render_data(pane) else {
            return 0;
        };
        let title = h.controller.pane_title(pane).unwrap_or("");
        let mut title_buf = [0u8; 128];
        let title_len = write_str(title, title_buf.as_mut_ptr(), title_buf.len() as u32);

        let mut flags = 0u8;
        if h.controller.pane_is_dirty(pane) {
            flags |= FLAG_DIRTY;
        }
        if h.controller.pane_has_error(pane) {
            flags |= FLAG_HAS_ERROR;
        }
        if h.controller.pane_is_exited(pane) {
            flags |= FLAG_IS_EXITED;
        }
        if h.controller.focused_pane() == pane {
            flags |= FLAG_IS_FOCUSED;
        }

        *out = PaneInfo {
            rows: render.rows,
            cols: render.cols,
            cursor_row: render.cursor_row,
            cursor_col: render.cursor_col,
            title: title_buf,
            title_len,
            flags,
        };
        1
    })
}

/// One cell of a pane's rendered grid (`spec.md` §4.C `render_data`).
#[repr(C)]
pub struct Cell {
    pub codepoint: u32,
    pub fg_r: u8,
    pub fg_g: u8,
    pub fg_b: u8,
    pub bg_r: u8,
    pub bg_g: u8,
    pub bg_b: u8,
    pub flags: u8,
}

const CELL_BOLD: u8 = 1 << 0;
const CELL_ITALIC: u8 = 1 << 1;
const CELL_UNDERLINE: u8 = 1 << 2;

/// Copy up to `max` cells of pane `pane`'s rendered grid into `out`,
/// row-major. Returns the number of cells written.
///
/// # Safety
/// `handle` must be null or live; `out` must point to at least `max`
/// writable `Cell`s when `max > 0`.
#[no_mangle]
pub unsafe extern "C" fn termania_pane_cells(
    handle: *mut TermaniaHandle,
    pane: u32,
    out: *mut Cell,
    max: u32,
) -> u32 {
    with_handle(handle, 0, |h| {
        if out.is_null() || max == 0 {
            return 0;
        }
        let Some(render) = h.controller.pane_render_data(pane) else {
            return 0;
        };
        let n = render.cells.len().min(max as usize);
        let dst = slice::from_raw_parts_mut(out, n);
        for (i, cell) in render.cells.iter().take(n).enumerate() {
            let mut flags = 0u8;
            if cell.bold {
                flags |= CELL_BOLD;
            }
            if cell.italic {
                flags |= CELL_ITALIC;
            }
            if cell.underline {
                flags |= CELL_UNDERLINE;
            }
            dst[i] = Cell {
                codepoint: cell.ch as u32,
                fg_r: cell.fg.0,
                fg_g: cell.fg.1,
                fg_b: cell.fg.2,
                bg_r: cell.bg.0,
                bg_g: cell.bg.1,
                bg_b: cell.bg.2,
                flags,
            };
        }
        n as u32
    })
}

/// Pixel rectangle for one pane cell (`spec.md` §4.D `PaneLayout`).
#[repr(C)]
pub struct Layout {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub title_h: f32,
}

/// Compute per-pane pixel rectangles for the given window size and
/// scale, using the controller's configured grid padding (`spec.md`
/// §4.D). Returns the number of layouts written.
///
/// # Safety
/// `handle` must be null or live; `out` must point to at least `max`
/// writable `Layout`s when `max > 0`.
#[no_mangle]
pub unsafe extern "C" fn termania_pane_layouts(
    handle: *mut TermaniaHandle,
    window_w: f32,
    window_h: f32,
    scale: f32,
    out: *mut Layout,
    max: u32,
) -> u32 {
    with_handle(handle, 0, |h| {
        if out.is_null() || max == 0 {
            return 0;
        }
        let config = LayoutConfig {
            outer_padding: 4.0,
            gap: 2.0,
            title_bar_height: 24.0,
        };
        let layouts = h.controller.compute_layout(window_w, window_h, config, scale);
        let n = layouts.len().min(max as usize);
        let dst = slice::from_raw_parts_mut(out, n);
        for (i, l) in layouts.iter().take(n).enumerate() {
            dst[i] = Layout {
                x: l.x,
                y: l.y,
                w: l.w,
                h: l.h,
                title_h: l.title_h,
            };
        }
        n as u32
    })
}

/// Decode and dispatch a raw key event (`spec.md` §6.4, §6.5
/// `send_key`). `key` is a [`KeyCode`] discriminant index into the
/// fixed table below; `mods` is the bitset `shift|alt<<1|ctrl<<2|super<<3`.
fn key_code_from_u8(key: u8) -> Option<KeyCode> {
    const TABLE: &[KeyCode] = &[
        KeyCode::Enter,
        KeyCode::Tab,
        KeyCode::Esc,
        KeyCode::Backspace,
        KeyCode::Up,
        KeyCode::Down,
        KeyCode::Left,
        KeyCode::Right,
        KeyCode::Home,
        KeyCode::End,
        KeyCode::PageUp,
        KeyCode::PageDown,
        KeyCode::Insert,
        KeyCode::Delete,
        KeyCode::F1,
        KeyCode::F2,
        KeyCode::F3,
        KeyCode::F4,
        KeyCode::F5,
        KeyCode::F6,
        KeyCode::F7,
        KeyCode::F8,
        KeyCode::F9,
        KeyCode::F10,
        KeyCode::F11,
        KeyCode::F12,
    ];
    if key >= 0x80 {
        // Printable ASCII is carried in the low 7 bits above 0x80's
        // reserved range: 0x80 + ascii_byte.
        let ascii = key.wrapping_sub(0x80);
        return char::from_u32(ascii as u32).map(KeyCode::Char);
    }
    TABLE.get(key as usize).copied()
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn termania_send_key(handle: *mut TermaniaHandle, key: u8, mods: u8) {
    with_handle(handle, (), |h| {
        let Some(key) = key_code_from_u8(key) else {
            return;
        };
        let event = KeyEvent::new(key, Modifiers::from_bits(mods));
        h.controller.handle_key(event);
    })
}

/// # Safety
/// `handle` must be null or live; `ptr` must point to at least `len`
/// readable bytes when `len > 0`.
#[no_mangle]
pub unsafe extern "C" fn termania_send_text(handle: *mut TermaniaHandle, ptr: *const u8, len: u32) {
    with_handle(handle, (), |h| {
        if ptr.is_null() {
            return;
        }
        let bytes = slice::from_raw_parts(ptr, len as usize);
        h.controller.send_text(bytes);
    })
}

/// Resize every pane's cell grid to fit a window of `window_w` x
/// `window_h` physical pixels at `scale`, given a `cell_w` x `cell_h`
/// glyph cell size (`spec.md` §6.5 `resize`).
///
/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn termania_resize(
    handle: *mut TermaniaHandle,
    window_w: f32,
    window_h: f32,
    scale: f32,
    cell_w: f32,
    cell_h: f32,
) {
    with_handle(handle, (), |h| {
        if cell_w <= 0.0 || cell_h <= 0.0 {
            return;
        }
        let cols = ((window_w * scale) / cell_w).floor().max(1.0) as u16;
        let rows = ((window_h * scale) / cell_h).floor().max(1.0) as u16;
        h.controller.resize_panes(rows, cols);
    })
}

/// GUI-originated action discriminants for `termania_action` (`spec.md`
/// §4.H, §6.5). Matches [`GuiAction`] in declaration order, except
/// `JumpToPane` which is passed as `8 + (k - 1)` for `k` in `1..=9`.
fn gui_action_from_u8(code: u8) -> Option<GuiAction> {
    match code {
        0 => Some(GuiAction::NewPane),
        1 => Some(GuiAction::ClosePane),
        2 => Some(GuiAction::NavigateUp),
        3 => Some(GuiAction::NavigateDown),
        4 => Some(GuiAction::NavigateLeft),
        5 => Some(GuiAction::NavigateRight),
        6 => Some(GuiAction::BroadcastToggle),
        code if (8..8 + 9).contains(&code) => Some(GuiAction::JumpToPane((code - 8 + 1) as u32)),
        _ => None,
    }
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn termania_action(handle: *mut TermaniaHandle, action: u8) {
    with_handle(handle, (), |h| {
        if let Some(action) = gui_action_from_u8(action) {
            h.controller.dispatch_gui_action(action);
        }
    })
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn termania_focused_pane(handle: *mut TermaniaHandle) -> u32 {
    with_handle(handle, 0, |h| h.controller.focused_pane())
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn termania_set_focused_pane(handle: *mut TermaniaHandle, pane: u32) -> u8 {
    with_handle(handle, 0, |h| h.controller.set_focused_pane(pane) as u8)
}

/// Spawn a new pane of type `ptype` (`len` bytes, UTF-8) as `fg`'s
/// background overlay and register the overlay pair (`spec.md` §4.E,
/// §6.5 `add_overlay`). Returns `1` on success.
///
/// # Safety
/// `handle` must be null or live; `ptype` must point to at least `len`
/// readable bytes when `len > 0`.
#[no_mangle]
pub unsafe extern "C" fn termania_add_overlay(
    handle: *mut TermaniaHandle,
    fg: u32,
    ptype: *const u8,
    len: u32,
) -> u8 {
    with_handle(handle, 0, |h| {
        let Some(pane_type) = read_str(ptype, len) else {
            return 0;
        };
        let bg = h.controller.spawn_background_pane(pane_type);
        h.controller.add_overlay(fg, bg);
        1
    })
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn termania_remove_overlay(handle: *mut TermaniaHandle, fg: u32) {
    with_handle(handle, (), |h| h.controller.remove_overlay(fg))
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn termania_swap_overlay(handle: *mut TermaniaHandle, a: u32, b: u32) {
    with_handle(handle, (), |h| h.controller.swap_overlay(a, b))
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn termania_toggle_overlay_focus(handle: *mut TermaniaHandle, fg: u32) {
    with_handle(handle, (), |h| h.controller.toggle_overlay_focus(fg))
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn termania_has_overlay(handle: *mut TermaniaHandle, fg: u32) -> u8 {
    with_handle(handle, 0, |h| h.controller.has_overlay(fg) as u8)
}

/// # Safety
/// `handle` must be null or live; `buf` must point to at least `max`
/// writable bytes when `max > 0`.
#[no_mangle]
pub unsafe extern "C" fn termania_pane_watermark(
    handle: *mut TermaniaHandle,
    pane: u32,
    buf: *mut u8,
    max: u32,
) -> u32 {
    with_handle(handle, 0, |h| match h.controller.watermark(pane) {
        Some(mark) => write_str(mark, buf, max),
        None => 0,
    })
}

/// # Safety
/// `handle` must be null or live; `ptr` must point to at least `len`
/// readable bytes when `len > 0`.
#[no_mangle]
pub unsafe extern "C" fn termania_set_watermark(
    handle: *mut TermaniaHandle,
    pane: u32,
    ptr: *const u8,
    len: u32,
) {
    with_handle(handle, (), |h| {
        if let Some(s) = read_str(ptr, len) {
            h.controller.set_watermark(pane, s);
        }
    })
}

/// Pop the pending notification, writing its title/body into the
/// caller's buffers (`spec.md` §5 "pending notification: single slot").
/// Returns `1` if a notification was pending, `0` otherwise.
///
/// # Safety
/// `handle` must be null or live; both buffers must point to at least
/// their respective `max` writable bytes when non-null.
#[no_mangle]
pub unsafe extern "C" fn termania_poll_notification(
    handle: *mut TermaniaHandle,
    title_buf: *mut u8,
    title_max: u32,
    body_buf: *mut u8,
    body_max: u32,
) -> u8 {
    with_handle(handle, 0, |h| match h.controller.take_notification() {
        Some(n) => {
            write_str(&n.title, title_buf, title_max);
            write_str(&n.body, body_buf, body_max);
            1
        }
        None => 0,
    })
}

/// # Safety
/// `handle` must be null or live; all four output pointers must be
/// valid and writable when non-null.
#[no_mangle]
pub unsafe extern "C" fn termania_context_usage(
    handle: *mut TermaniaHandle,
    used: *mut u64,
    total: *mut u64,
    pct: *mut u8,
    pre_compact: *mut u8,
) -> u8 {
    with_handle(handle, 0, |h| match h.controller.context_usage() {
        Some(usage) => {
            if !used.is_null() {
                *used = usage.used_tokens;
            }
            if !total.is_null() {
                *total = usage.total_tokens;
            }
            if !pct.is_null() {
                *pct = usage.percentage;
            }
            if !pre_compact.is_null() {
                *pre_compact = usage.is_pre_compact as u8;
            }
            1
        }
        None => 0,
    })
}

/// # Safety
/// `handle` must be null or live; `buf` must point to at least `max`
/// writable bytes when `max > 0`.
#[no_mangle]
pub unsafe extern "C" fn termania_context_session_id(
    handle: *mut TermaniaHandle,
    buf: *mut u8,
    max: u32,
) -> u32 {
    with_handle(handle, 0, |h| match h.controller.context_usage() {
        Some(usage) => write_str(&usage.session_id, buf, max),
        None => 0,
    })
}

/// Record a prompt for the next `termania_poll`-adjacent LLM request
/// (`spec.md` §4.H "LLM lifecycle": `submit` only records; the actual
/// HTTP call happens in `termania_llm_poll`). Returns `1` on success.
///
/// # Safety
/// `handle` must be null or live; `prompt` must point to at least
/// `len` readable bytes when `len > 0`.
#[no_mangle]
pub unsafe extern "C" fn termania_llm_submit(handle: *mut TermaniaHandle, prompt: *const u8, len: u32) -> u32 {
    with_handle(handle, 0, |h| match read_str(prompt, len) {
        Some(s) => {
            h.controller.llm_submit(s);
            1
        }
        None => 0,
    })
}

/// Perform the pending LLM HTTP request, if any (`spec.md` §4.H/§5:
/// the host calls this from a context where a multi-second stall is
/// acceptable).
///
/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn termania_llm_poll(handle: *mut TermaniaHandle) {
    with_handle(handle, (), |h| h.controller.poll_llm())
}

/// `0` = Idle, `1` = Waiting, `2` = Error. `3` is reserved (`spec.md`
/// §6.5 documents the range as `0..=3` but the state machine in §4.G
/// only names three states; see DESIGN.md).
///
/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn termania_llm_status(handle: *mut TermaniaHandle) -> u8 {
    with_handle(handle, 0, |h| match h.controller.llm_status() {
        LlmStatus::Idle => 0,
        LlmStatus::Waiting => 1,
        LlmStatus::Error => 2,
    })
}

/// # Safety
/// `handle` must be null or live; `buf` must point to at least `max`
/// writable bytes when `max > 0`.
#[no_mangle]
pub unsafe extern "C" fn termania_llm_response_text(handle: *mut TermaniaHandle, buf: *mut u8, max: u32) -> u32 {
    with_handle(handle, 0, |h| match h.controller.llm_response_text() {
        Some(text) => write_str(text, buf, max),
        None => 0,
    })
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn termania_llm_action_count(handle: *mut TermaniaHandle) -> u32 {
    with_handle(handle, 0, |h| h.controller.llm_action_descriptions().len() as u32)
}

/// # Safety
/// `handle` must be null or live; `buf` must point to at least `max`
/// writable bytes when `max > 0`.
#[no_mangle]
pub unsafe extern "C" fn termania_llm_action_desc(
    handle: *mut TermaniaHandle,
    index: u32,
    buf: *mut u8,
    max: u32,
) -> u32 {
    with_handle(handle, 0, |h| {
        let descriptions = h.controller.llm_action_descriptions();
        match descriptions.get(index as usize) {
            Some(desc) => write_str(desc, buf, max),
            None => 0,
        }
    })
}

/// # Safety
/// `handle` must be null or live.
#[no_mangle]
pub unsafe extern "C" fn termania_llm_execute(handle: *mut TermaniaHandle) {
    with_handle(handle, (), |h| h.controller.llm_execute())
}

/// Persistent, NUL-terminated font-family string, kept alive for as
/// long as `handle` is (`spec.md` §4.I: the one ABI accessor that does
/// not follow the "no termination guarantee" rule).
///
/// # Safety
/// `handle` must be null or live. The returned pointer is valid until
/// the next call through this handle or `termania_destroy`.
#[no_mangle]
pub unsafe extern "C" fn termania_font_family(handle: *mut TermaniaHandle) -> *const c_char {
    if handle.is_null() {
        return std::ptr::null();
    }
    guard(std::ptr::null(), || (*handle).font_family.as_ptr())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handle_is_safe_everywhere() {
        unsafe {
            assert_eq!(termania_pane_count(std::ptr::null_mut()), 0);
            assert_eq!(termania_focused_pane(std::ptr::null_mut()), 0);
            assert_eq!(termania_set_focused_pane(std::ptr::null_mut(), 0), 0);
            assert_eq!(termania_has_overlay(std::ptr::null_mut(), 0), 0);
            assert!(termania_font_family(std::ptr::null_mut()).is_null());
            termania_destroy(std::ptr::null_mut());
            termania_action(std::ptr::null_mut(), 0);
            termania_send_text(std::ptr::null_mut(), std::ptr::null(), 0);
        }
    }

    #[test]
    fn create_poll_destroy_round_trip() {
        unsafe {
            let handle = termania_create();
            assert!(!handle.is_null());
            assert!(termania_pane_count(handle) >= 1);
            let _ = termania_poll(handle);

            let mut info = PaneInfo {
                rows: 0,
                cols: 0,
                cursor_row: 0,
                cursor_col: 0,
                title: [0; 128],
                title_len: 0,
                flags: 0,
            };
            let ok = termania_pane_info(handle, 0, &mut info as *mut _);
            assert_eq!(ok, 1);

            termania_destroy(handle);
        }
    }

    #[test]
    fn key_code_table_round_trips_for_known_indices() {
        assert_eq!(key_code_from_u8(0), Some(KeyCode::Enter));
        assert_eq!(key_code_from_u8(4), Some(KeyCode::Up));
        assert_eq!(key_code_from_u8(0x80 + b'a'), Some(KeyCode::Char('a')));
    }

    #[test]
    fn gui_action_jump_to_pane_decodes() {
        assert_eq!(gui_action_from_u8(8), Some(GuiAction::JumpToPane(1)));
        assert_eq!(gui_action_from_u8(16), Some(GuiAction::JumpToPane(9)));
        assert_eq!(gui_action_from_u8(7), None);
    }

    #[test]
    fn write_str_truncates_to_max_without_terminator() {
        let mut buf = [0u8; 4];
        let n = unsafe { write_str("hello", buf.as_mut_ptr(), buf.len() as u32) };
        assert_eq!(n, 4);
        assert_eq!(&buf, b"hell");
    }
}
