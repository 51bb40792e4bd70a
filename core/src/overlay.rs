//! Overlay & watermark registries.
//!
//! Both are plain index→value maps. They never own panes — only the
//! controller does — so closing a pane means scrubbing any overlay
//! entry that refers to it to avoid a dangling index.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusLayer {
    Foreground,
    Background,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayMap {
    /// fg_pane_idx -> bg_pane_idx
    backgrounds: HashMap<u32, u32>,
    /// fg_pane_idx -> which layer currently has focus
    focus: HashMap<u32, FocusLayer>,
}

impl OverlayMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, fg: u32, bg: u32) {
        self.backgrounds.insert(fg, bg);
        self.focus.entry(fg).or_insert(FocusLayer::Foreground);
    }

    pub fn remove(&mut self, fg: u32) {
        self.backgrounds.remove(&fg);
        self.focus.remove(&fg);
    }

    pub fn has_overlay(&self, fg: u32) -> bool {
        self.backgrounds.contains_key(&fg)
    }

    pub fn background_of(&self, fg: u32) -> Option<u32> {
        self.backgrounds.get(&fg).copied()
    }

    pub fn swap(&mut self, a: u32, b: u32) {
        let a_bg = self.backgrounds.remove(&a);
        let b_bg = self.backgrounds.remove(&b);
        if let Some(bg) = b_bg {
            self.backgrounds.insert(a, bg);
        }
        if let Some(bg) = a_bg {
            self.backgrounds.insert(b, bg);
        }
        let a_focus = self.focus.remove(&a);
        let b_focus = self.focus.remove(&b);
        if let Some(f) = b_focus {
            self.focus.insert(a, f);
        }
        if let Some(f) = a_focus {
            self.focus.insert(b, f);
        }
    }

    pub fn toggle_focus(&mut self, fg: u32) {
        if let Some(layer) = self.focus.get_mut(&fg) {
            *layer = match layer {
                FocusLayer::Foreground => FocusLayer::Background,
                FocusLayer::Background => FocusLayer::Foreground,
            };
        }
    }

    pub fn focus_layer(&self, fg: u32) -> Option<FocusLayer> {
        self.focus.get(&fg).copied()
    }

    /// Drop every overlay entry whose foreground or background
    /// reference equals `pane`, because that pane was just closed.
    pub fn scrub_pane(&mut self, pane: u32) {
        self.backgrounds.retain(|&fg, &mut bg| fg != pane && bg != pane);
        self.focus.retain(|&fg, _| fg != pane);
    }
}

/// Maximum watermark length in bytes; longer values are truncated at
/// a UTF-8 character boundary.
pub const WATERMARK_MAX_LEN: usize = 128;

#[derive(Debug, Clone, Default)]
pub struct WatermarkMap {
    entries: HashMap<u32, String>,
}

impl WatermarkMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a watermark, truncating to [`WATERMARK_MAX_LEN`] bytes at a
    /// UTF-8 character boundary.
    pub fn set(&mut self, pane: u32, watermark: impl Into<String>) {
        let mut s = watermark.into();
        if s.len() > WATERMARK_MAX_LEN {
            let mut end = WATERMARK_MAX_LEN;
            while end > 0 && !s.is_char_boundary(end) {
                end -= 1;
            }
            s.truncate(end);
        }
        self.entries.insert(pane, s);
    }

    pub fn clear(&mut self, pane: u32) {
        self.entries.remove(&pane);
    }

    pub fn get(&self, pane: u32) -> Option<&str> {
        self.entries.get(&pane).map(String::as_str)
    }

    pub fn scrub_pane(&mut self, pane: u32) {
        self.entries.remove(&pane);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrub_removes_entries_referencing_closed_pane() {
        let mut overlays = OverlayMap::new();
        overlays.add(0, 1);
        overlays.add(2, 0);
        overlays.scrub_pane(0);
        assert!(!overlays.has_overlay(0));
        assert!(!overlays.has_overlay(2));
    }

    #[test]
    fn toggle_focus_flips_bit() {
        let mut overlays = OverlayMap::new();
        overlays.add(0, 1);
        assert_eq!(overlays.focus_layer(0), Some(FocusLayer::Foreground));
        overlays.toggle_focus(0);
        assert_eq!(overlays.focus_layer(0), Some(FocusLayer::Background));
    }

    #[test]
    fn watermark_truncates_to_128_bytes() {
        let mut marks = WatermarkMap::new();
        marks.set(0, "x".repeat(200));
        assert_eq!(marks.get(0).unwrap().len(), WATERMARK_MAX_LEN);
    }
}
