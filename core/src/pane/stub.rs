//! Stub pane plugin (`spec.md` §4.C `StubPlugin`).
//!
//! Satisfies the capability set trivially for the nine non-terminal
//! pane kinds (`spec.md` §1 "per-plugin display logic for non-terminal
//! plugin types" is out of scope). Holds only a type discriminator and
//! a title; every other capability method returns an empty/false
//! default.

use super::{PaneType, RenderData};

pub struct StubPlugin {
    pane_type: PaneType,
    title: String,
}

impl StubPlugin {
    pub fn new(pane_type: PaneType, title: Option<String>) -> Self {
        Self {
            pane_type,
            title: title.unwrap_or_else(|| pane_type.as_str().to_string()),
        }
    }

    // Capability set (`spec.md` §4.C), dispatched by [`super::Pane`]'s
    // match arms rather than a trait object — see `spec.md` §9
    // "dynamic dispatch over pane kinds".

    pub fn pane_type(&self) -> PaneType {
        self.pane_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub fn poll(&mut self) -> bool {
        false
    }

    pub fn write_input(&mut self, _bytes: &[u8]) {}

    pub fn resize(&mut self, _rows: u16, _cols: u16) {}

    pub fn render_data(&self) -> RenderData {
        RenderData::empty()
    }

    pub fn visible_text(&self, _buf: &mut [u8]) -> usize {
        0
    }

    pub fn has_error(&self) -> bool {
        false
    }

    pub fn is_dirty(&self) -> bool {
        false
    }

    pub fn clear_dirty(&mut self) {}

    pub fn scroll_up(&mut self, _lines: u32) {}

    pub fn scroll_down(&mut self, _lines: u32) {}

    pub fn is_exited(&self) -> bool {
        false
    }

    pub fn child_pid(&self) -> Option<u32> {
        None
    }

    pub fn dispose(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_capability_methods_are_all_trivial() {
        let mut stub = StubPlugin::new(PaneType::Webview, Some("browser".to_string()));
        assert_eq!(stub.title(), "browser");
        assert!(!stub.poll());
        assert!(!stub.has_error());
        assert!(!stub.is_dirty());
        assert_eq!(stub.render_data(), RenderData::empty());
        let mut buf = [0u8; 16];
        assert_eq!(stub.visible_text(&mut buf), 0);
        stub.set_title("updated".to_string());
        assert_eq!(stub.title(), "updated");
    }

    #[test]
    fn default_title_falls_back_to_pane_type_name() {
        let stub = StubPlugin::new(PaneType::Notes, None);
        assert_eq!(stub.title(), "notes");
    }
}
