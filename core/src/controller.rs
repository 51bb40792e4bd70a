//! The application controller (`spec.md` §3, §4.H).
//!
//! Owns every piece of mutable state in the process and is the only
//! thing the C ABI shim talks to. Everything here runs on one thread;
//! nothing in this module may block except [`Controller::poll_llm`],
//! which performs the one permitted synchronous HTTP call (`spec.md`
//! §5).

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::action::{Action, SendTarget};
use crate::config::Config;
use crate::grid::{GridManager, LayoutConfig, PaneLayout};
use crate::keymap::{match_app_keybinding, key_event_to_bytes, AppKeybinding, KeyEvent};
use crate::llm::{LlmClient, LlmClientState, LlmStatus, PaneContext};
use crate::overlay::{OverlayMap, WatermarkMap};
use crate::pane::{create_plugin, Pane, PaneConfig, RenderData};

/// Host-facing notification record (`SPEC_FULL.md` §3): the `seq`
/// field lets a poller detect "new since I last looked" without
/// diffing strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub seq: u64,
    pub received_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextUsageState {
    pub used_tokens: u64,
    pub total_tokens: u64,
    pub percentage: u8,
    pub session_id: String,
    pub is_pre_compact: bool,
    pub received_at: chrono::DateTime<chrono::Utc>,
}

/// GUI-originated actions dispatched through the ABI's `action(u8)`
/// entry point (`spec.md` §4.H, §6.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuiAction {
    NewPane,
    ClosePane,
    NavigateUp,
    NavigateDown,
    NavigateLeft,
    NavigateRight,
    JumpToPane(u32),
    BroadcastToggle,
}

pub struct Controller {
    config: Config,
    grid: GridManager,
    panes: Vec<Pane>,
    tap: crate::tap::TextTapServer,
    llm_client: LlmClient,
    llm_state: LlmClientState,
    overlays: OverlayMap,
    watermarks: WatermarkMap,
    focus: u32,
    broadcast: bool,
    pending_notification: Option<Notification>,
    notification_seq: u64,
    pending_context_usage: Option<ContextUsageState>,
}

impl Controller {
    /// Build a fresh controller from a parsed config (`spec.md` §4.H
    /// "startup"). The socket is not bound here in case the caller
    /// wants to inspect/adjust config first; call [`Self::start`]
    /// once ready.
    pub fn new(config: Config) -> Self {
        let (rows, cols) = config.effective_grid();
        let grid = GridManager::with_shape(rows, cols);

        let pane_configs: Vec<PaneConfig> = config
            .sessions
            .first()
            .map(|s| s.panes.clone())
            .filter(|p| !p.is_empty())
            .unwrap_or_default();

        let total = grid.total_panes().max(1) as usize;
        let mut panes: Vec<Pane> = Vec::with_capacity(total);
        for i in 0..total {
            let pane_config = pane_configs.get(i).cloned().unwrap_or_default();
            panes.push(create_plugin(i as u32, &pane_config));
        }

        let socket_path = config.text_tap.socket_path.clone();
        let tap = crate::tap::TextTapServer::new(socket_path, panes.len() as u32);
        let llm_state = LlmClientState::new(config.llm.clone());

        Self {
            config,
            grid,
            panes,
            tap,
            llm_client: LlmClient::new(),
            llm_state,
            overlays: OverlayMap::new(),
            watermarks: WatermarkMap::new(),
            focus: 0,
            broadcast: false,
            pending_notification: None,
            notification_seq: 0,
            pending_context_usage: None,
        }
    }

    /// Start the Text Tap server if `[text_tap].enabled`. No-op
    /// otherwise (`spec.md` §4.H "startup").
    pub fn start(&mut self) {
        if self.config.text_tap.enabled {
            if let Err(e) = self.tap.start() {
                tracing::warn!(error = %e, "failed to start text tap server");
            }
        }
    }

    pub fn pane_count(&self) -> u32 {
        self.panes.len() as u32
    }

    pub fn focused_pane(&self) -> u32 {
        self.focus
    }

    pub fn set_focused_pane(&mut self, pane: u32) -> bool {
        if (pane as usize) < self.panes.len() {
            self.focus = pane;
            true
        } else {
            false
        }
    }

    pub fn pane_render_data(&self, pane: u32) -> Option<RenderData> {
        self.panes.get(pane as usize).map(|p| p.render_data())
    }

    pub fn pane_title(&self, pane: u32) -> Option<&str> {
        self.panes.get(pane as usize).map(|p| p.title())
    }

    pub fn pane_is_dirty(&self, pane: u32) -> bool {
        self.panes.get(pane as usize).map(|p| p.is_dirty()).unwrap_or(false)
    }

    pub fn pane_has_error(&self, pane: u32) -> bool {
        self.panes.get(pane as usize).map(|p| p.has_error()).unwrap_or(false)
    }

    pub fn pane_is_exited(&self, pane: u32) -> bool {
        self.panes.get(pane as usize).map(|p| p.is_exited()).unwrap_or(false)
    }

    pub fn clear_pane_dirty(&mut self, pane: u32) {
        if let Some(p) = self.panes.get_mut(pane as usize) {
            p.clear_dirty();
        }
    }

    pub fn compute_layout(&self, window_w: f32, window_h: f32, config: LayoutConfig, scale: f32) -> Vec<PaneLayout> {
        self.grid.compute_layout(window_w, window_h, config, scale)
    }

    pub fn resize_panes(&mut self, rows: u16, cols: u16) {
        for pane in &mut self.panes {
            pane.resize(rows, cols);
        }
    }

    // ---- overlays & watermarks ----

    pub fn add_overlay(&mut self, fg: u32, bg: u32) {
        self.overlays.add(fg, bg);
    }

    pub fn remove_overlay(&mut self, fg: u32) {
        self.overlays.remove(fg);
    }

    pub fn swap_overlay(&mut self, a: u32, b: u32) {
        self.overlays.swap(a, b);
    }

    pub fn toggle_overlay_focus(&mut self, fg: u32) {
        self.overlays.toggle_focus(fg);
    }

    pub fn has_overlay(&self, fg: u32) -> bool {
        self.overlays.has_overlay(fg)
    }

    pub fn watermark(&self, pane: u32) -> Option<&str> {
        self.watermarks.get(pane)
    }

    pub fn set_watermark(&mut self, pane: u32, watermark: impl Into<String>) {
        self.watermarks.set(pane, watermark);
    }

    // ---- notifications / context usage ----

    pub fn take_notification(&mut self) -> Option<Notification> {
        self.pending_notification.take()
    }

    pub fn context_usage(&self) -> Option<&ContextUsageState> {
        self.pending_context_usage.as_ref()
    }

    fn push_notification(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.notification_seq += 1;
        self.pending_notification = Some(Notification {
            title: title.into(),
            body: body.into(),
            seq: self.notification_seq,
            received_at: chrono::Utc::now(),
        });
    }

    // ---- per-tick poll ----

    /// The per-tick contract of `spec.md` §4.H/§5: poll plugins, then
    /// the tap, then drain and apply its queued actions. Returns the
    /// number of panes that became dirty this tick.
    pub fn poll(&mut self) -> u32 {
        let mut dirty_count = 0u32;
        for pane in &mut self.panes {
            if pane.poll() {
                dirty_count += 1;
            }
        }

        self.tap.poll();
        let actions = self.tap.drain_actions();
        trace!(count = actions.len(), "draining tap actions");
        for action in actions {
            self.apply_action(action);
        }

        debug!(dirty_count, "tick complete");
        dirty_count
    }

    /// Apply one action to controller state. Used both for tap-drained
    /// actions (every tick) and for an accepted LLM response
    /// (`Self::llm_execute`).
    fn apply_action(&mut self, action: Action) {
        match action {
            Action::RawSend { target, bytes } => self.write_to_target(target, bytes.as_bytes()),
            Action::SendCommand { pane, command } => {
                self.write_command_to_pane(pane, &command);
            }
            Action::SendToAll { command } => {
                let mut line = command.into_bytes();
                line.push(b'\r');
                for pane in &mut self.panes {
                    pane.write_input(&line);
                }
            }
            Action::SetTitle { pane, title } => {
                if let Some(p) = self.panes.get_mut(pane as usize) {
                    p.set_title(title);
                }
            }
            Action::SetWatermark { pane, watermark } => self.watermarks.set(pane, watermark),
            Action::ClearWatermark { pane } => self.watermarks.clear(pane),
            Action::Navigate { pane, .. } | Action::SetContent { pane, .. } => {
                debug!(pane, "ignoring action: non-terminal pane display is out of scope");
            }
            Action::SpawnPane {
                pane_type,
                title,
                command,
                cwd,
                url,
                content,
                watermark,
                row,
            } => self.spawn_pane(PaneConfig {
                pane_type: Some(pane_type),
                title,
                command,
                cwd,
                url,
                content,
                watermark,
            }, row),
            Action::ClosePane { pane } => self.close_pane(pane),
            Action::ReplacePane {
                pane,
                pane_type,
                title,
                command,
                cwd,
                url,
                content,
                watermark,
                ..
            } => self.replace_pane(pane, PaneConfig {
                pane_type: Some(pane_type),
                title,
                command,
                cwd,
                url,
                content,
                watermark,
            }),
            Action::SwapPanes { a, b } => self.swap_panes(a, b),
            Action::FocusPane { pane } => {
                self.set_focused_pane(pane);
            }
            Action::Message { text } => self.push_notification("trm", text),
            Action::Notify { title, body } => self.push_notification(title, body),
            Action::ContextUsage {
                used_tokens,
                total_tokens,
                percentage,
                session_id,
                is_pre_compact,
            } => {
                self.pending_context_usage = Some(ContextUsageState {
                    used_tokens,
                    total_tokens,
                    percentage,
                    session_id,
                    is_pre_compact,
                    received_at: chrono::Utc::now(),
                });
            }
        }
    }

    fn write_to_target(&mut self, target: SendTarget, bytes: &[u8]) {
        match target {
            SendTarget::Pane(i) => {
                if let Some(pane) = self.panes.get_mut(i as usize) {
                    pane.write_input(bytes);
                }
            }
            SendTarget::All => {
                for pane in &mut self.panes {
                    pane.write_input(bytes);
                }
            }
        }
    }

    fn write_command_to_pane(&mut self, pane: u32, command: &str) {
        if let Some(p) = self.panes.get_mut(pane as usize) {
            let mut line = command.as_bytes().to_vec();
            line.push(b'\r');
            p.write_input(&line);
        }
    }

    fn spawn_pane(&mut self, pane_config: PaneConfig, row: Option<u32>) {
        let index = self.panes.len() as u32;
        let watermark = pane_config.watermark.clone();
        let plugin = create_plugin(index, &pane_config);
        self.panes.push(plugin);

        let target_row = row.map(|r| r as usize).unwrap_or_else(|| self.grid.num_rows().saturating_sub(1));
        self.grid.add_col_to_row(target_row);
        if self.grid.num_rows() == 0 {
            self.grid.add_row();
        }

        if let Some(watermark) = watermark {
            self.watermarks.set(index, watermark);
        }
        self.focus = index;
        self.tap.set_pane_count(self.panes.len() as u32);
    }

    fn close_pane(&mut self, pane: u32) {
        if self.panes.len() <= 1 {
            return;
        }
        let idx = pane as usize;
        if idx >= self.panes.len() {
            return;
        }
        if let Some(row) = self.grid.pane_position(pane).map(|(r, _)| r) {
            self.grid.remove_col_from_row(row);
        }

        self.panes[idx].dispose();
        self.panes.remove(idx);
        self.overlays.scrub_pane(pane);
        self.watermarks.scrub_pane(pane);
        self.tap.set_pane_count(self.panes.len() as u32);

        if self.focus as usize >= self.panes.len() {
            self.focus = self.panes.len().saturating_sub(1) as u32;
        }
    }

    fn replace_pane(&mut self, pane: u32, pane_config: PaneConfig) {
        let Some(slot) = self.panes.get_mut(pane as usize) else {
            return;
        };
        slot.dispose();
        *slot = create_plugin(pane, &pane_config);
    }

    fn swap_panes(&mut self, a: u32, b: u32) {
        let (a, b) = (a as usize, b as usize);
        if a >= self.panes.len() || b >= self.panes.len() {
            return;
        }
        self.panes.swap(a, b);
        self.overlays.swap(a as u32, b as u32);

        let a_mark = self.watermarks.get(a as u32).map(str::to_string);
        let b_mark = self.watermarks.get(b as u32).map(str::to_string);
        match b_mark {
            Some(mark) => self.watermarks.set(a as u32, mark),
            None => self.watermarks.clear(a as u32),
        }
        match a_mark {
            Some(mark) => self.watermarks.set(b as u32, mark),
            None => self.watermarks.clear(b as u32),
        }
    }

    /// Spawn a new pane of the given type as a background pane, without
    /// touching grid layout or focus, and return its index. Used by the
    /// ABI's `add_overlay`, which names a pane type rather than an
    /// existing pane index (`spec.md` §6.5).
    pub fn spawn_background_pane(&mut self, pane_type: &str) -> u32 {
        let index = self.panes.len() as u32;
        let pane_config = PaneConfig {
            pane_type: Some(pane_type.to_string()),
            ..Default::default()
        };
        let plugin = create_plugin(index, &pane_config);
        self.panes.push(plugin);
        self.grid.add_col_to_row(self.grid.num_rows().saturating_sub(1));
        self.tap.set_pane_count(self.panes.len() as u32);
        index
    }

    // ---- GUI-originated actions (`spec.md` §4.H) ----

    pub fn dispatch_gui_action(&mut self, action: GuiAction) {
        match action {
            GuiAction::NewPane => self.spawn_pane(PaneConfig::default(), None),
            GuiAction::ClosePane => self.close_pane(self.focus),
            GuiAction::NavigateUp | GuiAction::NavigateLeft => self.cycle_focus(-1),
            GuiAction::NavigateDown | GuiAction::NavigateRight => self.cycle_focus(1),
            GuiAction::JumpToPane(k) => {
                if k >= 1 && (k as usize) <= self.panes.len() {
                    self.focus = k - 1;
                }
            }
            GuiAction::BroadcastToggle => self.broadcast = !self.broadcast,
        }
    }

    fn cycle_focus(&mut self, delta: i32) {
        let n = self.panes.len() as i32;
        if n == 0 {
            return;
        }
        let current = self.focus as i32;
        let next = ((current + delta) % n + n) % n;
        self.focus = next as u32;
    }

    // ---- key / text input path (`spec.md` §4.H) ----

    /// Decode a key event: app keybindings are consumed first; anything
    /// left over is translated to terminal bytes and written to the
    /// focused pane only. Returns the matched app keybinding, if any,
    /// so the host can react to bindings it owns (font size, overlays).
    pub fn handle_key(&mut self, event: KeyEvent) -> Option<AppKeybinding> {
        if let Some(binding) = match_app_keybinding(event) {
            self.apply_app_keybinding(binding);
            return Some(binding);
        }
        let bytes = key_event_to_bytes(event);
        if let Some(pane) = self.panes.get_mut(self.focus as usize) {
            pane.write_input(&bytes);
        }
        None
    }

    fn apply_app_keybinding(&mut self, binding: AppKeybinding) {
        match binding {
            AppKeybinding::NewPane => self.dispatch_gui_action(GuiAction::NewPane),
            AppKeybinding::ClosePane => self.dispatch_gui_action(GuiAction::ClosePane),
            AppKeybinding::NavigateUp => self.dispatch_gui_action(GuiAction::NavigateUp),
            AppKeybinding::NavigateDown => self.dispatch_gui_action(GuiAction::NavigateDown),
            AppKeybinding::NavigateLeft => self.dispatch_gui_action(GuiAction::NavigateLeft),
            AppKeybinding::NavigateRight => self.dispatch_gui_action(GuiAction::NavigateRight),
            AppKeybinding::JumpToPane(k) => self.dispatch_gui_action(GuiAction::JumpToPane(k as u32)),
            AppKeybinding::BroadcastToggle => self.dispatch_gui_action(GuiAction::BroadcastToggle),
            // Rename/font-size/overlay/help bindings are host (GUI) presentation
            // concerns; the controller only reports the match back to the host.
            AppKeybinding::RenamePane
            | AppKeybinding::FontSizeIncrease
            | AppKeybinding::FontSizeDecrease
            | AppKeybinding::CommandOverlayToggle
            | AppKeybinding::HelpToggle => {}
        }
    }

    /// Write raw UTF-8 text to the focused pane, or to every pane when
    /// broadcast mode is on (`spec.md` §4.H "text input", §8 property
    /// 4).
    pub fn send_text(&mut self, bytes: &[u8]) {
        if self.broadcast {
            for pane in &mut self.panes {
                pane.write_input(bytes);
            }
        } else if let Some(pane) = self.panes.get_mut(self.focus as usize) {
            pane.write_input(bytes);
        }
    }

    pub fn broadcast_mode(&self) -> bool {
        self.broadcast
    }

    // ---- LLM lifecycle (`spec.md` §4.H "LLM lifecycle") ----

    pub fn llm_status(&self) -> LlmStatus {
        self.llm_state.status
    }

    pub fn llm_response_text(&self) -> Option<&str> {
        self.llm_state
            .last_response
            .as_ref()
            .map(|r| r.explanation.as_str())
    }

    pub fn llm_action_descriptions(&self) -> Vec<String> {
        self.llm_state
            .last_response
            .as_ref()
            .map(|r| r.actions.iter().map(crate::action::format_for_display).collect())
            .unwrap_or_default()
    }

    /// Record a prompt for the next [`Self::poll_llm`] call.
    pub fn llm_submit(&mut self, prompt: impl Into<String>) {
        self.llm_state.submit(prompt);
    }

    /// Perform the (synchronous, potentially multi-second) HTTP request
    /// if a prompt is pending. The host calls this only from a context
    /// where that stall is acceptable (`spec.md` §5).
    pub fn poll_llm(&mut self) {
        let Some(prompt) = self.llm_state.take_pending_prompt() else {
            return;
        };

        let contexts = self.collect_pane_contexts();
        match self.llm_client.request(&self.llm_state.config, &contexts, &prompt) {
            Ok(response) => {
                self.llm_state.last_response = Some(response);
                self.llm_state.last_error = None;
                self.llm_state.status = LlmStatus::Idle;
            }
            Err(e) => {
                self.llm_state.last_error = Some(e.to_string());
                self.llm_state.status = LlmStatus::Error;
            }
        }
    }

    fn collect_pane_contexts(&self) -> Vec<PaneContext> {
        let mut contexts = Vec::with_capacity(self.panes.len());
        let mut buf = [0u8; 8192];
        for (i, pane) in self.panes.iter().enumerate() {
            let n = pane.visible_text(&mut buf);
            let visible_text = String::from_utf8_lossy(&buf[..n]).into_owned();
            contexts.push(PaneContext {
                index: i as u32,
                pane_type: pane.pane_type().as_str().to_string(),
                title: pane.title().to_string(),
                visible_text,
                subprocess_info: pane.child_pid().map(|pid| format!("pid {pid}")),
            });
        }
        contexts
    }

    /// Apply every action in the held LLM response, then clear it and
    /// reset status to `Idle` (`spec.md` §4.H).
    pub fn llm_execute(&mut self) {
        let actions: VecDeque<Action> = self
            .llm_state
            .last_response
            .take()
            .map(|r| r.actions.into())
            .unwrap_or_default();
        for action in actions {
            self.apply_action(action);
        }
        self.llm_state.clear_response();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    /// A config with `n` stub (`notes`) panes laid out in one row, so
    /// tests never spawn a real PTY.
    fn stub_config(n: u32) -> Config {
        let toml = format!(
            r#"
            [grid]
            rows = 1
            cols = {n}

            [[sessions]]
            rows = 1
            cols = {n}
            {panes}
            "#,
            panes = (0..n)
                .map(|_| "[[sessions.panes]]\npane_type = \"notes\"\n")
                .collect::<String>()
        );
        Config::from_toml_str(&toml).unwrap()
    }

    #[test]
    fn new_uses_session_grid_override() {
        let controller = Controller::new(stub_config(3));
        assert_eq!(controller.pane_count(), 3);
        assert_eq!(controller.grid.num_rows(), 1);
        assert_eq!(controller.grid.row_cols(), &[3]);
    }

    #[test]
    fn spawn_pane_grows_grid_and_focuses_new_pane() {
        let mut controller = Controller::new(stub_config(2));
        controller.spawn_pane(PaneConfig::default(), None);
        assert_eq!(controller.pane_count(), 3);
        assert_eq!(controller.focused_pane(), 2);
        assert_eq!(controller.grid.total_panes(), 3);
    }

    #[test]
    fn close_pane_refuses_when_only_one_remains() {
        let mut controller = Controller::new(stub_config(1));
        controller.close_pane(0);
        assert_eq!(controller.pane_count(), 1);
    }

    #[test]
    fn close_pane_removes_and_scrubs_overlay_and_watermark() {
        let mut controller = Controller::new(stub_config(3));
        controller.set_watermark(1, "marked");
        controller.add_overlay(1, 0);

        controller.close_pane(1);

        assert_eq!(controller.pane_count(), 2);
        assert_eq!(controller.grid.total_panes(), 2);
        assert!(controller.watermark(1).is_none());
    }

    #[test]
    fn close_pane_rehomes_focus_past_the_end() {
        let mut controller = Controller::new(stub_config(3));
        controller.set_focused_pane(2);
        controller.close_pane(2);
        assert_eq!(controller.pane_count(), 2);
        assert_eq!(controller.focused_pane(), 1);
    }

    #[test]
    fn swap_panes_swaps_watermarks() {
        let mut controller = Controller::new(stub_config(2));
        controller.set_watermark(0, "zero");
        controller.swap_panes(0, 1);
        assert_eq!(controller.watermark(0), None);
        assert_eq!(controller.watermark(1), Some("zero"));
    }

    #[test]
    fn cycle_focus_wraps_both_directions() {
        let mut controller = Controller::new(stub_config(3));
        assert_eq!(controller.focused_pane(), 0);
        controller.cycle_focus(-1);
        assert_eq!(controller.focused_pane(), 2);
        controller.cycle_focus(1);
        assert_eq!(controller.focused_pane(), 0);
    }

    #[test]
    fn dispatch_gui_action_jump_to_pane_is_bounds_checked() {
        let mut controller = Controller::new(stub_config(2));
        controller.dispatch_gui_action(GuiAction::JumpToPane(2));
        assert_eq!(controller.focused_pane(), 1);
        controller.dispatch_gui_action(GuiAction::JumpToPane(5));
        assert_eq!(controller.focused_pane(), 1, "out-of-range jump is ignored");
    }

    #[test]
    fn dispatch_gui_action_broadcast_toggle_flips_flag() {
        let mut controller = Controller::new(stub_config(1));
        assert!(!controller.broadcast_mode());
        controller.dispatch_gui_action(GuiAction::BroadcastToggle);
        assert!(controller.broadcast_mode());
    }

    #[test]
    fn apply_action_notify_and_message_both_push_notification() {
        let mut controller = Controller::new(stub_config(1));
        controller.apply_action(Action::Notify {
            title: "t".into(),
            body: "b".into(),
        });
        let n = controller.take_notification().unwrap();
        assert_eq!(n.title, "t");
        assert_eq!(n.seq, 1);

        controller.apply_action(Action::Message { text: "hi".into() });
        let n = controller.take_notification().unwrap();
        assert_eq!(n.title, "trm");
        assert_eq!(n.body, "hi");
        assert_eq!(n.seq, 2, "sequence keeps incrementing across notifications");
    }

    #[test]
    fn apply_action_context_usage_records_state() {
        let mut controller = Controller::new(stub_config(1));
        controller.apply_action(Action::ContextUsage {
            used_tokens: 10,
            total_tokens: 100,
            percentage: 10,
            session_id: "s".into(),
            is_pre_compact: false,
        });
        let usage = controller.context_usage().unwrap();
        assert_eq!(usage.used_tokens, 10);
        assert_eq!(usage.session_id, "s");
    }

    #[test]
    fn apply_action_close_pane_and_focus_pane_route_correctly() {
        let mut controller = Controller::new(stub_config(3));
        controller.apply_action(Action::FocusPane { pane: 2 });
        assert_eq!(controller.focused_pane(), 2);

        controller.apply_action(Action::ClosePane { pane: 0 });
        assert_eq!(controller.pane_count(), 2);
    }

    #[test]
    fn llm_submit_moves_status_to_waiting_until_polled() {
        let mut controller = Controller::new(stub_config(1));
        assert_eq!(controller.llm_status(), LlmStatus::Idle);
        controller.llm_submit("do the thing");
        assert_eq!(controller.llm_status(), LlmStatus::Waiting);
    }

    #[test]
    fn send_text_broadcasts_only_when_broadcast_mode_is_on() {
        let mut controller = Controller::new(stub_config(2));
        controller.send_text(b"hello");
        // Stub panes don't record input, but this must not panic and
        // must leave focus/broadcast state untouched either way.
        assert!(!controller.broadcast_mode());
        controller.dispatch_gui_action(GuiAction::BroadcastToggle);
        controller.send_text(b"hello all");
        assert!(controller.broadcast_mode());
    }
}
