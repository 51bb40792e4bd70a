//! The Text Tap server (`spec.md` §3 `TextTapServer`/`TextTapClient`,
//! §4.F, §6.2).
//!
//! A non-blocking, single-threaded Unix-socket listener speaking a
//! newline-framed JSON protocol. Every socket in this module — the
//! listener and every accepted client — is set `O_NONBLOCK` so
//! `poll()` never stalls the controller tick (`spec.md` §5).

use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::PathBuf;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::action::{parser::raw_send, Action, SendTarget};
use crate::error::CoreError;

/// Bounded per-client read buffer (`spec.md` §3 `TextTapClient`, §5).
const CLIENT_BUFFER_CAP: usize = 4096;

struct TapClient {
    id: uuid::Uuid,
    stream: UnixStream,
    subscribed: bool,
    buf: Vec<u8>,
}

impl TapClient {
    fn new(stream: UnixStream) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            stream,
            subscribed: false,
            buf: Vec::with_capacity(CLIENT_BUFFER_CAP),
        }
    }
}

pub struct TextTapServer {
    socket_path: PathBuf,
    pane_count: u32,
    running: bool,
    listener: Option<UnixListener>,
    clients: Vec<TapClient>,
    pending_actions: VecDeque<Action>,
}

impl TextTapServer {
    pub fn new(socket_path: impl Into<PathBuf>, pane_count: u32) -> Self {
        Self {
            socket_path: socket_path.into(),
            pane_count,
            running: false,
            listener: None,
            clients: Vec::new(),
            pending_actions: VecDeque::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_pane_count(&mut self, count: u32) {
        self.pane_count = count;
    }

    /// Bind and listen. Double-start is a no-op (`spec.md` §4.F).
    pub fn start(&mut self) -> Result<(), CoreError> {
        if self.running {
            return Ok(());
        }

        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }

        let listener =
            UnixListener::bind(&self.socket_path).map_err(|e| CoreError::TapBind {
                path: self.socket_path.display().to_string(),
                source: e,
            })?;
        listener.set_nonblocking(true).map_err(CoreError::TapIo)?;
        set_close_on_exec(&listener);

        info!(path = %self.socket_path.display(), "text tap listening");
        self.listener = Some(listener);
        self.running = true;
        Ok(())
    }

    /// Close every client, the listener, and remove the socket file.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        info!(path = %self.socket_path.display(), "text tap stopping");
        self.clients.clear();
        self.listener = None;
        let _ = std::fs::remove_file(&self.socket_path);
        self.running = false;
    }

    /// One tick: accept until `WouldBlock`, then read every client.
    /// Safe to remove clients mid-iteration (iterated in reverse).
    pub fn poll(&mut self) {
        if !self.running {
            return;
        }

        if let Some(listener) = &self.listener {
            loop {
                match listener.accept() {
                    Ok((stream, _addr)) => {
                        if stream.set_nonblocking(true).is_ok() {
                            set_close_on_exec(&stream);
                            let client = TapClient::new(stream);
                            debug!(client = %client.id, "text tap client connected");
                            self.clients.push(client);
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                    Err(e) => {
                        warn!(error = %e, "text tap accept error");
                        break;
                    }
                }
            }
        }

        for i in (0..self.clients.len()).rev() {
            if !self.service_client(i) {
                debug!(client = %self.clients[i].id, "text tap client evicted");
                self.clients.remove(i);
            }
        }
    }

    /// Read and process everything currently available from client `i`.
    /// Returns `false` if the client should be evicted.
    fn service_client(&mut self, i: usize) -> bool {
        let mut read_buf = [0u8; 4096];
        loop {
            let read_result = self.clients[i].stream.read(&mut read_buf);
            match read_result {
                Ok(0) => return false,
                Ok(n) => {
                    let client = &mut self.clients[i];
                    if client.buf.len() + n > CLIENT_BUFFER_CAP {
                        warn!("text tap client buffer overflow, discarding");
                        client.buf.clear();
                    } else {
                        client.buf.extend_from_slice(&read_buf[..n]);
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(_) => return false,
            }
        }

        loop {
            let line = {
                let client = &mut self.clients[i];
                match client.buf.iter().position(|&b| b == b'\n') {
                    Some(pos) => {
                        let line: Vec<u8> = client.buf.drain(..=pos).collect();
                        line
                    }
                    None => break,
                }
            };
            let text = String::from_utf8_lossy(&line);
            let trimmed = text.trim_matches(|c: char| c == ' ' || c == '\t' || c == '\r' || c == '\n');
            if trimmed.is_empty() {
                continue;
            }
            self.handle_line(i, trimmed);
        }

        true
    }

    fn handle_line(&mut self, client_idx: usize, line: &str) {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "text tap: malformed json line");
                self.reply(client_idx, &json!({"error": "unknown command"}));
                return;
            }
        };

        let reply = self.dispatch(client_idx, &value);
        if let Some(reply) = reply {
            self.reply(client_idx, &reply);
        }
    }

    /// Dispatch a request object; returns the JSON reply to send, if any.
    fn dispatch(&mut self, client_idx: usize, value: &Value) -> Option<Value> {
        let Some(ty) = value.get("type").and_then(Value::as_str) else {
            return Some(json!({"error": "unknown command"}));
        };
        match ty {
            "subscribe" => {
                if let Some(c) = self.clients.get_mut(client_idx) {
                    c.subscribed = true;
                }
                Some(json!({"status": "subscribed"}))
            }
            "unsubscribe" => {
                if let Some(c) = self.clients.get_mut(client_idx) {
                    c.subscribed = false;
                }
                Some(json!({"status": "unsubscribed"}))
            }
            "list_panes" => Some(json!({"pane_count": self.pane_count})),
            "read_pane" => {
                let pane = value.get("pane").and_then(Value::as_u64).unwrap_or(0);
                Some(json!({"status": "read_pane_queued", "pane": pane}))
            }
            "send" => {
                if let (Some(pane), Some(text)) = (
                    value.get("pane").and_then(Value::as_u64),
                    value.get("text").and_then(Value::as_str),
                ) {
                    self.pending_actions
                        .push_back(raw_send(SendTarget::Pane(pane as u32), text));
                    Some(json!({"status": "queued"}))
                } else {
                    None
                }
            }
            "send_all" => {
                if let Some(text) = value.get("text").and_then(Value::as_str) {
                    self.pending_actions
                        .push_back(raw_send(SendTarget::All, text));
                    Some(json!({"status": "queued"}))
                } else {
                    None
                }
            }
            "action" => self.dispatch_action(value),
            "context_update" => self.dispatch_context_update(value),
            _ => Some(json!({"error": "unknown command"})),
        }
    }

    fn dispatch_action(&mut self, value: &Value) -> Option<Value> {
        let action_ty = value.get("action").and_then(Value::as_str)?;
        let action = match action_ty {
            "send_command" => Action::SendCommand {
                pane: value.get("pane")?.as_u64()? as u32,
                command: value.get("command")?.as_str()?.to_string(),
            },
            "send_to_all" => Action::SendToAll {
                command: value.get("command")?.as_str()?.to_string(),
            },
            "message" => Action::Message {
                text: value.get("text")?.as_str()?.to_string(),
            },
            "notify" => Action::Notify {
                title: value.get("title")?.as_str()?.to_string(),
                body: value.get("body")?.as_str()?.to_string(),
            },
            _ => return None,
        };
        self.pending_actions.push_back(action);
        Some(json!({"status": "queued"}))
    }

    fn dispatch_context_update(&mut self, value: &Value) -> Option<Value> {
        let payload = value.get("payload")?.as_object()?;
        let window = payload.get("context_window")?.as_object()?;
        let used = window.get("used").and_then(Value::as_u64).unwrap_or(0);
        let total = window.get("total").and_then(Value::as_u64).unwrap_or(0);
        let percentage = window
            .get("used_percentage")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let session_id = payload
            .get("session_id")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let is_pre_compact = payload
            .get("hook_type")
            .and_then(Value::as_str)
            .map(|s| s == "PreCompact")
            .unwrap_or(false);

        self.pending_actions.push_back(Action::ContextUsage {
            used_tokens: used,
            total_tokens: total,
            percentage: crate::action::clamp_percentage(percentage),
            session_id,
            is_pre_compact,
        });
        Some(json!({"status": "queued"}))
    }

    fn reply(&mut self, client_idx: usize, value: &Value) {
        if let Some(client) = self.clients.get_mut(client_idx) {
            let mut line = value.to_string();
            line.push('\n');
            let _ = client.stream.write_all(line.as_bytes());
        }
    }

    /// Drain every action enqueued since the last call, in insertion
    /// order (`spec.md` §5).
    pub fn drain_actions(&mut self) -> Vec<Action> {
        self.pending_actions.drain(..).collect()
    }

    /// Write `bytes` verbatim to every subscribed client. Write errors
    /// are swallowed — the broadcast is advisory (`spec.md` §4.F).
    pub fn broadcast(&mut self, bytes: &[u8]) {
        for client in &mut self.clients {
            if client.subscribed {
                let _ = client.stream.write_all(bytes);
            }
        }
    }

    /// Compose and broadcast a `pane_output` message with JSON-escaped
    /// content (`spec.md` §4.F `broadcast_pane_content`).
    pub fn broadcast_pane_content(&mut self, pane: u32, content: &str) {
        let mut line = format!(r#"{{"type":"pane_output","pane":{pane},"content":""#);
        escape_json_string(content, &mut line);
        line.push_str("\"}\n");
        self.broadcast(line.as_bytes());
    }
}

/// Escape `"`, `\`, and control characters for embedding inside a JSON
/// double-quoted string (`spec.md` §4.F, §4.G).
pub fn escape_json_string(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
}

fn set_close_on_exec(stream: &impl AsRawFd) {
    let fd = stream.as_raw_fd();
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFD);
        if flags >= 0 {
            libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC);
        }
    }
}
