//! The `PtyBackend` abstraction (`spec.md` §1 "out of scope: PTY
//! syscalls and process spawning", §4.C `TerminalPlugin`).
//!
//! `spec.md` deliberately treats PTY spawning as an external
//! collaborator whose internals aren't specified. [`PtyBackend`] is
//! that seam: [`TerminalPlugin`](super::terminal::TerminalPlugin) only
//! ever calls through the trait, never `portable_pty` directly. The
//! real implementation spawns a reader thread that feeds a channel —
//! the same shape this codebase already uses to turn a blocking PTY
//! read into something a non-blocking `poll()` can drain (see
//! `src/terminal/pty.rs` and `src/pane.rs` in the sibling example
//! repos this crate draws from) — so `try_read` never blocks the
//! controller thread even though the underlying `Read` impl does.

use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use portable_pty::{native_pty_system, CommandBuilder, MasterPty, PtySize};

use crate::error::CoreError;

/// Parameters for spawning a backing process behind a pane.
#[derive(Debug, Clone, Default)]
pub struct PtySpawnConfig {
    pub command: Option<String>,
    pub cwd: Option<String>,
    pub rows: u16,
    pub cols: u16,
}

/// The capability set `TerminalPlugin` needs from a PTY. No method may
/// block the caller.
pub trait PtyBackend: Send {
    /// Return any bytes that have arrived since the last call, without
    /// blocking. Returns an empty vector when nothing is available.
    fn try_read(&mut self) -> Vec<u8>;

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn resize(&mut self, rows: u16, cols: u16) -> io::Result<()>;

    fn child_pid(&self) -> Option<u32>;

    /// `true` once the child process has exited.
    fn is_exited(&mut self) -> bool;
}

/// `PtyBackend` over a real `portable_pty` pseudo-terminal. The
/// blocking reader runs on its own OS thread and forwards bytes
/// through an `mpsc` channel; `try_read` only ever calls
/// `Receiver::try_recv`, which never blocks.
pub struct PortablePtyBackend {
    writer: Box<dyn Write + Send>,
    master: Box<dyn MasterPty + Send>,
    child: Box<dyn portable_pty::Child + Send + Sync>,
    rx: Receiver<Vec<u8>>,
    exited: bool,
}

impl PortablePtyBackend {
    pub fn spawn(config: &PtySpawnConfig) -> Result<Self, CoreError> {
        let pty_system = native_pty_system();
        let size = PtySize {
            rows: config.rows.max(1),
            cols: config.cols.max(1),
            pixel_width: 0,
            pixel_height: 0,
        };
        let pair = pty_system
            .openpty(size)
            .map_err(|e| CoreError::PtySpawn(e.to_string()))?;

        let mut cmd = build_command(config.command.as_deref());
        if let Some(cwd) = &config.cwd {
            cmd.cwd(cwd);
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| CoreError::PtySpawn(e.to_string()))?;
        drop(pair.slave);

        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| CoreError::PtySpawn(e.to_string()))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| CoreError::PtySpawn(e.to_string()))?;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = [0u8; 8192];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            writer,
            master: pair.master,
            child,
            rx,
            exited: false,
        })
    }
}

impl PtyBackend for PortablePtyBackend {
    fn try_read(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(mut chunk) => out.append(&mut chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.exited = true;
                    break;
                }
            }
        }
        out
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()
    }

    fn resize(&mut self, rows: u16, cols: u16) -> io::Result<()> {
        self.master
            .resize(PtySize {
                rows: rows.max(1),
                cols: cols.max(1),
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }

    fn child_pid(&self) -> Option<u32> {
        self.child.process_id()
    }

    fn is_exited(&mut self) -> bool {
        if self.exited {
            return true;
        }
        if let Ok(Some(_)) = self.child.try_wait() {
            self.exited = true;
        }
        self.exited
    }
}

fn build_command(command: Option<&str>) -> CommandBuilder {
    match command {
        Some(cmd) => {
            let mut parts = shell_words::split(cmd).unwrap_or_else(|_| vec![cmd.to_string()]);
            if parts.is_empty() {
                default_shell()
            } else {
                let program = parts.remove(0);
                let mut builder = CommandBuilder::new(program);
                builder.args(parts);
                builder.env("TERM", "xterm-256color");
                builder
            }
        }
        None => default_shell(),
    }
}

fn default_shell() -> CommandBuilder {
    let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string());
    let mut builder = CommandBuilder::new(shell);
    builder.env("TERM", "xterm-256color");
    builder
}
