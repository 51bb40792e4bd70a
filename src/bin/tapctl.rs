//! `tapctl` — a small developer CLI for talking to a running
//! orchestrator's Text Tap socket, the same newline-JSON protocol any
//! automation client speaks.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

/// `--version` banner: crate version plus the build provenance stamped
/// by `build.rs` (`spec.md` §9 ambient tooling; format matches the
/// teacher's own `"{} ({})", BUILD_NUMBER, GIT_HASH` convention, e.g.
/// `examples/ediblackk-mylm/src/cli/hub.rs:1158`).
const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (build ",
    env!("BUILD_NUMBER"),
    ", ",
    env!("GIT_HASH"),
    ")"
);

/// Talk to a Termania Text Tap socket.
#[derive(Parser)]
#[command(name = "tapctl")]
#[command(about = "Developer CLI for the Termania Text Tap socket")]
#[command(version = VERSION)]
struct Cli {
    /// Path to the Text Tap unix socket.
    #[arg(long, default_value = "/tmp/termania.sock")]
    socket: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current pane count.
    ListPanes,
    /// Send text (with a trailing carriage return) to one pane.
    Send {
        pane: u32,
        text: String,
    },
    /// Send text to every pane.
    SendAll {
        text: String,
    },
    /// Subscribe and print `pane_output` broadcasts until interrupted.
    Subscribe,
    /// Subscribe and print every message, annotated with its line number.
    Watch,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let stream = UnixStream::connect(&cli.socket)
        .with_context(|| format!("connecting to text tap socket at {}", cli.socket))?;
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    let mut writer = stream.try_clone().context("cloning socket handle")?;
    let mut reader = BufReader::new(stream);

    match cli.command {
        Commands::ListPanes => {
            send_request(&mut writer, &json!({"type": "list_panes"}))?;
            let reply = read_reply(&mut reader)?;
            let count = reply.get("pane_count").and_then(Value::as_u64).unwrap_or(0);
            println!("{count} pane(s)");
        }
        Commands::Send { pane, text } => {
            send_request(&mut writer, &json!({"type": "send", "pane": pane, "text": text}))?;
            let reply = read_reply(&mut reader)?;
            println!("{reply}");
        }
        Commands::SendAll { text } => {
            send_request(&mut writer, &json!({"type": "send_all", "text": text}))?;
            let reply = read_reply(&mut reader)?;
            println!("{reply}");
        }
        Commands::Subscribe => {
            send_request(&mut writer, &json!({"type": "subscribe"}))?;
            let _ = read_reply(&mut reader)?;
            watch_loop(&mut reader, false)?;
        }
        Commands::Watch => {
            send_request(&mut writer, &json!({"type": "subscribe"}))?;
            let _ = read_reply(&mut reader)?;
            watch_loop(&mut reader, true)?;
        }
    }

    Ok(())
}

fn send_request(writer: &mut UnixStream, value: &Value) -> Result<()> {
    let mut line = value.to_string();
    line.push('\n');
    writer.write_all(line.as_bytes()).context("writing to text tap socket")?;
    Ok(())
}

fn read_reply(reader: &mut BufReader<UnixStream>) -> Result<Value> {
    let mut line = String::new();
    let n = reader.read_line(&mut line).context("reading text tap reply")?;
    if n == 0 {
        bail!("text tap closed the connection");
    }
    serde_json::from_str(line.trim_end()).context("parsing text tap reply as json")
}

fn watch_loop(reader: &mut BufReader<UnixStream>, numbered: bool) -> Result<()> {
    let mut seq = 0u64;
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => bail!("text tap closed the connection"),
            Ok(_) => {
                seq += 1;
                if numbered {
                    println!("[{seq}] {}", line.trim_end());
                } else {
                    println!("{}", line.trim_end());
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut => {
                continue;
            }
            Err(e) => return Err(e).context("reading from text tap socket"),
        }
    }
}
