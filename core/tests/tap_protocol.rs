//! Text Tap protocol-acceptance integration tests (`spec.md` §8
//! scenarios S1, S2, S3, S6, and property 7), run over a real Unix
//! stream socket rather than in-process, so they exercise the same
//! non-blocking accept/read path the controller drives every tick.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use termania_core::action::{Action, SendTarget};
use termania_core::tap::TextTapServer;

/// Each test gets its own `tempfile`-generated directory so the socket
/// path never collides with another test or a stale run.
fn socket_dir(name: &str) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::Builder::new()
        .prefix(&format!("termania-tap-{name}-"))
        .tempdir()
        .expect("create tempdir for tap socket");
    let path = dir.path().join("tap.sock");
    (dir, path)
}

fn connect(path: &std::path::Path) -> UnixStream {
    let stream = UnixStream::connect(path).expect("connect to tap socket");
    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    stream
}

fn send_line(stream: &mut UnixStream, value: &Value) {
    let mut line = value.to_string();
    line.push('\n');
    stream.write_all(line.as_bytes()).unwrap();
}

fn read_line(stream: &UnixStream) -> Value {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut line = String::new();
    reader.read_line(&mut line).expect("read tap reply");
    serde_json::from_str(line.trim_end()).expect("reply is valid json")
}

/// S1: `list_panes` replies with the server's configured pane count.
#[test]
fn s1_list_panes_replies_with_pane_count() {
    let (_dir, path) = socket_dir("s1");
    let mut server = TextTapServer::new(&path, 3);
    server.start().unwrap();

    let mut client = connect(&path);
    send_line(&mut client, &json!({"type": "list_panes"}));
    server.poll();

    let reply = read_line(&client);
    assert_eq!(reply, json!({"pane_count": 3}));

    server.stop();
}

/// S2: `send` enqueues exactly one `RawSend{Pane(0), "ls -la"}` and
/// acknowledges with `{"status": "queued"}`.
#[test]
fn s2_send_enqueues_raw_send_and_acks() {
    let (_dir, path) = socket_dir("s2");
    let mut server = TextTapServer::new(&path, 3);
    server.start().unwrap();

    let mut client = connect(&path);
    send_line(&mut client, &json!({"type": "send", "pane": 0, "text": "ls -la"}));
    server.poll();

    let reply = read_line(&client);
    assert_eq!(reply, json!({"status": "queued"}));

    let actions = server.drain_actions();
    assert_eq!(
        actions,
        vec![Action::RawSend {
            target: SendTarget::Pane(0),
            bytes: "ls -la".to_string(),
        }]
    );

    server.stop();
}

/// S3: `{"type":"action","action":"notify",...}` yields a `Notify`
/// action.
#[test]
fn s3_notify_action_is_enqueued() {
    let (_dir, path) = socket_dir("s3");
    let mut server = TextTapServer::new(&path, 1);
    server.start().unwrap();

    let mut client = connect(&path);
    send_line(
        &mut client,
        &json!({"type": "action", "action": "notify", "title": "A", "body": "B"}),
    );
    server.poll();

    let reply = read_line(&client);
    assert_eq!(reply, json!({"status": "queued"}));

    let actions = server.drain_actions();
    assert_eq!(
        actions,
        vec![Action::Notify {
            title: "A".to_string(),
            body: "B".to_string(),
        }]
    );

    server.stop();
}

/// S6: a `context_update` tap message with a `PreCompact` hook type
/// produces a fully-populated `ContextUsage` action.
#[test]
fn s6_context_update_produces_context_usage() {
    let (_dir, path) = socket_dir("s6");
    let mut server = TextTapServer::new(&path, 1);
    server.start().unwrap();

    let mut client = connect(&path);
    send_line(
        &mut client,
        &json!({
            "type": "context_update",
            "payload": {
                "context_window": {"used": 100000, "total": 200000, "used_percentage": 50},
                "session_id": "abc",
                "hook_type": "PreCompact",
            }
        }),
    );
    server.poll();

    let reply = read_line(&client);
    assert_eq!(reply, json!({"status": "queued"}));

    let actions = server.drain_actions();
    assert_eq!(
        actions,
        vec![Action::ContextUsage {
            used_tokens: 100000,
            total_tokens: 200000,
            percentage: 50,
            session_id: "abc".to_string(),
            is_pre_compact: true,
        }]
    );

    server.stop();
}

/// Property 7: a subscribed client receives a broadcast; a
/// non-subscribed client does not.
#[test]
fn property7_broadcast_reaches_only_subscribed_clients() {
    let (_dir, path) = socket_dir("p7");
    let mut server = TextTapServer::new(&path, 1);
    server.start().unwrap();

    let mut subscribed = connect(&path);
    let unsubscribed = connect(&path);

    send_line(&mut subscribed, &json!({"type": "subscribe"}));
    server.poll();
    let reply = read_line(&subscribed);
    assert_eq!(reply, json!({"status": "subscribed"}));

    server.broadcast(b"hello\n");

    let mut reader = BufReader::new(subscribed.try_clone().unwrap());
    let mut line = String::new();
    reader.read_line(&mut line).expect("subscribed client receives broadcast");
    assert_eq!(line, "hello\n");

    unsubscribed
        .set_read_timeout(Some(Duration::from_millis(200)))
        .unwrap();
    let mut unsub_reader = BufReader::new(unsubscribed.try_clone().unwrap());
    let mut unsub_line = String::new();
    let err = unsub_reader.read_line(&mut unsub_line).unwrap_err();
    assert!(matches!(
        err.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    ));

    server.stop();
}

/// Unknown command types get `{"error":"unknown command"}`.
#[test]
fn unknown_command_returns_error_reply() {
    let (_dir, path) = socket_dir("unknown");
    let mut server = TextTapServer::new(&path, 1);
    server.start().unwrap();

    let mut client = connect(&path);
    send_line(&mut client, &json!({"type": "not_a_real_command"}));
    server.poll();

    let reply = read_line(&client);
    assert_eq!(reply, json!({"error": "unknown command"}));

    server.stop();
}

/// A malformed client (buffer fills with no newline) is evicted rather
/// than allowed to starve other clients (`spec.md` §4.F).
#[test]
fn oversized_line_without_newline_is_discarded_not_fatal() {
    let (_dir, path) = socket_dir("overflow");
    let mut server = TextTapServer::new(&path, 1);
    server.start().unwrap();

    let mut client = connect(&path);
    let junk = vec![b'x'; 5000];
    client.write_all(&junk).unwrap();
    server.poll();

    send_line(&mut client, &json!({"type": "list_panes"}));
    server.poll();

    let reply = read_line(&client);
    assert_eq!(reply, json!({"pane_count": 1}));

    server.stop();
}
