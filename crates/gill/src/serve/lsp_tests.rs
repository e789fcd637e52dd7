//! End-to-end language server sessions against stand-in fish tools.
//!
//! The server runs on one end of an in-memory duplex; the tests speak
//! JSON-RPC with `Content-Length` framing on the other end, the way an
//! editor would.

use super::lsp::GillBackend;
use serde_json::{Value, json};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{
    AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf,
};
use tower_lsp::{LspService, Server};

const UNTITLED: &str = "untitled:Untitled-1";
const QUIET: Duration = Duration::from_millis(1500);

/// Write an executable shell script standing in for a fish binary.
fn stand_in(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Reports `saw <first line>` as a syntax error, sleeping first when the
/// buffer starts with `slow`.
const ECHOING_FISH: &str = r#"read -r first
cat >/dev/null
if [ "$first" = slow ]; then sleep 1; fi
echo "Standard input (line 1): saw $first" >&2
exit 127"#;

/// Upper-cases the buffer, sleeping first when it starts with `slow`.
const SLOW_UPCASER: &str = r#"input=$(cat)
case "$input" in slow*) sleep 1 ;; esac
printf '%s\n' "$input" | tr a-z A-Z"#;

struct Session {
    reader: BufReader<ReadHalf<DuplexStream>>,
    writer: WriteHalf<DuplexStream>,
    next_id: i64,
    dir: tempfile::TempDir,
}

impl Session {
    /// Start a server whose `fish` and `fish_indent` are the given scripts.
    async fn start(fish: &str, fish_indent: &str, lint: Value) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let fish = stand_in(dir.path(), "fish", fish);
        let fish_indent = stand_in(dir.path(), "fish_indent", fish_indent);

        let (client_end, server_end) = tokio::io::duplex(1 << 20);
        let (server_read, server_write) = tokio::io::split(server_end);
        let (service, socket) = LspService::new(|client| GillBackend::new(client, None));
        tokio::spawn(Server::new(server_read, server_write, socket).serve(service));

        let (reader, writer) = tokio::io::split(client_end);
        let mut session = Session {
            reader: BufReader::new(reader),
            writer,
            next_id: 0,
            dir,
        };

        let root = tower_lsp::lsp_types::Url::from_directory_path(session.dir.path()).unwrap();
        let response = session
            .request(
                "initialize",
                json!({
                    "processId": null,
                    "rootUri": root,
                    "capabilities": {},
                    "initializationOptions": {
                        "gill": {
                            "tools": { "fish": fish, "fish_indent": fish_indent, "timeout_ms": 5000 },
                            "lint": lint,
                        }
                    }
                }),
            )
            .await;
        assert!(response["result"]["capabilities"].is_object(), "{response}");
        session.notify("initialized", json!({})).await;
        session
    }

    async fn send(&mut self, message: Value) {
        let body = message.to_string();
        let framed = format!("Content-Length: {}\r\n\r\n{}", body.len(), body);
        self.writer.write_all(framed.as_bytes()).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn notify(&mut self, method: &str, params: Value) {
        self.send(json!({ "jsonrpc": "2.0", "method": method, "params": params }))
            .await;
    }

    /// Send a request without waiting; returns its id.
    async fn start_request(&mut self, method: &str, params: Value) -> i64 {
        self.next_id += 1;
        let id = self.next_id;
        self.send(json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }))
            .await;
        id
    }

    async fn request(&mut self, method: &str, params: Value) -> Value {
        let id = self.start_request(method, params).await;
        self.response(id).await.0
    }

    async fn recv(&mut self) -> Value {
        let mut length = None;
        loop {
            let mut header = String::new();
            self.reader.read_line(&mut header).await.unwrap();
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some(value) = header.strip_prefix("Content-Length: ") {
                length = Some(value.parse::<usize>().unwrap());
            }
        }
        let mut body = vec![0; length.expect("Content-Length header")];
        self.reader.read_exact(&mut body).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    /// Next message, or `None` if the server stays quiet for `wait`.
    async fn recv_within(&mut self, wait: Duration) -> Option<Value> {
        tokio::time::timeout(wait, self.recv()).await.ok()
    }

    /// Read until the response to `id`, returning it and the notifications
    /// that arrived first.
    async fn response(&mut self, id: i64) -> (Value, Vec<Value>) {
        let mut seen = Vec::new();
        loop {
            let message = self
                .recv_within(Duration::from_secs(10))
                .await
                .expect("response before timeout");
            if message["id"] == id && message.get("method").is_none() {
                return (message, seen);
            }
            seen.push(message);
        }
    }

    /// Read until a notification with `method`, returning it and what came before.
    async fn notification(&mut self, method: &str) -> (Value, Vec<Value>) {
        let mut seen = Vec::new();
        loop {
            let message = self
                .recv_within(Duration::from_secs(10))
                .await
                .unwrap_or_else(|| panic!("{method} before timeout"));
            if message["method"] == method {
                return (message, seen);
            }
            seen.push(message);
        }
    }

    /// The error shown to the user, reading on if it is not among `seen`.
    async fn error_message(&mut self, seen: Vec<Value>) -> String {
        let shown = match seen.into_iter().find(|m| is_error_message(m)) {
            Some(message) => message,
            None => loop {
                let message = self
                    .recv_within(Duration::from_secs(10))
                    .await
                    .expect("error message before timeout");
                if is_error_message(&message) {
                    break message;
                }
            },
        };
        shown["params"]["message"].as_str().unwrap_or_default().to_string()
    }

    async fn open(&mut self, text: &str, version: i32) {
        self.notify(
            "textDocument/didOpen",
            json!({ "textDocument": {
                "uri": UNTITLED, "languageId": "fish", "version": version, "text": text
            }}),
        )
        .await;
    }

    async fn change(&mut self, text: &str, version: i32) {
        self.notify(
            "textDocument/didChange",
            json!({
                "textDocument": { "uri": UNTITLED, "version": version },
                "contentChanges": [{ "text": text }]
            }),
        )
        .await;
    }

    async fn close(&mut self) {
        self.notify("textDocument/didClose", json!({ "textDocument": { "uri": UNTITLED } }))
            .await;
    }

    async fn start_formatting(&mut self) -> i64 {
        self.start_request(
            "textDocument/formatting",
            json!({
                "textDocument": { "uri": UNTITLED },
                "options": { "tabSize": 4, "insertSpaces": true }
            }),
        )
        .await
    }
}

fn is_error_message(message: &Value) -> bool {
    message["method"] == "window/showMessage" && message["params"]["type"] == 1
}

#[tokio::test]
async fn test_lint_publishes_versioned_diagnostics() {
    let mut s = Session::start(ECHOING_FISH, "cat", json!({ "debounce_ms": 0 })).await;
    s.open("echo hi\n", 3).await;

    let (published, _) = s.notification("textDocument/publishDiagnostics").await;
    let params = &published["params"];
    assert_eq!(params["uri"], UNTITLED);
    assert_eq!(params["version"], 3);
    assert_eq!(params["diagnostics"][0]["message"], "saw echo hi");
    assert_eq!(params["diagnostics"][0]["source"], "fish");
    assert_eq!(params["diagnostics"][0]["range"]["start"]["line"], 0);
}

#[tokio::test]
async fn test_superseded_lint_result_is_dropped() {
    let lint = json!({ "debounce_ms": 0, "on_change": true });
    let mut s = Session::start(ECHOING_FISH, "cat", lint).await;

    // The open lint is still inside the slow tool when the edit arrives.
    s.open("slow\n", 1).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    s.change("fast\n", 2).await;

    let (published, _) = s.notification("textDocument/publishDiagnostics").await;
    assert_eq!(published["params"]["version"], 2);
    assert_eq!(published["params"]["diagnostics"][0]["message"], "saw fast");

    // The slow run finishes later and must not overwrite the newer result.
    while let Some(message) = s.recv_within(QUIET).await {
        assert_ne!(
            message["method"], "textDocument/publishDiagnostics",
            "stale publish: {message}"
        );
    }
}

#[tokio::test]
async fn test_lint_failure_is_shown_and_clears_diagnostics() {
    let broken = "cat >/dev/null\necho 'internal trouble' >&2\nexit 2";
    let mut s = Session::start(broken, "cat", json!({ "debounce_ms": 0 })).await;
    s.open("echo hi\n", 1).await;

    let (published, before) = s.notification("textDocument/publishDiagnostics").await;
    assert_eq!(published["params"]["diagnostics"], json!([]));
    let text = s.error_message(before).await;
    assert!(text.contains("internal trouble"), "{text}");
}

#[tokio::test]
async fn test_formatting_replaces_whole_document() {
    let mut s = Session::start(ECHOING_FISH, SLOW_UPCASER, json!({ "on_open": false })).await;
    s.open("echo hi", 1).await;

    let id = s.start_formatting().await;
    let (response, _) = s.response(id).await;
    let edits = response["result"].as_array().expect("edits");
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0]["newText"], "ECHO HI\n");
    assert_eq!(edits[0]["range"]["start"], json!({ "line": 0, "character": 0 }));
    assert_eq!(edits[0]["range"]["end"], json!({ "line": 0, "character": 7 }));
}

#[tokio::test]
async fn test_formatting_dropped_after_edit() {
    let mut s = Session::start(ECHOING_FISH, SLOW_UPCASER, json!({ "on_open": false })).await;
    s.open("slow echo\n", 1).await;

    let id = s.start_formatting().await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    s.change("slow echo hi\n", 2).await;

    let (response, _) = s.response(id).await;
    assert_eq!(response["result"], Value::Null, "{response}");
}

#[tokio::test]
async fn test_formatting_dropped_after_reopen_at_same_version() {
    let mut s = Session::start(ECHOING_FISH, SLOW_UPCASER, json!({ "on_open": false })).await;
    s.open("slow echo\n", 1).await;

    let id = s.start_formatting().await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    s.close().await;
    s.open("slow if true\n", 1).await;

    let (response, _) = s.response(id).await;
    assert_eq!(response["result"], Value::Null, "{response}");
}

#[tokio::test]
async fn test_formatting_failure_returns_no_edits() {
    let broken = "cat >/dev/null\necho 'cannot indent' >&2\nexit 1";
    let mut s = Session::start(ECHOING_FISH, broken, json!({ "on_open": false })).await;
    s.open("echo hi\n", 1).await;

    let id = s.start_formatting().await;
    let (response, before) = s.response(id).await;
    assert_eq!(response["result"], Value::Null);
    let text = s.error_message(before).await;
    assert!(text.contains("cannot indent"), "{text}");
}

#[tokio::test]
async fn test_formatter_exiting_early_on_large_buffer() {
    // Exits without reading stdin, so the server's write hits a closed pipe.
    let mut s = Session::start(ECHOING_FISH, "exit 1", json!({ "on_open": false })).await;
    s.open(&"echo hi\n".repeat(40_000), 1).await;

    let id = s.start_formatting().await;
    let (response, before) = s.response(id).await;
    assert_eq!(response["result"], Value::Null);
    let text = s.error_message(before).await;
    assert!(text.contains("exited with code 1"), "{text}");
}
