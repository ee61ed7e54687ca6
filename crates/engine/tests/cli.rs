//! End-to-end tests of the `trello-responder` binary.
//!
//! The binary is pointed at a config file in a temp dir; remote services are
//! an Axum stub serving both the Trello and the Pandorabots endpoints.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::process::Output;
use std::sync::{Arc, Mutex};

use axum::extract::{Form, Path as UrlPath, State};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::process::Command;

const BIN: &str = env!("CARGO_BIN_EXE_trello-responder");

/// Keys the binary would otherwise pick up from the test runner's environment.
const INHERITED: &[&str] = &[
    "TRELLO_KEY",
    "TRELLO_TOKEN",
    "TRELLO_USER_ID",
    "PANDORA_BOT_ID",
    "TRELLO_API_URL",
    "PANDORA_API_URL",
    "HTTP_TIMEOUT_SECS",
    "RUST_LOG",
];

async fn run_binary(config_path: &Path) -> Output {
    run_binary_with_env(config_path, &[]).await
}

/// Run the binary with `env` set on top of a scrubbed environment.
async fn run_binary_with_env(config_path: &Path, env: &[(&str, String)]) -> Output {
    let mut command = Command::new(BIN);
    for key in INHERITED {
        command.env_remove(key);
    }
    for (key, value) in env {
        command.env(key, value);
    }
    command
        .env("TRELLO_RESPONDER_CONFIG", config_path)
        .output()
        .await
        .unwrap()
}

#[derive(Default)]
struct Remote {
    listing: String,
    hits: Mutex<Vec<String>>,
}

async fn listing(State(remote): State<Arc<Remote>>, UrlPath(user): UrlPath<String>) -> String {
    remote.hits.lock().unwrap().push(format!("list {user}"));
    remote.listing.clone()
}

async fn comment(
    State(remote): State<Arc<Remote>>,
    UrlPath(card): UrlPath<String>,
    Form(form): Form<HashMap<String, String>>,
) -> &'static str {
    let text = form.get("text").cloned().unwrap_or_default();
    remote.hits.lock().unwrap().push(format!("comment {card} {text}"));
    "{}"
}

async fn read_all(State(remote): State<Arc<Remote>>) -> &'static str {
    remote.hits.lock().unwrap().push("read all".to_string());
    "[]"
}

async fn talk(
    State(remote): State<Arc<Remote>>,
    Form(form): Form<HashMap<String, String>>,
) -> String {
    let input = form.get("input").cloned().unwrap_or_default();
    remote.hits.lock().unwrap().push(format!("talk {input}"));
    format!(r#"<result status="0"><input>{input}</input><that>echo: {input}</that></result>"#)
}

async fn start_remote(listing_body: &str) -> (u16, Arc<Remote>) {
    let remote = Arc::new(Remote {
        listing: listing_body.to_string(),
        ..Remote::default()
    });

    let app = Router::new()
        .route("/1/members/{user}/notifications", get(listing))
        .route("/1/cards/{card}/actions/comments", post(comment))
        .route("/1/notifications/all/read", post(read_all))
        .route("/pandora/talk-xml", post(talk))
        .with_state(Arc::clone(&remote));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (port, remote)
}

fn write_config(dir: &Path, port: u16) -> std::path::PathBuf {
    let path = dir.join("config.env");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "TRELLO_KEY=key").unwrap();
    writeln!(file, "TRELLO_TOKEN=token").unwrap();
    writeln!(file, "TRELLO_USER_ID=bot").unwrap();
    writeln!(file, "PANDORA_BOT_ID=abc123").unwrap();
    writeln!(file, "TRELLO_API_URL=http://127.0.0.1:{port}/1").unwrap();
    writeln!(file, "PANDORA_API_URL=http://127.0.0.1:{port}/pandora").unwrap();
    writeln!(file, "HTTP_TIMEOUT_SECS=5").unwrap();
    path
}

#[tokio::test]
async fn test_missing_config_exits_non_zero_with_instructions() {
    let listing = r#"[{"id": "n1", "data": {"text": "hello", "card": {"id": "c1"}}}]"#;
    let (port, remote) = start_remote(listing).await;
    let dir = tempfile::tempdir().unwrap();

    // Everything but the artifact itself is available to the process.
    let env = [
        ("TRELLO_KEY", "key".to_string()),
        ("TRELLO_TOKEN", "token".to_string()),
        ("TRELLO_USER_ID", "bot".to_string()),
        ("PANDORA_BOT_ID", "abc123".to_string()),
        ("TRELLO_API_URL", format!("http://127.0.0.1:{port}/1")),
        ("PANDORA_API_URL", format!("http://127.0.0.1:{port}/pandora")),
    ];
    let output = run_binary_with_env(&dir.path().join("config.env"), &env).await;

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Copy config.dist.env to"),
        "unexpected stdout: {stdout}"
    );
    assert!(remote.hits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_incomplete_config_exits_with_config_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.env");
    std::fs::write(&path, "TRELLO_KEY=key\n").unwrap();

    let output = run_binary(&path).await;
    assert_eq!(output.status.code(), Some(1));
}

#[tokio::test]
async fn test_full_pass_against_stub_services() {
    let listing = r#"[
        {"id": "n1", "type": "commentCard", "data": {"text": "hello", "card": {"id": "c1"}}},
        {"id": "n2", "type": "commentCard", "data": {"text": "bye", "card": {"id": "c2"}}}
    ]"#;
    let (port, remote) = start_remote(listing).await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), port);

    let output = run_binary(&config).await;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        *remote.hits.lock().unwrap(),
        vec![
            "list bot",
            "talk hello",
            "comment c1 echo: hello",
            "talk bye",
            "comment c2 echo: bye",
            "read all",
        ]
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("2 notifications found."));
    assert!(stdout.trim_end().ends_with("Done"));
}

#[tokio::test]
async fn test_empty_pass_exits_zero_without_marking_read() {
    let (port, remote) = start_remote("[]").await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), port);

    let output = run_binary(&config).await;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(*remote.hits.lock().unwrap(), vec!["list bot"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("There is no comment to reply."));
}

#[tokio::test]
async fn test_malformed_listing_exits_with_parse_code() {
    let (port, remote) = start_remote("<html>maintenance</html>").await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), port);

    let output = run_binary(&config).await;

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(*remote.hits.lock().unwrap(), vec!["list bot"]);
}
