use std::fs::{read_to_string, write};
use std::sync::{Arc, Mutex};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

const STORE_WITH_HOME_ARTICLE: &str = r#"{
  "records": [
    {
      "data_object_id": "dsArticle",
      "primary_key": "pk-home",
      "fields": {
        "HostName": "dev.example.com",
        "ArticleID": "home",
        "CSS": "body { margin: 0; }"
      }
    }
  ]
}"#;

#[test]
fn publish_cli_merges_stylesheet_into_store() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("store.json");
    let config = dir.path().join("publish.json");
    write(&store, STORE_WITH_HOME_ARTICLE).unwrap();
    write(dir.path().join("theme.css"), ".a { color: blue; }").unwrap();
    write(
        &config,
        r#"{"hostname": "dev.example.com", "targets": [["theme.css", "home", "article-style"]]}"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("appframe-publish").expect("Binary exists");
    cmd.arg("publish")
        .arg("--config")
        .arg(&config)
        .arg("--store")
        .arg(&store)
        .env("APPFRAME_USER", "publisher")
        .env("APPFRAME_PASSWORD", "secret");

    cmd.assert().success().stdout(predicate::str::contains(
        "Publish completed. 1 of 1 items published successfully.",
    ));

    let stored = read_to_string(&store).unwrap();
    assert!(stored.contains("START EXTERNAL STYLESHEET 'theme.css'"), "store: {stored}");
    assert!(stored.contains(".a { color: blue; }"));
    assert!(stored.contains("body { margin: 0; }"));
}

#[test]
fn publish_cli_reports_nothing_published_for_missing_article() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("store.json");
    write(dir.path().join("theme.css"), ".a {}").unwrap();

    let mut cmd = Command::cargo_bin("appframe-publish").expect("Binary exists");
    cmd.current_dir(dir.path())
        .arg("publish")
        .arg("--store")
        .arg(&store)
        .args(["--hostname", "dev.example.com"])
        .args(["--source", "theme.css"])
        .args(["--target", "missing"])
        .args(["--type", "article-style"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Nothing published successfully."));
}

#[test]
fn publish_cli_logs_to_stderr_under_rust_log() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("appframe-publish").expect("Binary exists");
    cmd.current_dir(dir.path())
        .env("RUST_LOG", "debug")
        .arg("publish")
        .arg("--store")
        .arg(dir.path().join("store.json"))
        .args(["--hostname", "dev.example.com"]);

    cmd.assert()
        .success()
        .stdout("Nothing published successfully.\n")
        .stderr(predicate::str::contains("trace_initialised"));
}

#[test]
fn publish_cli_rejects_invalid_type() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("appframe-publish").expect("Binary exists");
    cmd.arg("publish")
        .arg("--store")
        .arg(dir.path().join("store.json"))
        .args(["--type", "bogus"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("'bogus' is not a valid type."));
}

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use appframe_publish::cli::{run, Cli, Commands};

    let cli = Cli {
        command: Commands::Publish {
            config: Some(std::path::PathBuf::from("dummy.yaml")),
            store: std::path::PathBuf::from("dummy-store.json"),
            domain: None,
            hostname: None,
            source: None,
            target: None,
            kind: None,
            article: None,
            user: None,
            password: None,
        },
    };

    let _ = run(cli).await;

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
