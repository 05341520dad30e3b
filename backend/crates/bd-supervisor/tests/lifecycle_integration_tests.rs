//! End-to-end supervisor runs against a mock vendor page and a scripted server.

use bd_config::UpstreamConfig;
use bd_supervisor::{
    ControllerState, LockFile, ProcessController, RunOutcome, ServerLayout, ShutdownRequest,
    ShutdownTiming, ShutdownTrigger, Supervisor, UpdateFetcher, UpstreamClient, VersionResolver,
};

use std::io::{Cursor, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;

const VERSION: &str = "1.21.2.02";
const PAGE_PATH: &str = "/en-us/download/server/bedrock";

const FAKE_SERVER: &str = r#"#!/bin/sh
echo "Server started."
while IFS= read -r line; do
  echo "$line" >> commands.log
  if [ "$line" = "stop" ]; then
    exit 0
  fi
done
"#;

fn archive_url_path() -> String {
    format!("/bin-linux/bedrock-server-{VERSION}.zip")
}

fn server_archive() -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("bedrock_server", options).unwrap();
    zip.write_all(FAKE_SERVER.as_bytes()).unwrap();
    zip.start_file("server.properties", options).unwrap();
    zip.write_all(b"server-name=Dedicated Server\n").unwrap();

    zip.finish().unwrap().into_inner()
}

async fn vendor(page: impl FnOnce(&str) -> String, archive: Option<Vec<u8>>) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&server.uri())))
        .mount(&server)
        .await;

    if let Some(bytes) = archive {
        Mock::given(method("GET"))
            .and(path(archive_url_path()))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
            .mount(&server)
            .await;
    }

    server
}

fn page_with_link(base: &str) -> String {
    format!(r#"<a href="{base}{}">Download</a>"#, archive_url_path())
}

struct Harness {
    temp: TempDir,
    supervisor: Supervisor,
}

impl Harness {
    fn new(vendor_uri: &str) -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_path_buf();

        let upstream = Arc::new(
            UpstreamClient::new(&UpstreamConfig {
                page_url: format!("{vendor_uri}{PAGE_PATH}"),
                timeout_secs: 5,
                ..UpstreamConfig::default()
            })
            .unwrap(),
        );

        let layout = ServerLayout {
            install_root: root.clone(),
            link_path: root.join("bedrock-server"),
            binary: "bedrock_server".to_string(),
            data_root: root.join("data"),
            data_entries: vec!["worlds".to_string(), "server.properties".to_string()],
        };

        let timing = ShutdownTiming {
            countdown_steps: 6,
            step: Duration::from_millis(10),
            grace: Duration::from_millis(10),
        };

        let supervisor = Supervisor::with_parts(
            VersionResolver::new(
                upstream.clone(),
                root.join("bedrock-server").join("version"),
            ),
            UpdateFetcher::new(upstream, root.clone(), "version".to_string()),
            ProcessController::new(layout, timing),
        );

        Self { temp, supervisor }
    }

    fn root(&self) -> &Path {
        self.temp.path()
    }

    fn lock(&self) -> (LockFile, PathBuf) {
        let path = self.root().join("bedrock-daemon.lock");
        (LockFile::acquire(&path).unwrap(), path)
    }
}

async fn wait_until_running(rx: &mut tokio::sync::watch::Receiver<ControllerState>) {
    tokio::time::timeout(
        Duration::from_secs(10),
        rx.wait_for(|s| matches!(s, ControllerState::Running { .. })),
    )
    .await
    .expect("server never reached Running")
    .expect("state channel closed");
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn given_fresh_install_when_quit_requested_then_graceful_path_and_lock_removed() {
    // Given
    let vendor = vendor(page_with_link, Some(server_archive())).await;
    let harness = Harness::new(&vendor.uri());
    std::fs::create_dir_all(harness.root().join("data")).unwrap();

    let installed = harness.supervisor.check_for_update().await;
    assert!(installed.is_some());

    let (lock, lock_path) = harness.lock();
    let (trigger, requests) = ShutdownTrigger::channel();
    let mut state = harness.supervisor.subscribe();

    let Harness { temp, supervisor } = harness;
    let run = tokio::task::spawn_blocking(move || supervisor.run(lock, installed, requests));

    // When
    wait_until_running(&mut state).await;
    trigger.request(ShutdownRequest::Graceful, "test");
    let outcome = run.await.unwrap().unwrap();

    // Then
    assert_eq!(outcome, RunOutcome::Stopped(ShutdownRequest::Graceful));
    assert_eq!(*state.borrow(), ControllerState::Stopped);
    assert!(!lock_path.exists());

    let commands: Vec<String> =
        std::fs::read_to_string(temp.path().join("bedrock-server").join("commands.log"))
            .unwrap()
            .lines()
            .map(String::from)
            .collect();
    assert_eq!(commands.len(), 8);
    assert_eq!(commands.last().map(String::as_str), Some("stop"));

    let persisted = temp.path().join("data").join("server.properties");
    assert!(persisted.is_file());
    let install_copy = temp
        .path()
        .join(format!("bedrock-server-{VERSION}"))
        .join("server.properties");
    assert!(
        std::fs::symlink_metadata(install_copy)
            .unwrap()
            .file_type()
            .is_symlink()
    );
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn given_unparseable_page_when_starting_then_existing_install_runs_and_interrupt_stops_it() {
    // Given
    let vendor = vendor(|_| "<html>no links today</html>".to_string(), None).await;
    let harness = Harness::new(&vendor.uri());
    preinstall(harness.root());

    let installed = harness.supervisor.check_for_update().await;
    assert!(installed.is_none());

    let (lock, lock_path) = harness.lock();
    let (trigger, requests) = ShutdownTrigger::channel();
    let mut state = harness.supervisor.subscribe();
    let commands_dir = harness.root().join("bedrock-server");

    let Harness { temp: _temp, supervisor } = harness;
    let run = tokio::task::spawn_blocking(move || supervisor.run(lock, installed, requests));

    // When
    wait_until_running(&mut state).await;
    trigger.request(ShutdownRequest::Immediate, "test");
    let outcome = run.await.unwrap().unwrap();

    // Then
    assert_eq!(outcome, RunOutcome::Stopped(ShutdownRequest::Immediate));
    assert!(!lock_path.exists());
    let commands = std::fs::read_to_string(commands_dir.join("commands.log")).unwrap();
    assert_eq!(commands, "say shutting down NOW...\nstop\n");
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn given_request_before_launch_when_running_then_server_never_started() {
    // Given
    let vendor = vendor(|_| "<html></html>".to_string(), None).await;
    let harness = Harness::new(&vendor.uri());
    preinstall(harness.root());

    let (lock, lock_path) = harness.lock();
    let (trigger, requests) = ShutdownTrigger::channel();
    trigger.request(ShutdownRequest::Graceful, "test");
    let state = harness.supervisor.subscribe();

    // When
    let Harness { temp, supervisor } = harness;
    let outcome = tokio::task::spawn_blocking(move || supervisor.run(lock, None, requests))
        .await
        .unwrap()
        .unwrap();

    // Then
    assert_eq!(outcome, RunOutcome::Stopped(ShutdownRequest::Graceful));
    assert_eq!(*state.borrow(), ControllerState::Stopped);
    assert!(
        !temp
            .path()
            .join("bedrock-server")
            .join("commands.log")
            .exists()
    );
    assert!(!lock_path.exists());
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn given_nothing_installed_and_vendor_down_when_running_then_fatal_and_lock_removed() {
    // Given
    let vendor = MockServer::start().await;
    let harness = Harness::new(&vendor.uri());

    let installed = harness.supervisor.check_for_update().await;
    let (lock, lock_path) = harness.lock();
    let (_trigger, requests) = ShutdownTrigger::channel();

    // When
    let Harness { temp: _temp, supervisor } = harness;
    let result = tokio::task::spawn_blocking(move || supervisor.run(lock, installed, requests))
        .await
        .unwrap();

    // Then
    assert!(result.is_err());
    assert!(!lock_path.exists());
}

fn preinstall(root: &Path) {
    let dir = root.join("bedrock-server-1.20.0.01");
    std::fs::create_dir_all(&dir).unwrap();
    let binary = dir.join("bedrock_server");
    std::fs::write(&binary, FAKE_SERVER).unwrap();
    std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755)).unwrap();
    std::fs::write(dir.join("version"), "1.20.0.01").unwrap();
    std::os::unix::fs::symlink(&dir, root.join("bedrock-server")).unwrap();
}
