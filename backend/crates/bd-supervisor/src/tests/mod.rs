mod controller;

use crate::{ServerLayout, ShutdownTiming, UpstreamClient};

use std::io::{Cursor, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;

use bd_config::UpstreamConfig;
use zip::write::SimpleFileOptions;

pub(crate) const TEST_VERSION: &str = "1.20.1.02";

/// Stand-in server: records every console line, exits on `stop`.
pub(crate) const FAKE_SERVER: &str = r#"#!/bin/sh
echo "Server started."
while IFS= read -r line; do
  echo "$line" >> commands.log
  if [ "$line" = "stop" ]; then
    echo "Quit correctly"
    exit 0
  fi
done
"#;

/// Stand-in server that dies on its own.
pub(crate) const CRASHING_SERVER: &str = "#!/bin/sh\necho \"Crashing\" >&2\nexit 3\n";

pub(crate) fn fast_timing() -> ShutdownTiming {
    ShutdownTiming {
        countdown_steps: 6,
        step: Duration::from_millis(10),
        grace: Duration::from_millis(10),
    }
}

pub(crate) fn layout_in(root: &Path) -> ServerLayout {
    ServerLayout {
        install_root: root.to_path_buf(),
        link_path: root.join("bedrock-server"),
        binary: "bedrock_server".to_string(),
        data_root: root.join("data"),
        data_entries: vec![
            "worlds".to_string(),
            "server.properties".to_string(),
            "permissions.json".to_string(),
            "whitelist.json".to_string(),
        ],
    }
}

pub(crate) fn write_script(path: &Path, body: &str) {
    std::fs::write(path, body).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Lay out an already-active install the way a previous run would leave it.
pub(crate) fn install_server(root: &Path, script: &str) -> std::path::PathBuf {
    let dir = root.join(format!("bedrock-server-{TEST_VERSION}"));
    std::fs::create_dir_all(&dir).unwrap();
    write_script(&dir.join("bedrock_server"), script);
    std::fs::write(dir.join("version"), TEST_VERSION).unwrap();
    std::os::unix::fs::symlink(&dir, root.join("bedrock-server")).unwrap();
    dir
}

/// Console lines the fake server received.
pub(crate) fn recorded_commands(install_dir: &Path) -> Vec<String> {
    std::fs::read_to_string(install_dir.join("commands.log"))
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

pub(crate) fn upstream_config(base_uri: &str) -> UpstreamConfig {
    UpstreamConfig {
        page_url: format!("{base_uri}/en-us/download/server/bedrock"),
        timeout_secs: 5,
        ..UpstreamConfig::default()
    }
}

pub(crate) fn upstream_client(base_uri: &str) -> UpstreamClient {
    UpstreamClient::new(&upstream_config(base_uri)).unwrap()
}

pub(crate) fn archive_path(version: &str) -> String {
    format!("/bin-linux/bedrock-server-{version}.zip")
}

pub(crate) fn download_page(base_uri: &str, version: &str) -> String {
    format!(
        r#"<html><body>
<a href="{base_uri}/bin-win/bedrock-server-{version}.zip" class="btn">Windows</a>
<a href="{base_uri}{}" class="btn">Ubuntu</a>
</body></html>"#,
        archive_path(version)
    )
}

/// Minimal server archive: binary, default properties and a world folder.
pub(crate) fn server_archive() -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().unix_permissions(0o644);

    zip.start_file("bedrock_server", options).unwrap();
    zip.write_all(FAKE_SERVER.as_bytes()).unwrap();

    zip.start_file("server.properties", options).unwrap();
    zip.write_all(b"server-name=Dedicated Server\n").unwrap();

    zip.add_directory("worlds/", options).unwrap();
    zip.start_file("worlds/level.dat", options).unwrap();
    zip.write_all(b"level").unwrap();

    zip.finish().unwrap().into_inner()
}
