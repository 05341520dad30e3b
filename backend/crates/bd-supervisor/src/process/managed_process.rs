use crate::{Result, ServerLayout, SupervisorError};

use std::io::{BufRead, BufReader, Read, Write};
use std::os::unix::process::CommandExt;
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use log::{Level, warn};

/// Log target for lines the server itself prints.
pub const SERVER_LOG_TARGET: &str = "bedrock_server";

/// Exclusive handle on the running server child.
pub struct ManagedProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    pid: u32,
    forwarders: Vec<JoinHandle<()>>,
}

impl ManagedProcess {
    /// Start the server binary from inside the stable link directory.
    ///
    /// The child gets its own process group so terminal signals only reach
    /// the daemon, which then drives the stop sequence itself.
    pub fn spawn(layout: &ServerLayout) -> Result<Self> {
        let binary = std::path::absolute(layout.binary_path())
            .map_err(|e| SupervisorError::process("cannot resolve server binary path", Some(e)))?;

        let mut child = Command::new(&binary)
            .current_dir(&layout.link_path)
            .env("LD_LIBRARY_PATH", ".")
            .process_group(0)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SupervisorError::process(format!("failed to start {}", binary.display()), Some(e))
            })?;

        let pid = child.id();

        let Some(stdin) = child.stdin.take() else {
            child.kill().ok();
            child.wait().ok();
            return Err(SupervisorError::process(
                "server stdin was not captured",
                None,
            ));
        };

        let mut forwarders = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            forwarders.push(forward_lines("server-stdout", stdout, Level::Info)?);
        }
        if let Some(stderr) = child.stderr.take() {
            forwarders.push(forward_lines("server-stderr", stderr, Level::Warn)?);
        }

        Ok(Self {
            child,
            stdin: Some(stdin),
            pid,
            forwarders,
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Write one console line to the server.
    pub fn send_line(&mut self, text: &str) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| SupervisorError::process("server stdin is closed", None))?;

        writeln!(stdin, "{text}")
            .and_then(|()| stdin.flush())
            .map_err(|e| SupervisorError::process("failed to write to server stdin", Some(e)))
    }

    /// Block until the child exits, then close its input and drain output.
    pub fn wait(&mut self) -> Result<ExitStatus> {
        let status = self
            .child
            .wait()
            .map_err(|e| SupervisorError::process("failed waiting for server exit", Some(e)))?;

        self.stdin.take();
        for handle in self.forwarders.drain(..) {
            handle.join().ok();
        }

        Ok(status)
    }

    /// Non-blocking exit check.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        self.child
            .try_wait()
            .map_err(|e| SupervisorError::process("failed polling server process", Some(e)))
    }
}

impl Drop for ManagedProcess {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            warn!(
                "Server process {} still running while its handle is dropped, killing it",
                self.pid
            );
            self.child.kill().ok();
            self.child.wait().ok();
        }
    }
}

fn forward_lines<R>(name: &str, stream: R, level: Level) -> Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            for line in BufReader::new(stream).lines() {
                match line {
                    Ok(line) => log::log!(target: SERVER_LOG_TARGET, level, "{line}"),
                    Err(_) => break,
                }
            }
        })
        .map_err(|e| SupervisorError::process("failed to start output forwarder", Some(e)))
}
