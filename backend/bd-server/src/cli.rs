use clap::{ArgGroup, Parser};

#[derive(Parser, Debug)]
#[command(name = "bedrock-daemon")]
#[command(about = "Keeps a Minecraft Bedrock dedicated server installed, current and running")]
#[command(version)]
#[command(group(ArgGroup::new("action").args(["shutdown", "terminate", "healthcheck"])))]
pub struct Cli {
    /// Ask the running daemon for a graceful (counted down) shutdown
    #[arg(long)]
    pub shutdown: bool,

    /// Ask the running daemon to stop the server now
    #[arg(long)]
    pub terminate: bool,

    /// Query the running daemon's health
    #[arg(long)]
    pub healthcheck: bool,

    /// Control URL of the running daemon (defaults to control.host/control.port)
    #[arg(long, requires = "action")]
    pub server: Option<String>,
}

/// One-shot request sent to an already running daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Shutdown,
    Terminate,
    Healthcheck,
}

impl Cli {
    /// The one-shot action, or None for daemon mode.
    pub fn action(&self) -> Option<ControlAction> {
        if self.shutdown {
            Some(ControlAction::Shutdown)
        } else if self.terminate {
            Some(ControlAction::Terminate)
        } else if self.healthcheck {
            Some(ControlAction::Healthcheck)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ControlAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ControlAction::Shutdown => "shutdown",
            ControlAction::Terminate => "terminate",
            ControlAction::Healthcheck => "healthcheck",
        };
        f.write_str(name)
    }
}
