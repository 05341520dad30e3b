use std::fmt;

/// How the managed server should be brought down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownRequest {
    /// Countdown with per-step player broadcasts, then stop
    Graceful,
    /// Single warning, short grace period, then stop
    Immediate,
}

impl fmt::Display for ShutdownRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graceful => f.write_str("graceful"),
            Self::Immediate => f.write_str("immediate"),
        }
    }
}
