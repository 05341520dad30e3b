use std::fmt;

/// Opaque server version token, compared for equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerVersion(String);

impl ServerVersion {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
