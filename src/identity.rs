//! Process identity, captured once and handed to request handlers.

use serde::Serialize;

/// Identifies the OS process serving a request.
///
/// Read once at startup; the value never changes for the lifetime of the
/// process, so it is `Copy` and stored directly in handler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessIdentity {
    pub pid: u32,
}

impl ProcessIdentity {
    pub fn current() -> Self {
        Self {
            pid: std::process::id(),
        }
    }
}

/// Which of the two binaries this process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Service {
    RecipeApi,
    WebApi,
}

impl Service {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RecipeApi => "recipe-api",
            Self::WebApi => "web-api",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
