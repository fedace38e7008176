//! Guesses for runs launched with a bare environment or without a display.

use tracing::debug;

/// `HOME` used when the variable is missing or empty.
pub const FALLBACK_HOME: &str = "/tmp/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    home: Option<String>,
    display: Option<String>,
}

impl Environment {
    /// Reads `HOME` and `DISPLAY` through `lookup`; empty values count as unset.
    pub fn detect(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            home: read("HOME"),
            display: read("DISPLAY"),
        }
    }

    pub fn from_process() -> Self {
        Self::detect(|key| std::env::var(key).ok())
    }

    /// The `HOME` this run should use.
    pub fn home(&self) -> &str {
        self.home.as_deref().unwrap_or(FALLBACK_HOME)
    }

    /// No display to show a plot on.
    pub fn is_headless(&self) -> bool {
        self.display.is_none()
    }

    /// Exports the fallback `HOME` into the process environment when needed.
    pub fn apply(&self) {
        if self.home.is_none() {
            debug!(home = FALLBACK_HOME, "HOME not set, using fallback");
            std::env::set_var("HOME", FALLBACK_HOME);
        }
        if self.is_headless() {
            debug!("DISPLAY not set, plots are only written to file");
        }
    }
}
