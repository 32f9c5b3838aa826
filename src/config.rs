//! Runtime settings for the relay server.

use serde::{Deserialize, Serialize};

use crate::browser::BrowserEngineConfig;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 11000;

/// Process-wide settings, built once at startup and handed to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Host to bind the HTTP listener on.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the HTTP listener on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on concurrently running browser sessions.
    /// `None` keeps sessions unbounded.
    #[serde(default)]
    pub max_sessions: Option<usize>,

    /// Browser launch options.
    #[serde(default)]
    pub browser: BrowserEngineConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_sessions: None,
            browser: BrowserEngineConfig::default(),
        }
    }
}

impl Settings {
    /// Address shown to humans in the startup banner.
    pub fn display_url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" => "localhost".to_string(),
            h if h.contains(':') => format!("[{}]", h),
            h => h.to_string(),
        };
        format!("http://{}:{}", host, self.port)
    }
}
