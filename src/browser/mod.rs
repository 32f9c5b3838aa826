//! Browser session management.
//!
//! Each request gets its own browser process and page. The engine sits
//! behind the [`SessionManager`] / [`Session`] traits so handlers never see
//! `chromiumoxide` types and tests can substitute a recording fake.

mod chrome;
mod config;
#[cfg(test)]
pub(crate) mod fake;

pub use chrome::ChromeSessionManager;
pub use config::{BrowserEngineConfig, ACCEPT_LANGUAGE, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

use async_trait::async_trait;
use serde_json::Value;

/// Errors raised at the browser boundary.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to start browser session: {0}")]
    Start(String),
    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },
    #[error("In-page script failed: {0}")]
    Script(String),
}

/// Hands out fresh, isolated browser sessions.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Launch a new browser with one configured page.
    async fn acquire(&self) -> Result<Box<dyn Session>, SessionError>;
}

/// One browser process plus one page, owned by a single request.
#[async_trait]
pub trait Session: Send {
    /// Navigate the page, returning once the DOM is parsed.
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError>;

    /// Call `script` (a JS function expression) in the page with `args`
    /// passed as JSON literals, awaiting any returned promise.
    ///
    /// Failures inside the page are not reliably propagated as exceptions
    /// across the automation boundary, so scripts must catch their own
    /// errors and return `{ error: "..." }` instead. An `Err` here means
    /// the evaluation itself could not be carried out.
    async fn run_in_page(&mut self, script: &str, args: &[Value]) -> Result<Value, SessionError>;

    /// Tear the session down. Consumes the session so it cannot be
    /// released twice.
    async fn release(self: Box<Self>);
}

/// Build the expression that invokes `script` with `args`.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
pub(crate) fn invocation_expression(script: &str, args: &[Value]) -> String {
    let args = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("({})({})", script.trim(), args)
}
