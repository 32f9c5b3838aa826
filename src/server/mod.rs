//! Web server exposing the download relay.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use crate::browser::{ChromeSessionManager, SessionManager};
use crate::config::Settings;
use crate::download::DownloadService;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub downloads: DownloadService,
}

impl AppState {
    pub fn new(sessions: Arc<dyn SessionManager>, max_sessions: Option<usize>) -> Self {
        Self {
            downloads: DownloadService::new(sessions, max_sessions),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let sessions: Arc<dyn SessionManager> =
        Arc::new(ChromeSessionManager::new(settings.browser.clone()));
    let state = AppState::new(sessions, settings.max_sessions);
    let app = create_router(state);

    let addr = bind_addr(&settings.host, settings.port)?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Resolve the listen address. Accepts IPv4, IPv6 and host names.
fn bind_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| anyhow::anyhow!("No address found for host {}", host))
}
