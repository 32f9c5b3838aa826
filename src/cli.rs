//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;
use console::style;

use crate::browser::BrowserEngineConfig;
use crate::config::{Settings, DEFAULT_PORT};

#[derive(Debug, Parser)]
#[command(name = "moviebox-relay")]
#[command(about = "Relay MovieBox download listings through a headless browser")]
#[command(version)]
pub struct Cli {
    /// Host to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Chrome/Chromium executable (auto-detected if unset)
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long, env = "BROWSER_HEADFUL")]
    pub headful: bool,

    /// Navigation timeout in seconds
    #[arg(long, env = "BROWSER_TIMEOUT", default_value = "30")]
    pub browser_timeout: u64,

    /// Proxy server for the browser (e.g. socks5://127.0.0.1:1080)
    #[arg(long, env = "BROWSER_PROXY")]
    pub proxy: Option<String>,

    /// Maximum concurrent browser sessions (unbounded if unset)
    #[arg(long, env = "MAX_SESSIONS")]
    pub max_sessions: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            host: self.host.clone(),
            port: self.port,
            max_sessions: self.max_sessions,
            browser: BrowserEngineConfig {
                headless: !self.headful,
                chrome_executable: self.chrome_path.clone(),
                proxy: self.proxy.clone(),
                timeout: self.browser_timeout,
                chrome_args: Vec::new(),
            },
        }
    }
}

/// Parse arguments and run the server.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings();

    println!(
        "{} Direct download server running at {}",
        style("✅").green(),
        settings.display_url()
    );
    if let Some(max) = settings.max_sessions {
        println!("  Browser sessions capped at {}", max);
    }
    println!("  Press Ctrl+C to stop");

    crate::server::serve(&settings).await
}
