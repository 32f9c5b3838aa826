//! Chromium-backed sessions driven over CDP with chromiumoxide.

#[cfg(feature = "browser")]
use std::path::{Path, PathBuf};
#[cfg(feature = "browser")]
use std::time::Duration;

use async_trait::async_trait;
#[cfg(feature = "browser")]
use serde_json::Value;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
#[cfg(feature = "browser")]
use chromiumoxide::handler::viewport::Viewport;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;

#[cfg(feature = "browser")]
use super::config::{ACCEPT_LANGUAGE, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
#[cfg(feature = "browser")]
use super::invocation_expression;
use super::{BrowserEngineConfig, Session, SessionError, SessionManager};

/// Resolves once the DOM has been parsed.
#[cfg(feature = "browser")]
const WAIT_FOR_DOM_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
        }
    })
"#;

/// Launches one Chromium process per acquired session.
pub struct ChromeSessionManager {
    #[cfg_attr(not(feature = "browser"), allow(dead_code))]
    config: BrowserEngineConfig,
}

impl ChromeSessionManager {
    /// Common Chrome executable paths to check.
    #[cfg(feature = "browser")]
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }

    /// Find the Chrome executable: configured path first, then well-known
    /// locations, then `PATH`.
    #[cfg(feature = "browser")]
    fn find_chrome(&self) -> Result<PathBuf, SessionError> {
        if let Some(ref path) = self.config.chrome_executable {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(SessionError::Start(format!(
                "Configured Chrome executable not found: {}",
                path.display()
            )));
        }

        for path in Self::CHROME_PATHS {
            let p = Path::new(path);
            if p.exists() {
                debug!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(path) = which::which(cmd) {
                debug!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(SessionError::Start(
            "Chrome/Chromium not found. Install it or set CHROME_PATH".to_string(),
        ))
    }

    #[cfg(feature = "browser")]
    fn browser_config(&self, chrome_path: PathBuf) -> Result<BrowserConfig, SessionError> {
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .request_timeout(Duration::from_secs(self.config.timeout))
            .window_size(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
            .viewport(Viewport {
                width: VIEWPORT_WIDTH,
                height: VIEWPORT_HEIGHT,
                ..Default::default()
            });

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        if let Some(ref proxy) = self.config.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }

        // Sandboxing has to be off inside most containers
        builder = builder
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage");

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        builder
            .build()
            .map_err(|e| SessionError::Start(format!("Failed to build browser config: {}", e)))
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl SessionManager for ChromeSessionManager {
    async fn acquire(&self) -> Result<Box<dyn Session>, SessionError> {
        let chrome_path = self.find_chrome()?;
        let config = self.browser_config(chrome_path)?;

        info!("Launching browser (headless={})", self.config.headless);
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SessionError::Start(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = match open_page(&browser).await {
            Ok(page) => page,
            Err(e) => {
                shutdown(&mut browser, handler_task).await;
                return Err(e);
            }
        };

        Ok(Box::new(ChromeSession {
            browser,
            page,
            handler_task,
            timeout: Duration::from_secs(self.config.timeout),
        }))
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
#[async_trait]
impl SessionManager for ChromeSessionManager {
    async fn acquire(&self) -> Result<Box<dyn Session>, SessionError> {
        Err(SessionError::Start(
            "Browser support not compiled. Rebuild with: cargo build --features browser"
                .to_string(),
        ))
    }
}

/// Open the session's single page with the fixed language header.
#[cfg(feature = "browser")]
async fn open_page(browser: &Browser) -> Result<Page, SessionError> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| SessionError::Start(format!("Failed to open page: {}", e)))?;

    let headers = Headers::new(serde_json::json!({ "Accept-Language": ACCEPT_LANGUAGE }));
    page.execute(SetExtraHttpHeadersParams::new(headers))
        .await
        .map_err(|e| SessionError::Start(format!("Failed to set extra headers: {}", e)))?;

    Ok(page)
}

/// Close the browser and stop its CDP handler.
#[cfg(feature = "browser")]
async fn shutdown(browser: &mut Browser, handler_task: JoinHandle<()>) {
    if let Err(e) = browser.close().await {
        warn!("Failed to close browser: {}", e);
    }
    if let Err(e) = browser.wait().await {
        warn!("Failed to wait for browser exit: {}", e);
    }
    handler_task.abort();
}

#[cfg(feature = "browser")]
struct ChromeSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    timeout: Duration,
}

#[cfg(feature = "browser")]
impl ChromeSession {
    /// Wait until the DOM is parsed, bounded by the navigation timeout.
    async fn wait_for_dom_ready(&self, url: &str) -> Result<(), SessionError> {
        let ready = self.page.evaluate(WAIT_FOR_DOM_SCRIPT.to_string());
        let outcome = tokio::time::timeout(self.timeout, ready)
            .await
            .ok()
            .map(|res| {
                res.map(|r| {
                    r.into_value::<String>()
                        .unwrap_or_else(|_| "unknown".to_string())
                })
                .map_err(|e| e.to_string())
            });
        dom_ready_result(url, outcome, self.timeout)
    }
}

/// Map the ready-state check to the navigation result. `None` means the
/// check timed out.
#[cfg(feature = "browser")]
fn dom_ready_result(
    url: &str,
    outcome: Option<Result<String, String>>,
    timeout: Duration,
) -> Result<(), SessionError> {
    let message = match outcome {
        Some(Ok(state)) => {
            debug!("Page ready state: {}", state);
            return Ok(());
        }
        Some(Err(e)) => format!("Page not ready: {}", e),
        None => format!("Timed out after {}s waiting for DOM", timeout.as_secs()),
    };
    Err(SessionError::Navigation {
        url: url.to_string(),
        message,
    })
}

#[cfg(feature = "browser")]
#[async_trait]
impl Session for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        info!("Navigating to {}", url);
        let nav_error = |message: String| SessionError::Navigation {
            url: url.to_string(),
            message,
        };

        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| nav_error(format!("Invalid URL: {}", e)))?;

        let response = tokio::time::timeout(self.timeout, self.page.execute(nav_params))
            .await
            .map_err(|_| nav_error(format!("Timed out after {}s", self.timeout.as_secs())))?
            .map_err(|e| nav_error(e.to_string()))?;

        if let Some(ref error_text) = response.result.error_text {
            return Err(nav_error(error_text.clone()));
        }

        self.wait_for_dom_ready(url).await
    }

    async fn run_in_page(&mut self, script: &str, args: &[Value]) -> Result<Value, SessionError> {
        let params = EvaluateParams::builder()
            .expression(invocation_expression(script, args))
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(SessionError::Script)?;

        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(|e| SessionError::Script(e.to_string()))?;

        // `undefined` and `null` come back without a value
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn release(self: Box<Self>) {
        let ChromeSession {
            mut browser,
            page,
            handler_task,
            ..
        } = *self;
        drop(page);
        shutdown(&mut browser, handler_task).await;
        debug!("Browser session released");
    }
}
