//! HTML to PDF conversion engines

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use headless_chrome::{types::PrintToPdfOptions, Browser, LaunchOptions};

use super::RenderError;

/// A4 in inches
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;

/// 1 cm in inches
const MARGIN_IN: f64 = 0.39;

/// Converts a complete HTML document into PDF bytes
///
/// Implemented by the headless Chrome engine in production and by fakes in
/// tests, so the HTTP layer never needs a browser to be exercised.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PdfEngine: Send + Sync {
    /// Render `html` to a PDF document
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the engine fails or times out
    async fn html_to_pdf(&self, html: String) -> Result<Vec<u8>, RenderError>;
}

/// Headless Chrome/Chromium engine
///
/// A browser is launched per render on the blocking thread pool and torn
/// down afterwards; the whole render is bounded by `timeout`.
///
/// When the bound fires the caller gets [`RenderError::Timeout`] at once, but
/// the blocking task cannot be cancelled. Every browser call it makes carries
/// the same `timeout`, so the task fails on its own shortly after and the
/// browser process is killed when the task drops it.
#[derive(Debug, Clone)]
pub struct ChromeEngine {
    chrome_path: Option<PathBuf>,
    timeout: Duration,
}

impl ChromeEngine {
    /// Create an engine using the given browser binary (auto-detected when
    /// `None`)
    #[must_use]
    pub const fn new(chrome_path: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            chrome_path,
            timeout,
        }
    }

    fn print_options() -> PrintToPdfOptions {
        PrintToPdfOptions {
            print_background: Some(true),
            paper_width: Some(A4_WIDTH_IN),
            paper_height: Some(A4_HEIGHT_IN),
            margin_top: Some(MARGIN_IN),
            margin_bottom: Some(MARGIN_IN),
            margin_left: Some(MARGIN_IN),
            margin_right: Some(MARGIN_IN),
            ..PrintToPdfOptions::default()
        }
    }

    fn render_blocking(
        chrome_path: Option<PathBuf>,
        timeout: Duration,
        html: &str,
    ) -> Result<Vec<u8>, RenderError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .path(chrome_path)
            .idle_browser_timeout(timeout)
            .build()
            .map_err(|e| RenderError::engine(format!("invalid launch options: {e}")))?;

        let browser = Browser::new(options)
            .map_err(|e| RenderError::engine(format!("failed to launch browser: {e}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| RenderError::engine(format!("failed to open tab: {e}")))?;
        tab.set_default_timeout(timeout);

        let url = format!("data:text/html;charset=utf-8;base64,{}", STANDARD.encode(html));
        tab.navigate_to(&url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| RenderError::engine(format!("failed to load document: {e}")))?;

        tab.print_to_pdf(Some(Self::print_options()))
            .map_err(|e| RenderError::engine(format!("failed to print: {e}")))
    }
}

#[async_trait]
impl PdfEngine for ChromeEngine {
    async fn html_to_pdf(&self, html: String) -> Result<Vec<u8>, RenderError> {
        let chrome_path = self.chrome_path.clone();
        let timeout = self.timeout;

        let task =
            tokio::task::spawn_blocking(move || Self::render_blocking(chrome_path, timeout, &html));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(RenderError::Join(join.to_string())),
            Err(_) => Err(RenderError::Timeout(self.timeout)),
        }
    }
}
