//! Rendered tier: headless Chromium over the DevTools protocol.
//!
//! Only consulted when the basic tier's text matches nothing. Each call owns
//! a dedicated browser with a throw-away profile directory; the browser is
//! closed before the call returns, and the profile is removed on drop, so a
//! failed navigation or a panic does not leave it behind.
//!
//! # Feature Flag
//!
//! The browser code is compiled with the `render` feature (on by default).
//! Without it, or with `--no-render`, [`RenderedExtractor::extract`] logs and
//! returns empty text, and the orchestrator reports nothing found.

use super::TextExtractor;
use crate::config::RenderConfig;
use crate::models::ExtractMethod;
use tracing::{info, instrument, warn};
#[cfg(feature = "render")]
use crate::utils::truncate_for_log;
#[cfg(feature = "render")]
use tracing::debug;

/// Headless-browser extractor.
#[derive(Debug, Clone)]
pub struct RenderedExtractor {
    config: RenderConfig,
}

impl RenderedExtractor {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Whether this build can drive a browser at all.
    pub fn available() -> bool {
        cfg!(feature = "render")
    }
}

impl TextExtractor for RenderedExtractor {
    fn method(&self) -> ExtractMethod {
        ExtractMethod::Rendered
    }

    #[instrument(level = "info", skip_all, fields(%url))]
    async fn extract(&self, url: &str) -> String {
        if !self.config.enabled {
            info!("Rendered fallback disabled by configuration");
            return String::new();
        }
        self.render(url).await
    }
}

impl RenderedExtractor {
    #[cfg(feature = "render")]
    async fn render(&self, url: &str) -> String {
        match browser::render_top_text(url, &self.config).await {
            Ok(text) => {
                info!(chars = text.chars().count(), "Extracted rendered top-of-page text");
                debug!(preview = %truncate_for_log(&text, 300), "Rendered text");
                text
            }
            Err(e) => {
                warn!(error = %e, "Rendered fetch failed; continuing with empty text");
                String::new()
            }
        }
    }

    /// Rendering is not compiled in; always empty.
    #[cfg(not(feature = "render"))]
    async fn render(&self, _url: &str) -> String {
        warn!("Rendered fallback unavailable: built without the `render` feature");
        String::new()
    }
}

#[cfg(feature = "render")]
mod browser {
    use super::super::{RENDERED_REGIONS, Region, assemble_text};
    use crate::config::RenderConfig;
    use crate::error::WatchError;
    use crate::utils::truncate_chars;
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::page::Page;
    use futures::StreamExt;
    use std::path::{Path, PathBuf};
    use tokio::task::JoinHandle;
    use tokio::time::{sleep, timeout};
    use tracing::{debug, warn};

    fn browser_err(e: impl std::fmt::Display) -> WatchError {
        WatchError::Browser(e.to_string())
    }

    /// Launch, collect, tear down.
    pub(super) async fn render_top_text(
        url: &str,
        config: &RenderConfig,
    ) -> Result<String, WatchError> {
        let session = BrowserSession::launch(config).await?;
        let collected = session.collect(url, config).await;
        session.close().await;
        collected
    }

    /// A launched browser plus the task pumping its protocol events.
    struct BrowserSession {
        browser: Browser,
        handler: JoinHandle<()>,
        // Dropped last, after the browser.
        _profile_dir: ProfileDir,
    }

    /// Throw-away browser profile, removed when dropped.
    #[derive(Debug)]
    pub(super) struct ProfileDir(PathBuf);

    impl ProfileDir {
        pub(super) fn new() -> Self {
            Self(std::env::temp_dir().join(format!(
                "banner-watch-{}-{}",
                std::process::id(),
                chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
            )))
        }

        pub(super) fn path(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for ProfileDir {
        fn drop(&mut self) {
            if let Err(e) = std::fs::remove_dir_all(&self.0) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!(path = %self.0.display(), error = %e, "Profile cleanup failed");
                }
            }
        }
    }

    impl BrowserSession {
        async fn launch(config: &RenderConfig) -> Result<Self, WatchError> {
            let profile_dir = ProfileDir::new();

            let mut builder = BrowserConfig::builder()
                .user_data_dir(profile_dir.path())
                .request_timeout(config.nav_timeout)
                .window_size(1280, 1024)
                .arg("--no-first-run")
                .arg("--no-default-browser-check")
                .arg("--disable-dev-shm-usage")
                .arg("--disable-gpu");
            if config.no_sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(path) = &config.chrome_path {
                builder = builder.chrome_executable(path);
            }
            let browser_config = builder.build().map_err(WatchError::Browser)?;

            let (browser, mut handler) = Browser::launch(browser_config)
                .await
                .map_err(|e| browser_err(format!("launch failed: {e}")))?;

            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        debug!(error = %e, "Browser handler event error");
                    }
                }
            });

            Ok(Self {
                browser,
                handler,
                _profile_dir: profile_dir,
            })
        }

        async fn collect(&self, url: &str, config: &RenderConfig) -> Result<String, WatchError> {
            let page = self.browser.new_page("about:blank").await.map_err(browser_err)?;

            timeout(config.nav_timeout, page.goto(url))
                .await
                .map_err(|_| WatchError::Timeout(config.nav_timeout))?
                .map_err(|e| browser_err(format!("navigation failed: {e}")))?;
            sleep(config.settle_delay).await;

            let mut fragments = Vec::with_capacity(RENDERED_REGIONS.len());
            for region in RENDERED_REGIONS {
                fragments.push(region_text(&page, region).await);
            }
            Ok(assemble_text(fragments))
        }

        async fn close(mut self) {
            if let Err(e) = self.browser.close().await {
                warn!(error = %e, "Failed to close browser cleanly");
            }
            if let Err(e) = self.browser.wait().await {
                debug!(error = %e, "Failed waiting for browser exit");
            }
            self.handler.abort();
        }
    }

    /// Text for one region; any failure contributes nothing.
    async fn region_text(page: &Page, region: &Region) -> Option<String> {
        let (css, limit) = match region {
            Region::First(css) => (*css, None),
            Region::PageText { max_chars } => ("body", Some(*max_chars)),
        };

        let element = match page.find_element(css).await {
            Ok(element) => element,
            Err(e) => {
                debug!(selector = %css, error = %e, "Region not present");
                return None;
            }
        };
        let text = match element.inner_text().await {
            Ok(text) => text?,
            Err(e) => {
                debug!(selector = %css, error = %e, "Could not read region text");
                return None;
            }
        };

        Some(match limit {
            Some(max) => truncate_chars(&text, max).to_string(),
            None => text,
        })
    }
}
