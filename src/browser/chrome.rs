//! Chrome DevTools implementation of [`RenderSurface`]
//!
//! Launches a Chrome/Chromium process through `chromiumoxide`, drives a
//! single page for the whole session and tears it down on [`ChromeSurface::close`].
//! The CDP event handler runs on its own tokio task for the lifetime of the
//! browser.
//!
//! Waits poll the selector with `document.querySelector` at the configured
//! interval; there is no push notification for element insertion.

use super::{RenderSurface, SurfaceError, SurfaceResult, UiSelectors};
use crate::board::{BoardBox, PixelPoint};
use crate::core::settings::BrowserSettings;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::layout::Point;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Page flag raised by the start-button listener
const START_FLAG: &str = "__autopilotStart";

/// JSON-quote a selector for embedding in a page script
fn js_string(value: &str) -> SurfaceResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// A launched browser with one page under automation
pub struct ChromeSurface {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    poll_interval: Duration,
}

impl ChromeSurface {
    /// Launch the browser and open a blank page
    pub async fn launch(settings: &BrowserSettings) -> SurfaceResult<Self> {
        let mut builder = BrowserConfig::builder().viewport(None);
        if !settings.headless {
            builder = builder.with_head();
        }
        if settings.maximized {
            builder = builder.arg("--start-maximized");
        }
        if let Some(executable) = &settings.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder
            .build()
            .map_err(|message| SurfaceError::Config { message })?;

        let (browser, mut events) = Browser::launch(config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    debug!("[BROWSER] CDP handler: {}", e);
                }
            }
            debug!("[BROWSER] CDP handler finished");
        });

        let page = browser.new_page("about:blank").await?;
        info!(
            "[BROWSER] Launched ({})",
            if settings.headless { "headless" } else { "headed" }
        );

        Ok(Self {
            browser,
            page,
            handler,
            poll_interval: settings.poll_interval(),
        })
    }

    /// Navigate the page and wait for the load to finish
    pub async fn open(&self, url: &str) -> SurfaceResult<()> {
        info!("[BROWSER] Opening {}", url);
        self.page.goto(url).await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    /// Block until the human presses the start button
    ///
    /// Installs a `mousedown` listener on the start button that raises a page
    /// flag when the pressed button carries the configured title, then polls
    /// the flag.
    pub async fn wait_for_start(&self, selectors: &UiSelectors) -> SurfaceResult<()> {
        self.wait_for(&selectors.start_button, None).await?;

        let script = format!(
            r#"(() => {{
                const button = document.querySelector({selector});
                if (!button) return false;
                window.{START_FLAG} = false;
                button.addEventListener("mousedown", (e) => {{
                    if (e.target.title === {title}) window.{START_FLAG} = true;
                }});
                return true;
            }})()"#,
            selector = js_string(&selectors.start_button)?,
            title = js_string(&selectors.start_button_title)?,
        );
        if !self.eval::<bool>(script).await? {
            return Err(SurfaceError::TargetNotFound {
                selector: selectors.start_button.clone(),
            });
        }

        info!(
            "[BROWSER] Waiting for \"{}\" to be pressed",
            selectors.start_button_title
        );
        let check = format!("window.{START_FLAG} === true");
        while !self.eval::<bool>(check.clone()).await? {
            tokio::time::sleep(self.poll_interval).await;
        }
        info!("[BROWSER] Game started");
        Ok(())
    }

    /// Close the browser and stop the event handler
    pub async fn close(mut self) -> SurfaceResult<()> {
        self.browser.close().await?;
        if let Err(e) = self.browser.wait().await {
            warn!("[BROWSER] Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
        Ok(())
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> SurfaceResult<T> {
        let params = EvaluateParams::builder()
            .expression(script)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(|message| SurfaceError::Config { message })?;
        let result = self.page.evaluate_expression(params).await?;
        Ok(result.into_value::<T>()?)
    }

    async fn exists(&self, selector: &str) -> SurfaceResult<bool> {
        let script = format!("document.querySelector({}) !== null", js_string(selector)?);
        self.eval(script).await
    }
}

#[async_trait]
impl RenderSurface for ChromeSurface {
    async fn bounding_box(&self, selector: &str) -> SurfaceResult<BoardBox> {
        let element =
            self.page
                .find_element(selector)
                .await
                .map_err(|_| SurfaceError::TargetNotFound {
                    selector: selector.to_string(),
                })?;
        let bbox = element.bounding_box().await?;
        Ok(BoardBox::new(bbox.x, bbox.y, bbox.width, bbox.height))
    }

    async fn move_entries(&self, selector: &str) -> SurfaceResult<Vec<Vec<String>>> {
        let script = format!(
            r#"Array.from(document.querySelectorAll({}), (entry) =>
                Array.from(entry.childNodes, (node) => node.textContent ?? ""))"#,
            js_string(selector)?
        );
        self.eval(script).await
    }

    async fn click_at(&self, point: PixelPoint) -> SurfaceResult<()> {
        self.page
            .click(Point {
                x: point.x,
                y: point.y,
            })
            .await?;
        Ok(())
    }

    async fn click_element(&self, selector: &str) -> SurfaceResult<()> {
        let element =
            self.page
                .find_element(selector)
                .await
                .map_err(|_| SurfaceError::TargetNotFound {
                    selector: selector.to_string(),
                })?;
        element.click().await?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Option<Duration>) -> SurfaceResult<()> {
        let poll = async {
            while !self.exists(selector).await? {
                tokio::time::sleep(self.poll_interval).await;
            }
            Ok::<(), SurfaceError>(())
        };

        match timeout {
            None => poll.await,
            Some(limit) => tokio::time::timeout(limit, poll)
                .await
                .map_err(|_| SurfaceError::Timeout {
                    selector: selector.to_string(),
                    waited: limit,
                })?,
        }
    }
}
