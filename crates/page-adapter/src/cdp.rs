//! Chromium backend for the automation surface
//!
//! Wraps chromiumoxide: one [`CdpBrowser`] per session, one [`CdpPage`]
//! driven at a time. The event handler runs on a background task for the
//! lifetime of the browser.

use crate::driver::{ElementHandle, PageDriver, PageElement, Query};
use crate::errors::{DriverError, Result};
use crate::fingerprint::FingerprintProfile;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType,
};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Poll interval while waiting for the document to settle.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Quiet window appended once the document reports complete.
const NETWORK_QUIET: Duration = Duration::from_millis(500);

fn backend(err: chromiumoxide::error::CdpError) -> DriverError {
    DriverError::Backend(err.to_string())
}

fn element_err(err: chromiumoxide::error::CdpError) -> DriverError {
    DriverError::Element(err.to_string())
}

/// Owns the Chromium process and its event loop.
pub struct CdpBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
    fingerprint: FingerprintProfile,
}

impl CdpBrowser {
    /// Launch a browser with a randomized fingerprint.
    pub async fn launch(headless: bool) -> Result<Self> {
        Self::launch_with_fingerprint(headless, FingerprintProfile::randomized()).await
    }

    /// Launch a browser with a specific fingerprint.
    pub async fn launch_with_fingerprint(
        headless: bool,
        fingerprint: FingerprintProfile,
    ) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .arg("--disable-blink-features=AutomationControlled");
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(DriverError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self {
            browser,
            handler: handle,
            fingerprint,
        })
    }

    /// Open a fresh page carrying the session fingerprint.
    pub async fn new_page(&self) -> Result<CdpPage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(backend)?;
        page.set_user_agent(self.fingerprint.user_agent.clone())
            .await
            .map_err(backend)?;
        Ok(CdpPage { page })
    }

    /// Close the browser and reap the process. Must be called exactly once
    /// at session end; dropping without closing leaves reaping to the OS.
    pub async fn close(mut self) -> Result<()> {
        let closed = self.browser.close().await.map_err(backend);
        let _ = self.browser.wait().await;
        self.handler.abort();
        closed.map(|_| ())
    }
}

/// A single live page.
pub struct CdpPage {
    page: Page,
}

#[async_trait]
impl PageDriver for CdpPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map(|_| ())
            .map_err(|e| DriverError::Navigation(e.to_string()))
    }

    async fn wait_for_idle(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let ready = self
                .evaluate("document.readyState === 'complete'")
                .await
                .ok()
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            if ready {
                sleep(NETWORK_QUIET).await;
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::WaitTimeout(format!(
                    "page not idle after {:?}",
                    timeout
                )));
            }
            sleep(IDLE_POLL).await;
        }
    }

    async fn current_url(&self) -> Result<String> {
        self.page
            .url()
            .await
            .map_err(backend)
            .map(|u| u.unwrap_or_default())
    }

    async fn query(&self, query: &Query) -> Result<Option<ElementHandle>> {
        let found = match query {
            Query::Css(sel) => self.page.find_element(sel.clone()).await,
            Query::XPath(expr) => self.page.find_xpath(expr.clone()).await,
        };
        match found {
            Ok(element) => Ok(Some(Box::new(CdpElement { inner: element }) as ElementHandle)),
            Err(err) => {
                debug!("query {} yielded nothing: {}", query, err);
                Ok(None)
            }
        }
    }

    async fn query_all(&self, query: &Query) -> Result<Vec<ElementHandle>> {
        let found = match query {
            Query::Css(sel) => self.page.find_elements(sel.clone()).await,
            Query::XPath(expr) => self.page.find_xpaths(expr.clone()).await,
        };
        match found {
            Ok(elements) => Ok(elements
                .into_iter()
                .map(|e| Box::new(CdpElement { inner: e }) as ElementHandle)
                .collect()),
            Err(err) => {
                debug!("query_all {} yielded nothing: {}", query, err);
                Ok(Vec::new())
            }
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| DriverError::Evaluation(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn mouse_move(&self, x: f64, y: f64) -> Result<()> {
        let params = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseMoved)
            .x(x)
            .y(y)
            .build()
            .map_err(DriverError::Backend)?;
        self.page.execute(params).await.map_err(backend)?;
        Ok(())
    }

    async fn scroll_by(&self, dx: i64, dy: i64) -> Result<()> {
        self.evaluate(&format!("window.scrollBy({}, {})", dx, dy))
            .await
            .map(|_| ())
    }
}

/// Element handle backed by a CDP remote object.
pub struct CdpElement {
    inner: Element,
}

impl CdpElement {
    async fn call_bool(&self, function: &str) -> Result<bool> {
        let value = self.evaluate(function).await?;
        Ok(value.as_bool().unwrap_or(false))
    }
}

#[async_trait]
impl PageElement for CdpElement {
    async fn is_visible(&self) -> Result<bool> {
        self.call_bool(
            "function() { \
               const r = this.getBoundingClientRect(); \
               const s = window.getComputedStyle(this); \
               return r.width > 0 && r.height > 0 \
                 && s.visibility !== 'hidden' && s.display !== 'none'; \
             }",
        )
        .await
    }

    async fn is_enabled(&self) -> Result<bool> {
        self.call_bool("function() { return !this.disabled; }").await
    }

    async fn click(&self) -> Result<()> {
        self.inner.click().await.map(|_| ()).map_err(element_err)
    }

    async fn fill(&self, text: &str) -> Result<()> {
        let literal = serde_json::to_string(text)
            .map_err(|e| DriverError::Evaluation(e.to_string()))?;
        self.evaluate(&format!(
            "function() {{ \
               this.focus(); \
               this.value = {literal}; \
               this.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             }}"
        ))
        .await
        .map(|_| ())
    }

    async fn type_text(&self, text: &str, per_char_delay: Duration) -> Result<()> {
        self.inner.focus().await.map_err(element_err)?;
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            self.inner
                .type_str(&*ch.encode_utf8(&mut buf))
                .await
                .map_err(element_err)?;
            sleep(per_char_delay).await;
        }
        Ok(())
    }

    async fn press(&self, key: &str) -> Result<()> {
        self.inner
            .press_key(key)
            .await
            .map(|_| ())
            .map_err(element_err)
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.inner.attribute(name).await.map_err(element_err)
    }

    async fn inner_text(&self) -> Result<String> {
        self.inner
            .inner_text()
            .await
            .map_err(element_err)
            .map(|t| t.unwrap_or_default())
    }

    async fn evaluate(&self, function: &str) -> Result<serde_json::Value> {
        let ret = self
            .inner
            .call_js_fn(function, false)
            .await
            .map_err(|e| DriverError::Evaluation(e.to_string()))?;
        Ok(ret.result.value.unwrap_or(serde_json::Value::Null))
    }
}
