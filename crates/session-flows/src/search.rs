//! Search flow
//!
//! Turns a free-text query term into the absolute URL of the first
//! matching product page. Steps up to the submit are retried as a unit;
//! an empty result cascade is a terminal `NotFound`, never a retry.

use crate::submit::{submit, SubmitStep};
use crate::types::{SearchOutcome, SiteProfile};
use element_locator::{roles, SelectorResolver};
use page_adapter::{util::absolutize, PageDriver};
use pacing::{BehaviorPacer, RetryError, RetryPolicy};
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Submits a query and resolves the first matching result URL.
pub struct SearchFlow {
    site: SiteProfile,
    resolver: SelectorResolver,
    retry: RetryPolicy,
    pacer: BehaviorPacer,
    idle_timeout: Duration,
    search_box_overrides: Option<Vec<String>>,
}

impl SearchFlow {
    pub fn new(
        site: SiteProfile,
        retry: RetryPolicy,
        pacer: BehaviorPacer,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            site,
            resolver: SelectorResolver::new(),
            retry,
            pacer,
            idle_timeout,
            search_box_overrides: None,
        }
    }

    /// CSS overrides tried ahead of the built-in search-box cascade.
    pub fn with_search_box_overrides(mut self, overrides: Vec<String>) -> Self {
        self.search_box_overrides = Some(overrides);
        self
    }

    /// Run one search. Always produces an outcome: `Found` with an
    /// absolute URL, terminal `NotFound`, or `Error` after the attempt
    /// budget is exhausted.
    pub async fn search(
        &self,
        page: &dyn PageDriver,
        term: &str,
        cancel: &CancellationToken,
    ) -> SearchOutcome {
        let label = format!("search '{}'", term);
        let result = self
            .retry
            .execute(&label, cancel, || self.attempt(page, term))
            .await;

        match result {
            Ok(outcome) => {
                info!("{}: {:?}", label, outcome);
                outcome
            }
            Err(RetryError::Cancelled { .. }) => {
                SearchOutcome::Error("search cancelled between attempts".to_string())
            }
            Err(err) => SearchOutcome::Error(err.to_string()),
        }
    }

    /// One retryable attempt: navigate, type, submit, settle, resolve.
    async fn attempt(&self, page: &dyn PageDriver, term: &str) -> Result<SearchOutcome, String> {
        page.navigate(&self.site.home_url)
            .await
            .map_err(|e| e.to_string())?;
        page.wait_for_idle(self.idle_timeout)
            .await
            .map_err(|e| e.to_string())?;

        self.pacer.pause(page).await;

        let cascade = roles::with_override(
            self.search_box_overrides.as_deref(),
            roles::search_box(),
        );
        let search_box = self
            .resolver
            .resolve(page, &cascade)
            .await
            .ok_or_else(|| "search box not resolved".to_string())?;

        // Select-all + delete clears any sticky previous query; fall back
        // to a direct value reset when key chords are refused.
        let cleared = match search_box.press("Control+a").await {
            Ok(()) => search_box.press("Delete").await.is_ok(),
            Err(_) => false,
        };
        if !cleared {
            search_box.fill("").await.map_err(|e| e.to_string())?;
        }
        search_box
            .type_text(term, self.pacer.typing_delay())
            .await
            .map_err(|e| e.to_string())?;

        let submit_buttons = roles::search_submit();
        let steps = [
            SubmitStep::PressConfirm(&search_box),
            SubmitStep::ClickButton(&submit_buttons),
            SubmitStep::FormSubmit(&search_box),
        ];
        let method = submit(page, &self.resolver, &steps).await?;
        debug!("search submitted via {}", method);

        page.wait_for_idle(self.idle_timeout)
            .await
            .map_err(|e| e.to_string())?;
        sleep(self.pacer.settle_delay()).await;

        Ok(self.first_result(page).await)
    }

    /// Resolve the first result. Absence of results is a valid terminal
    /// outcome, distinct from a transient error.
    async fn first_result(&self, page: &dyn PageDriver) -> SearchOutcome {
        let anchors = self
            .resolver
            .resolve_all(page, &roles::first_result())
            .await;

        for anchor in anchors {
            let href = match anchor.attribute("href").await {
                Ok(Some(href)) => href,
                Ok(None) => continue,
                Err(err) => {
                    debug!("result anchor unreadable: {}", err);
                    continue;
                }
            };
            if let Some(url) = absolutize(&self.site.base_url, &href) {
                return SearchOutcome::Found(url);
            }
        }
        SearchOutcome::NotFound
    }
}
