//! Scraping session
//!
//! One browser session, one page, one term at a time. The session owns
//! the single [`SessionState`] instance and enforces the ordering
//! invariant: when credentials are configured, no search runs unless the
//! session is authenticated.

use crate::config::ScraperConfig;
use crate::errors::SessionError;
use pacing::{BehaviorPacer, RetryPolicy};
use page_adapter::{CdpBrowser, CdpPage, PageDriver};
use product_extract::{ExtractedProduct, ExtractionPipeline};
use serde::{Deserialize, Serialize};
use session_flows::{LoginFlow, LoginOutcome, SearchFlow, SearchOutcome, SessionState};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// One query term's result: the authoritative outcome plus the extracted
/// product when the term resolved to a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermReport {
    pub term: String,
    pub outcome: SearchOutcome,
    pub product: Option<ExtractedProduct>,
}

/// Counters accumulated over a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total: usize,
    pub processed: usize,
    pub found: usize,
    pub not_found: usize,
    pub errors: usize,
}

/// A finished batch: one report per processed term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub reports: Vec<TermReport>,
    pub stats: RunStats,
}

/// Drives one page through login, per-term search, and extraction.
pub struct ScraperSession<D: PageDriver> {
    page: D,
    config: ScraperConfig,
    state: SessionState,
    login_flow: LoginFlow,
    search_flow: SearchFlow,
    pipeline: ExtractionPipeline,
    pacer: BehaviorPacer,
    cancel: CancellationToken,
}

impl<D: PageDriver> ScraperSession<D> {
    pub fn new(page: D, config: ScraperConfig) -> Self {
        let tunables = &config.tunables;
        let pacer = BehaviorPacer::new(tunables.delay_min, tunables.delay_max);
        let retry = RetryPolicy::new(tunables.max_attempts, tunables.delay_min, tunables.delay_max);

        let login_flow = LoginFlow::new(config.site.clone(), retry.clone(), pacer.clone());
        let mut search_flow = SearchFlow::new(
            config.site.clone(),
            retry,
            pacer.clone(),
            tunables.timeout,
        );
        if let Some(overrides) = &config.search_box_selectors {
            search_flow = search_flow.with_search_box_overrides(overrides.clone());
        }
        let pipeline = ExtractionPipeline::new(config.site.base_url.clone(), pacer.clone());

        Self {
            page,
            config,
            state: SessionState::Anonymous,
            login_flow,
            search_flow,
            pipeline,
            pacer,
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Token checked between retry attempts; cancel it to wind the
    /// session down cleanly.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Authenticate once. A no-op when already authenticated or when no
    /// credentials are configured.
    pub async fn login(&mut self) -> Result<LoginOutcome, SessionError> {
        if self.state.is_authenticated() {
            return Ok(LoginOutcome::Authenticated);
        }
        let credentials = match &self.config.credentials {
            Some(credentials) => credentials.clone(),
            None => return Ok(LoginOutcome::Skipped),
        };

        let outcome = self
            .login_flow
            .login(&self.page, &credentials, &mut self.state, &self.cancel)
            .await;
        if let LoginOutcome::Failed(detail) = &outcome {
            return Err(SessionError::AuthFailed(detail.clone()));
        }
        Ok(outcome)
    }

    /// Search one term, logging in first when the configuration expects
    /// it. A session whose login already failed refuses to search.
    pub async fn lookup(&mut self, term: &str) -> SearchOutcome {
        if self.config.wants_login() && !self.state.is_authenticated() {
            match self.state {
                SessionState::Anonymous => {
                    if let Err(err) = self.login().await {
                        return SearchOutcome::Error(err.to_string());
                    }
                    if !self.state.is_authenticated() {
                        return SearchOutcome::Error(
                            "session is not authenticated".to_string(),
                        );
                    }
                }
                _ => {
                    return SearchOutcome::Error(
                        "session is not authenticated; refusing to search".to_string(),
                    )
                }
            }
        }
        self.search_flow.search(&self.page, term, &self.cancel).await
    }

    /// Search one term and, on a hit, extract the product page.
    pub async fn process(&mut self, term: &str) -> TermReport {
        let outcome = self.lookup(term).await;

        let product = match &outcome {
            SearchOutcome::Found(url) => match self.load_and_extract(url).await {
                Ok(extracted) => Some(extracted),
                Err(err) => {
                    warn!("product page unreachable for '{}': {}", term, err);
                    return TermReport {
                        term: term.to_string(),
                        outcome: SearchOutcome::Error(err.to_string()),
                        product: None,
                    };
                }
            },
            _ => None,
        };

        TermReport {
            term: term.to_string(),
            outcome,
            product,
        }
    }

    /// Process a whole query list sequentially. Every term produces a
    /// report; a failing term never aborts the batch.
    pub async fn run(&mut self, terms: &[String]) -> RunSummary {
        let mut stats = RunStats {
            total: terms.len(),
            ..RunStats::default()
        };
        let mut reports = Vec::with_capacity(terms.len());

        for (index, term) in terms.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!("run cancelled after {} terms", stats.processed);
                break;
            }

            info!("[{}/{}] processing '{}'", index + 1, terms.len(), term);
            let report = self.process(term).await;

            stats.processed += 1;
            match &report.outcome {
                SearchOutcome::Found(_) => stats.found += 1,
                SearchOutcome::NotFound => stats.not_found += 1,
                SearchOutcome::Error(_) => stats.errors += 1,
            }
            reports.push(report);

            if index + 1 < terms.len() {
                self.pacer.rest().await;
            }
        }

        info!(
            "run finished: {}/{} found, {} not found, {} errors",
            stats.found, stats.processed, stats.not_found, stats.errors
        );
        RunSummary { reports, stats }
    }

    async fn load_and_extract(&self, url: &str) -> Result<ExtractedProduct, SessionError> {
        self.page.navigate(url).await?;
        self.page
            .wait_for_idle(self.config.tunables.timeout)
            .await?;
        Ok(self.pipeline.extract(&self.page, url).await)
    }
}

/// A scraping session bound to a real Chromium instance.
///
/// The browser handle is acquired once at launch and released exactly once
/// by [`BrowserSession::close`]; if close is never reached, the backend's
/// drop path still reaps the child process.
pub struct BrowserSession {
    browser: CdpBrowser,
    session: ScraperSession<CdpPage>,
}

impl BrowserSession {
    pub async fn launch(config: ScraperConfig, headless: bool) -> Result<Self, SessionError> {
        let browser = CdpBrowser::launch(headless).await?;
        let page = browser.new_page().await?;
        Ok(Self {
            browser,
            session: ScraperSession::new(page, config),
        })
    }

    pub fn session(&mut self) -> &mut ScraperSession<CdpPage> {
        &mut self.session
    }

    /// Release the browser. Consumes the session so no handle can outlive
    /// the page it points into.
    pub async fn close(self) -> Result<(), SessionError> {
        self.browser.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tunables;
    use page_adapter::mock::{MockElement, MockPage};
    use session_flows::{Credentials, SiteProfile};
    use std::time::Duration;

    const LOGIN_URL: &str = "https://shop.test/login";

    fn fast_tunables() -> Tunables {
        Tunables {
            delay_min: Duration::ZERO,
            delay_max: Duration::ZERO,
            max_attempts: 3,
            timeout: Duration::from_secs(5),
        }
    }

    fn anonymous_config() -> ScraperConfig {
        ScraperConfig::new(SiteProfile::new("https://shop.test"))
            .with_tunables(fast_tunables())
    }

    fn authenticated_config() -> ScraperConfig {
        anonymous_config().with_credentials(Credentials {
            login_url: LOGIN_URL.to_string(),
            username: "buyer".to_string(),
            password: "hunter2".to_string(),
            ..Credentials::default()
        })
    }

    /// Storefront with a search box, one result, and a product page.
    fn storefront() -> MockPage {
        let page = MockPage::new();
        page.insert("#search-input", MockElement::new());
        page.insert(
            ".product-item a",
            MockElement::text("Gasket kit").attr("href", "/product/20101555"),
        );
        page.insert_at(
            "https://shop.test/product/20101555",
            "h1",
            MockElement::text("Exhaust gasket kit"),
        );
        page
    }

    #[tokio::test(start_paused = true)]
    async fn anonymous_session_finds_and_extracts() {
        let page = storefront();
        let mut session = ScraperSession::new(page.clone(), anonymous_config());

        let report = session.process("20101555").await;

        assert_eq!(
            report.outcome,
            SearchOutcome::Found("https://shop.test/product/20101555".to_string())
        );
        let product = report.product.expect("extraction should run on a hit");
        assert_eq!(
            product
                .record
                .get(&product_extract::ProductField::Title)
                .and_then(|v| v.as_text()),
            Some("Exhaust gasket kit")
        );
        assert_eq!(session.state(), SessionState::Anonymous);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_keeps_going_after_a_failing_term() {
        let page = storefront();
        // First term: every navigation attempt fails. Second term: fine.
        page.fail_navigations(3);
        let mut session = ScraperSession::new(page.clone(), anonymous_config());

        let summary = session
            .run(&["AAA-111".to_string(), "20101555".to_string()])
            .await;

        assert_eq!(summary.reports.len(), 2);
        assert!(matches!(summary.reports[0].outcome, SearchOutcome::Error(_)));
        assert!(summary.reports[1].outcome.is_found());
        assert_eq!(summary.stats.processed, 2);
        assert_eq!(summary.stats.errors, 1);
        assert_eq!(summary.stats.found, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_login_blocks_every_search() {
        let page = storefront();
        // The login page never renders its form fields.
        let mut session = ScraperSession::new(page.clone(), authenticated_config());

        let first = session.lookup("20101555").await;
        assert!(matches!(first, SearchOutcome::Error(_)));
        assert_eq!(session.state(), SessionState::AuthFailed);

        let second = session.lookup("20101555").await;
        assert!(matches!(second, SearchOutcome::Error(_)));
        // Only the login navigation ever happened; the storefront home
        // was never searched.
        assert_eq!(page.navigations(), vec![LOGIN_URL]);
    }

    #[tokio::test(start_paused = true)]
    async fn login_runs_once_per_session() {
        let page = storefront();
        page.insert_at(LOGIN_URL, "#username", MockElement::new());
        page.insert_at(LOGIN_URL, "#password", MockElement::new());
        page.insert_at(
            LOGIN_URL,
            "button[type='submit']",
            MockElement::new().on_click_url("https://shop.test/account"),
        );
        let mut session = ScraperSession::new(page.clone(), authenticated_config());

        assert_eq!(session.login().await.unwrap(), LoginOutcome::Authenticated);
        assert_eq!(session.state(), SessionState::Authenticated);

        // Second call is a no-op: no extra navigation to the login page.
        assert_eq!(session.login().await.unwrap(), LoginOutcome::Authenticated);
        assert_eq!(
            page.navigations()
                .iter()
                .filter(|url| url.as_str() == LOGIN_URL)
                .count(),
            1
        );

        let outcome = session.lookup("20101555").await;
        assert!(outcome.is_found());
    }

    #[tokio::test(start_paused = true)]
    async fn reports_serialize_for_the_persistence_boundary() {
        let page = storefront();
        let mut session = ScraperSession::new(page, anonymous_config());

        let report = session.process("20101555").await;
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(
            json["outcome"]["Found"],
            "https://shop.test/product/20101555"
        );
        assert_eq!(json["product"]["record"]["title"], "Exhaust gasket kit");
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_session_stops_between_terms() {
        let page = storefront();
        let mut session = ScraperSession::new(page, anonymous_config());
        session.cancellation_token().cancel();

        let summary = session.run(&["a".to_string(), "b".to_string()]).await;
        assert!(summary.reports.is_empty());
        assert_eq!(summary.stats.processed, 0);
        assert_eq!(summary.stats.total, 2);
    }
}
