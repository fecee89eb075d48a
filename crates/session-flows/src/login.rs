//! Login flow state machine
//!
//! `Anonymous -> Authenticating -> { Authenticated | AuthFailed }`, with
//! every transition owned by this flow. Credential-less sessions skip the
//! flow entirely and proceed anonymous.

use crate::submit::{submit, SubmitStep};
use crate::types::{Credentials, SessionState, SiteProfile};
use element_locator::{roles, SelectorResolver};
use page_adapter::PageDriver;
use pacing::{BehaviorPacer, RetryError, RetryPolicy};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Terminal outcome of a login call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginOutcome {
    /// A verification signal confirmed the session is authenticated.
    Authenticated,

    /// No credentials were supplied; login is a no-op success.
    Skipped,

    /// Every round failed; the session must not search if credentials
    /// were expected to work.
    Failed(String),

    /// Cancellation observed between rounds; session state is unchanged.
    Cancelled,
}

/// Authenticates the session against the site's login form.
pub struct LoginFlow {
    site: SiteProfile,
    resolver: SelectorResolver,
    retry: RetryPolicy,
    pacer: BehaviorPacer,
}

impl LoginFlow {
    pub fn new(site: SiteProfile, retry: RetryPolicy, pacer: BehaviorPacer) -> Self {
        Self {
            site,
            resolver: SelectorResolver::new(),
            retry,
            pacer,
        }
    }

    /// Run the login state machine once.
    ///
    /// Empty credentials short-circuit without navigating anywhere. The
    /// round body is retried up to the policy's attempt budget; exhaustion
    /// transitions to `AuthFailed`.
    pub async fn login(
        &self,
        page: &dyn PageDriver,
        credentials: &Credentials,
        state: &mut SessionState,
        cancel: &CancellationToken,
    ) -> LoginOutcome {
        if credentials.is_empty() {
            info!("no credentials supplied, proceeding unauthenticated");
            return LoginOutcome::Skipped;
        }

        let prior = *state;
        *state = SessionState::Authenticating;

        if let Err(err) = page.navigate(&credentials.login_url).await {
            warn!("login page unreachable: {}", err);
            *state = SessionState::AuthFailed;
            return LoginOutcome::Failed(err.to_string());
        }

        let result = self
            .retry
            .execute("login", cancel, || self.round(page, credentials))
            .await;

        match result {
            Ok(()) => {
                info!("login verified");
                *state = SessionState::Authenticated;
                LoginOutcome::Authenticated
            }
            Err(RetryError::Cancelled { .. }) => {
                *state = prior;
                LoginOutcome::Cancelled
            }
            Err(err) => {
                warn!("login failed: {}", err);
                *state = SessionState::AuthFailed;
                LoginOutcome::Failed(err.to_string())
            }
        }
    }

    /// One login round: locate fields, type credentials, submit, verify.
    async fn round(&self, page: &dyn PageDriver, credentials: &Credentials) -> Result<(), String> {
        self.pacer.pause(page).await;

        let username_cascade = roles::with_override(
            credentials.username_selectors.as_deref(),
            roles::login_username(),
        );
        let password_cascade = roles::with_override(
            credentials.password_selectors.as_deref(),
            roles::login_password(),
        );

        let username_field = self
            .resolver
            .resolve(page, &username_cascade)
            .await
            .ok_or_else(|| "username field not resolved".to_string())?;
        let password_field = self
            .resolver
            .resolve(page, &password_cascade)
            .await
            .ok_or_else(|| "password field not resolved".to_string())?;

        username_field
            .fill("")
            .await
            .map_err(|e| e.to_string())?;
        username_field
            .type_text(&credentials.username, self.pacer.typing_delay())
            .await
            .map_err(|e| e.to_string())?;

        password_field
            .fill("")
            .await
            .map_err(|e| e.to_string())?;
        password_field
            .type_text(&credentials.password, self.pacer.typing_delay())
            .await
            .map_err(|e| e.to_string())?;

        sleep(self.pacer.brief_delay()).await;

        let submit_cascade = roles::with_override(
            credentials.submit_selectors.as_deref(),
            roles::login_submit(),
        );
        let steps = [
            SubmitStep::ClickButton(&submit_cascade),
            SubmitStep::PressConfirm(&password_field),
            SubmitStep::FormSubmit(&password_field),
        ];
        let method = submit(page, &self.resolver, &steps).await?;
        debug!("login submitted via {}", method);

        sleep(self.pacer.settle_delay()).await;
        self.verify(page).await
    }

    /// Success verification. A visible error banner is a negative
    /// override; otherwise any one positive signal suffices, the weakest
    /// being the absence of that banner.
    async fn verify(&self, page: &dyn PageDriver) -> Result<(), String> {
        if let Some(banner) = self.resolver.resolve(page, &roles::login_error()).await {
            let message = banner.inner_text().await.unwrap_or_default();
            return Err(format!("login error banner visible: {}", message.trim()));
        }

        let url = page.current_url().await.map_err(|e| e.to_string())?;
        if !url.to_lowercase().contains(&self.site.login_marker) {
            debug!("verified: no longer on a login page");
            return Ok(());
        }

        if self
            .resolver
            .resolve(page, &roles::logged_in_indicator())
            .await
            .is_some()
        {
            debug!("verified: logged-in indicator present");
            return Ok(());
        }

        debug!("verified: no error banner after submit");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_adapter::mock::{MockElement, MockPage};
    use std::time::Duration;

    const LOGIN_URL: &str = "https://shop.test/login";

    fn flow(attempts: u32) -> LoginFlow {
        LoginFlow::new(
            SiteProfile::new("https://shop.test"),
            RetryPolicy::new(attempts, Duration::ZERO, Duration::ZERO),
            BehaviorPacer::new(Duration::ZERO, Duration::ZERO),
        )
    }

    fn credentials() -> Credentials {
        Credentials {
            login_url: LOGIN_URL.to_string(),
            username: "buyer".to_string(),
            password: "hunter2".to_string(),
            ..Credentials::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn empty_credentials_skip_without_navigating() {
        let page = MockPage::new();
        let mut state = SessionState::Anonymous;

        let outcome = flow(3)
            .login(
                &page,
                &Credentials::default(),
                &mut state,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(outcome, LoginOutcome::Skipped);
        assert_eq!(state, SessionState::Anonymous);
        assert!(page.navigations().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn successful_login_types_credentials_and_authenticates() {
        let page = MockPage::new();
        let username = page.insert_at(LOGIN_URL, "#username", MockElement::new());
        let password = page.insert_at(LOGIN_URL, "#password", MockElement::new());
        page.insert_at(
            LOGIN_URL,
            "button[type='submit']",
            MockElement::new().on_click_url("https://shop.test/account"),
        );

        let mut state = SessionState::Anonymous;
        let outcome = flow(3)
            .login(&page, &credentials(), &mut state, &CancellationToken::new())
            .await;

        assert_eq!(outcome, LoginOutcome::Authenticated);
        assert_eq!(state, SessionState::Authenticated);
        assert_eq!(username.typed(), "buyer");
        assert_eq!(password.typed(), "hunter2");
        assert_eq!(page.navigations(), vec![LOGIN_URL]);
    }

    #[tokio::test(start_paused = true)]
    async fn always_failing_submit_exhausts_exactly_max_attempts() {
        let page = MockPage::new();
        page.insert_at(LOGIN_URL, "#username", MockElement::new());
        // No submit button, Enter fails, no enclosing form: the submit
        // cascade is exhausted every round.
        let password = page.insert_at(LOGIN_URL, "#password", MockElement::new().press_fails());

        let mut state = SessionState::Anonymous;
        let outcome = flow(3)
            .login(&page, &credentials(), &mut state, &CancellationToken::new())
            .await;

        assert!(matches!(outcome, LoginOutcome::Failed(_)));
        assert_eq!(state, SessionState::AuthFailed);
        // One typed password per round, exactly three rounds.
        assert_eq!(password.typed(), "hunter2".repeat(3));
    }

    #[tokio::test(start_paused = true)]
    async fn visible_error_banner_overrides_positive_signals() {
        let page = MockPage::new();
        page.insert_at(LOGIN_URL, "#username", MockElement::new());
        page.insert_at(LOGIN_URL, "#password", MockElement::new());
        page.insert_at(
            LOGIN_URL,
            "button[type='submit']",
            // Leaves the login URL, which would otherwise verify.
            MockElement::new().on_click_url("https://shop.test/account"),
        );
        page.insert_at(
            "https://shop.test/account",
            ".error",
            MockElement::text("Invalid credentials"),
        );

        let mut state = SessionState::Anonymous;
        let outcome = flow(1)
            .login(&page, &credentials(), &mut state, &CancellationToken::new())
            .await;

        match outcome {
            LoginOutcome::Failed(detail) => assert!(detail.contains("Invalid credentials")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(state, SessionState::AuthFailed);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_leaves_state_unchanged() {
        let page = MockPage::new();
        page.insert_at(LOGIN_URL, "#username", MockElement::new());
        page.insert_at(LOGIN_URL, "#password", MockElement::new());

        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut state = SessionState::Anonymous;
        let outcome = flow(3)
            .login(&page, &credentials(), &mut state, &cancel)
            .await;

        assert_eq!(outcome, LoginOutcome::Cancelled);
        assert_eq!(state, SessionState::Anonymous);
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_login_page_fails_fast() {
        let page = MockPage::new();
        page.fail_navigations(1);

        let mut state = SessionState::Anonymous;
        let outcome = flow(3)
            .login(&page, &credentials(), &mut state, &CancellationToken::new())
            .await;

        assert!(matches!(outcome, LoginOutcome::Failed(_)));
        assert_eq!(state, SessionState::AuthFailed);
    }
}
