//! Flow-level types

use serde::{Deserialize, Serialize};

/// Authentication state of the browser session.
///
/// Exactly one instance exists per session; transitions happen only inside
/// the login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No authentication attempted (or credentials absent).
    Anonymous,

    /// A login attempt is in flight.
    Authenticating,

    /// Login verified.
    Authenticated,

    /// Login attempts exhausted; no further searches should run when
    /// credentials were supplied.
    AuthFailed,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

/// Authoritative result of one search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// First matching result, as an absolute product URL.
    Found(String),

    /// The site answered and had no matching result. Terminal, never
    /// retried.
    NotFound,

    /// The attempt budget was exhausted by transient failures.
    Error(String),
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    /// The product URL, when found.
    pub fn url(&self) -> Option<&str> {
        match self {
            SearchOutcome::Found(url) => Some(url),
            _ => None,
        }
    }
}

/// Login credentials plus optional per-role locator overrides, supplied by
/// the configuration collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub login_url: String,
    pub username: String,
    pub password: String,

    /// CSS overrides tried ahead of the built-in username cascade.
    #[serde(default)]
    pub username_selectors: Option<Vec<String>>,

    /// CSS overrides tried ahead of the built-in password cascade.
    #[serde(default)]
    pub password_selectors: Option<Vec<String>>,

    /// CSS overrides tried ahead of the built-in submit-button cascade.
    #[serde(default)]
    pub submit_selectors: Option<Vec<String>>,
}

impl Credentials {
    /// Absent or blank credentials mean login is skipped entirely.
    pub fn is_empty(&self) -> bool {
        self.username.trim().is_empty() || self.password.trim().is_empty()
    }
}

/// The single target site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Base URL relative links are normalized against.
    pub base_url: String,

    /// Search entry point navigated to before each query.
    pub home_url: String,

    /// Substring marking login pages; its disappearance from the URL is a
    /// positive login signal.
    pub login_marker: String,
}

impl SiteProfile {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let home_url = format!("{}/", base_url.trim_end_matches('/'));
        Self {
            base_url,
            home_url,
            login_marker: "login".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_credentials_are_empty() {
        let creds = Credentials {
            login_url: "https://shop.test/login".into(),
            username: "  ".into(),
            password: "hunter2".into(),
            ..Credentials::default()
        };
        assert!(creds.is_empty());
    }

    #[test]
    fn site_profile_derives_home_url() {
        let site = SiteProfile::new("https://www.parts-unlimited.com");
        assert_eq!(site.home_url, "https://www.parts-unlimited.com/");
        assert_eq!(site.login_marker, "login");
    }

    #[test]
    fn outcome_url_accessor() {
        assert_eq!(
            SearchOutcome::Found("https://x/p/1".into()).url(),
            Some("https://x/p/1")
        );
        assert_eq!(SearchOutcome::NotFound.url(), None);
    }
}
