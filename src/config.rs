//! Session configuration types
//!
//! Consumed, not produced, by this core: the configuration collaborator
//! loads these from wherever it keeps them (env, file, spreadsheet) and
//! hands them over fully formed.

use session_flows::{Credentials, SiteProfile};
use std::time::Duration;

/// Timing and retry tunables shared by every flow.
#[derive(Debug, Clone)]
pub struct Tunables {
    /// Lower bound of the inter-request rest.
    pub delay_min: Duration,

    /// Upper bound of the inter-request rest.
    pub delay_max: Duration,

    /// Attempt budget for every retried operation.
    pub max_attempts: u32,

    /// Bound on every network-dependent wait.
    pub timeout: Duration,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            delay_min: Duration::from_secs(2),
            delay_max: Duration::from_secs(8),
            max_attempts: 3,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Everything a scraping session needs to run.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub site: SiteProfile,

    /// Absent credentials mean the session runs anonymous.
    pub credentials: Option<Credentials>,

    pub tunables: Tunables,

    /// CSS overrides tried ahead of the built-in search-box cascade.
    pub search_box_selectors: Option<Vec<String>>,
}

impl ScraperConfig {
    pub fn new(site: SiteProfile) -> Self {
        Self {
            site,
            credentials: None,
            tunables: Tunables::default(),
            search_box_selectors: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_tunables(mut self, tunables: Tunables) -> Self {
        self.tunables = tunables;
        self
    }

    /// Whether login is expected to run for this session.
    pub fn wants_login(&self) -> bool {
        self.credentials
            .as_ref()
            .map(|c| !c.is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tunables_match_site_pacing() {
        let tunables = Tunables::default();
        assert_eq!(tunables.delay_min, Duration::from_secs(2));
        assert_eq!(tunables.delay_max, Duration::from_secs(8));
        assert_eq!(tunables.max_attempts, 3);
        assert_eq!(tunables.timeout, Duration::from_secs(30));
    }

    #[test]
    fn wants_login_requires_usable_credentials() {
        let site = SiteProfile::new("https://shop.test");
        assert!(!ScraperConfig::new(site.clone()).wants_login());

        let blank = ScraperConfig::new(site.clone()).with_credentials(Credentials::default());
        assert!(!blank.wants_login());

        let usable = ScraperConfig::new(site).with_credentials(Credentials {
            login_url: "https://shop.test/login".into(),
            username: "buyer".into(),
            password: "hunter2".into(),
            ..Credentials::default()
        });
        assert!(usable.wants_login());
    }
}
