//! Session fingerprint rotation

use rand::Rng;

/// Browser fingerprint applied once per session.
///
/// Rotating the user agent and viewport across sessions keeps the traffic
/// profile from being trivially uniform; anything stronger is out of scope.
#[derive(Debug, Clone)]
pub struct FingerprintProfile {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
];

const VIEWPORTS: &[(u32, u32)] = &[(1920, 1080), (1366, 768), (1536, 864), (1440, 900)];

impl FingerprintProfile {
    /// Pick a random profile from the common desktop pools.
    pub fn randomized() -> Self {
        let mut rng = rand::thread_rng();
        let ua = USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())];
        let (width, height) = VIEWPORTS[rng.gen_range(0..VIEWPORTS.len())];

        Self {
            user_agent: ua.to_string(),
            viewport_width: width,
            viewport_height: height,
        }
    }
}

impl Default for FingerprintProfile {
    fn default() -> Self {
        Self::randomized()
    }
}
