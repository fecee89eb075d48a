//! Automation surface over a live browser page.
//!
//! Everything above this crate talks to the page through the [`PageDriver`]
//! and [`PageElement`] traits; the concrete backend is interchangeable:
//! - [`cdp`] drives a real Chromium instance through chromiumoxide
//! - [`mock`] (feature `mock`) is a scripted in-memory page for tests

pub mod cdp;
pub mod driver;
pub mod errors;
pub mod fingerprint;
pub mod util;

#[cfg(feature = "mock")]
pub mod mock;

pub use cdp::{CdpBrowser, CdpPage};
pub use driver::{ElementHandle, PageDriver, PageElement, Query};
pub use errors::{DriverError, Result};
pub use fingerprint::FingerprintProfile;
