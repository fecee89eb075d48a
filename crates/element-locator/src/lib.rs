//! Multi-strategy element resolution
//!
//! A logical UI role (search box, login field, result card) is described by
//! an ordered list of [`LocatorStrategy`] values; [`SelectorResolver`] walks
//! the cascade against the live page and accepts the first visible,
//! interactable match ([`SelectorResolver::resolve`]) or every visible
//! match of the first productive candidate
//! ([`SelectorResolver::resolve_all`]). Strategy order encodes specificity:
//! semantic attributes first, generic tag patterns last.

pub mod resolver;
pub mod roles;
pub mod types;

pub use resolver::SelectorResolver;
pub use types::LocatorStrategy;
