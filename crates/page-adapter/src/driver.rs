//! Driver traits consumed by the resolution and flow layers

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A single locator expression, ready to be evaluated against the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Query {
    /// CSS selector
    Css(String),

    /// XPath expression
    XPath(String),
}

impl Query {
    /// The raw expression text, without the kind tag.
    pub fn expression(&self) -> &str {
        match self {
            Query::Css(s) => s,
            Query::XPath(s) => s,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Css(s) => write!(f, "css:{}", s),
            Query::XPath(s) => write!(f, "xpath:{}", s),
        }
    }
}

/// Transient handle to a live element.
///
/// Handles are owned by the step that acquired them and are invalidated by
/// any navigation; nothing in this workspace caches one across page loads.
pub type ElementHandle = Box<dyn PageElement>;

/// One logical browser page.
///
/// The model is single page, single flow: callers interact sequentially
/// and every network-dependent wait carries an explicit timeout.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate the page to `url`.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait until the page has settled (document complete plus a short
    /// network-quiet window), bounded by `timeout`.
    async fn wait_for_idle(&self, timeout: Duration) -> Result<()>;

    /// Current page URL.
    async fn current_url(&self) -> Result<String>;

    /// Evaluate `query`, returning the first match or `None`.
    async fn query(&self, query: &Query) -> Result<Option<ElementHandle>>;

    /// Evaluate `query`, returning every match in document order.
    async fn query_all(&self, query: &Query) -> Result<Vec<ElementHandle>>;

    /// Evaluate a page-scoped script expression and return its value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Move the cursor to viewport coordinates.
    async fn mouse_move(&self, x: f64, y: f64) -> Result<()>;

    /// Scroll the viewport by a pixel delta.
    async fn scroll_by(&self, dx: i64, dy: i64) -> Result<()>;
}

/// Operations on a resolved element.
#[async_trait]
pub trait PageElement: Send + Sync {
    /// Whether the element is rendered and occupies layout space.
    async fn is_visible(&self) -> Result<bool>;

    /// Whether the element accepts interaction (not disabled).
    async fn is_enabled(&self) -> Result<bool>;

    /// Click the element.
    async fn click(&self) -> Result<()>;

    /// Replace the element's value wholesale (no key events).
    async fn fill(&self, text: &str) -> Result<()>;

    /// Type `text` one character at a time, sleeping `per_char_delay`
    /// between keystrokes.
    async fn type_text(&self, text: &str, per_char_delay: Duration) -> Result<()>;

    /// Press a named key (e.g. "Enter") with the element focused.
    async fn press(&self, key: &str) -> Result<()>;

    /// Read an attribute, `None` when absent.
    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    /// The element's rendered text.
    async fn inner_text(&self) -> Result<String>;

    /// Run a function-declaration script with `this` bound to the element
    /// and return its value.
    async fn evaluate(&self, function: &str) -> Result<serde_json::Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_display_tags_kind() {
        assert_eq!(Query::Css("#search".into()).to_string(), "css:#search");
        assert_eq!(
            Query::XPath("//input[@name='q']".into()).to_string(),
            "xpath://input[@name='q']"
        );
    }

    #[test]
    fn expression_strips_tag() {
        assert_eq!(Query::Css(".item a".into()).expression(), ".item a");
    }
}
