//! Cascade resolution over the live page

use crate::types::LocatorStrategy;
use page_adapter::{ElementHandle, PageDriver};
use tracing::{debug, trace};

/// Walks locator cascades against the page.
///
/// Stateless by design: every call re-queries the live page, because any
/// navigation invalidates previously returned handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorResolver;

impl SelectorResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the first candidate, in declared order, that is present,
    /// visible, and enabled. Returns `None` only after every
    /// strategy/candidate pair has been exhausted.
    pub async fn resolve(
        &self,
        page: &dyn PageDriver,
        strategies: &[LocatorStrategy],
    ) -> Option<ElementHandle> {
        for strategy in strategies {
            for query in strategy.candidates() {
                let element = match page.query(&query).await {
                    Ok(Some(element)) => element,
                    Ok(None) => continue,
                    Err(err) => {
                        // Evaluation failure (detached node, navigation
                        // race) is a non-match, not an error.
                        debug!("candidate {} errored: {}", query, err);
                        continue;
                    }
                };

                match is_interactable(&element).await {
                    Ok(true) => {
                        trace!("resolved via {} candidate {}", strategy.name(), query);
                        return Some(element);
                    }
                    Ok(false) => continue,
                    Err(err) => {
                        debug!("candidate {} check errored: {}", query, err);
                        continue;
                    }
                }
            }
        }
        None
    }

    /// Resolve every visible match of the first productive candidate.
    /// Strategy order still encodes priority: the first candidate with at
    /// least one visible match short-circuits the cascade.
    pub async fn resolve_all(
        &self,
        page: &dyn PageDriver,
        strategies: &[LocatorStrategy],
    ) -> Vec<ElementHandle> {
        for strategy in strategies {
            for query in strategy.candidates() {
                let elements = match page.query_all(&query).await {
                    Ok(elements) => elements,
                    Err(err) => {
                        debug!("candidate {} errored: {}", query, err);
                        continue;
                    }
                };

                let mut visible = Vec::new();
                for element in elements {
                    if element.is_visible().await.unwrap_or(false) {
                        visible.push(element);
                    }
                }
                if !visible.is_empty() {
                    trace!(
                        "resolved {} elements via {} candidate {}",
                        visible.len(),
                        strategy.name(),
                        query
                    );
                    return visible;
                }
            }
        }
        Vec::new()
    }
}

async fn is_interactable(element: &ElementHandle) -> page_adapter::Result<bool> {
    Ok(element.is_visible().await? && element.is_enabled().await?)
}
