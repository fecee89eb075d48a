//! Locator strategy types

use page_adapter::Query;
use serde::{Deserialize, Serialize};

/// An ordered, named rule for finding one logical UI role.
///
/// Strategies are immutable data; a role is a `Vec<LocatorStrategy>` ranked
/// from most to least specific.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocatorStrategy {
    /// Ordered CSS selector candidates.
    CssList(Vec<String>),

    /// Ordered XPath candidates.
    XPathList(Vec<String>),

    /// Keyword-driven attribute heuristic: each keyword expands into an
    /// attribute-contains selector over id/class/name/placeholder/testid.
    AttributeHeuristic { keywords: Vec<String> },
}

impl LocatorStrategy {
    /// Convenience constructor for a CSS candidate list.
    pub fn css<S: Into<String>>(candidates: impl IntoIterator<Item = S>) -> Self {
        LocatorStrategy::CssList(candidates.into_iter().map(Into::into).collect())
    }

    /// Convenience constructor for an XPath candidate list.
    pub fn xpath<S: Into<String>>(candidates: impl IntoIterator<Item = S>) -> Self {
        LocatorStrategy::XPathList(candidates.into_iter().map(Into::into).collect())
    }

    /// Convenience constructor for the attribute heuristic.
    pub fn keywords<S: Into<String>>(keywords: impl IntoIterator<Item = S>) -> Self {
        LocatorStrategy::AttributeHeuristic {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// Strategy name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            LocatorStrategy::CssList(_) => "css",
            LocatorStrategy::XPathList(_) => "xpath",
            LocatorStrategy::AttributeHeuristic { .. } => "attribute-heuristic",
        }
    }

    /// Expand the strategy into concrete page queries, in candidate order.
    pub fn candidates(&self) -> Vec<Query> {
        match self {
            LocatorStrategy::CssList(selectors) => {
                selectors.iter().cloned().map(Query::Css).collect()
            }
            LocatorStrategy::XPathList(expressions) => {
                expressions.iter().cloned().map(Query::XPath).collect()
            }
            LocatorStrategy::AttributeHeuristic { keywords } => keywords
                .iter()
                .map(|kw| {
                    Query::Css(format!(
                        "[id*='{kw}'], [class*='{kw}'], [name*='{kw}'], \
                         [placeholder*='{kw}'], [data-testid*='{kw}']"
                    ))
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_candidates_preserve_order() {
        let strategy = LocatorStrategy::css(["#search-input", "input[type='search']"]);
        let candidates = strategy.candidates();
        assert_eq!(candidates[0], Query::Css("#search-input".into()));
        assert_eq!(candidates[1], Query::Css("input[type='search']".into()));
    }

    #[test]
    fn heuristic_expands_each_keyword() {
        let strategy = LocatorStrategy::keywords(["search"]);
        let candidates = strategy.candidates();
        assert_eq!(candidates.len(), 1);
        let Query::Css(expanded) = &candidates[0] else {
            panic!("heuristic must expand to css");
        };
        assert!(expanded.contains("[id*='search']"));
        assert!(expanded.contains("[placeholder*='search']"));
    }

    #[test]
    fn strategy_names() {
        assert_eq!(LocatorStrategy::css(["a"]).name(), "css");
        assert_eq!(LocatorStrategy::xpath(["//a"]).name(), "xpath");
        assert_eq!(
            LocatorStrategy::keywords(["login"]).name(),
            "attribute-heuristic"
        );
    }
}
