//! Shape-driven field extraction

use crate::schema::{FieldShape, FieldSpec, FieldValue};
use element_locator::{LocatorStrategy, SelectorResolver};
use page_adapter::{util::absolutize, PageDriver, Query};
use tracing::debug;

/// Minimum length for a child-element text to count as a list item.
const MIN_ITEM_LEN: usize = 4;

/// Extracts a single field value according to its shape fallback order.
///
/// All driver failures are caught here, at the extractor boundary: the
/// result is `None` (key absence), never an error. Link-bearing elements
/// (`video source`, iframes) are read without the visibility gate —
/// media sources frequently occupy no layout box.
pub struct FieldExtractor {
    base_url: String,
    resolver: SelectorResolver,
}

impl FieldExtractor {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            resolver: SelectorResolver::new(),
        }
    }

    /// Run one field's recipe against the page.
    pub async fn extract(&self, page: &dyn PageDriver, spec: &FieldSpec) -> Option<FieldValue> {
        let value = match &spec.shape {
            FieldShape::Text => self.scalar_text(page, &spec.strategies).await,
            FieldShape::List => match self.list_text(page, &spec.strategies).await {
                Some(text) => Some(text),
                None => self.scalar_text(page, &spec.strategies).await,
            },
            FieldShape::Table => match self.table_text(page, &spec.strategies).await {
                Some(text) => Some(text),
                None => self.scalar_text(page, &spec.strategies).await,
            },
            FieldShape::TableThenList => {
                match self.table_text(page, &spec.strategies).await {
                    Some(text) => Some(text),
                    None => match self.list_text(page, &spec.strategies).await {
                        Some(text) => Some(text),
                        None => self.scalar_text(page, &spec.strategies).await,
                    },
                }
            }
            FieldShape::Link { attrs } => self.link_url(page, &spec.strategies, attrs).await,
            FieldShape::LinkList => self.link_list(page, &spec.strategies).await,
            FieldShape::Images => {
                return self.image_urls(page, &spec.strategies).await;
            }
        };
        value.map(FieldValue::Text)
    }

    /// First non-blank `innerText` across the cascade, in declared order.
    async fn scalar_text(
        &self,
        page: &dyn PageDriver,
        strategies: &[LocatorStrategy],
    ) -> Option<String> {
        for query in candidates(strategies) {
            let element = match page.query(&query).await {
                Ok(Some(element)) => element,
                Ok(None) => continue,
                Err(err) => {
                    debug!("text candidate {} errored: {}", query, err);
                    continue;
                }
            };
            if !element.is_visible().await.unwrap_or(false) {
                continue;
            }
            match element.inner_text().await {
                Ok(text) if !text.trim().is_empty() => return Some(text.trim().to_string()),
                Ok(_) => continue,
                Err(err) => {
                    debug!("text candidate {} unreadable: {}", query, err);
                    continue;
                }
            }
        }
        None
    }

    /// Bullet-list extraction: list items under the container, then its
    /// text-bearing children.
    async fn list_text(
        &self,
        page: &dyn PageDriver,
        strategies: &[LocatorStrategy],
    ) -> Option<String> {
        for selector in css_candidates(strategies) {
            let items = self
                .collect_texts(page, &format!("{selector} li"), 1)
                .await;
            if !items.is_empty() {
                return Some(bulleted(&items));
            }

            let children = self
                .collect_texts(
                    page,
                    &format!("{selector} div, {selector} p, {selector} span"),
                    MIN_ITEM_LEN,
                )
                .await;
            if !children.is_empty() {
                return Some(bulleted(&children));
            }
        }
        None
    }

    /// Row/cell table extraction. A table row's `innerText` separates
    /// cells with tabs; cells are re-joined with `" | "` and rows with a
    /// newline.
    async fn table_text(
        &self,
        page: &dyn PageDriver,
        strategies: &[LocatorStrategy],
    ) -> Option<String> {
        for selector in css_candidates(strategies) {
            let query = Query::Css(format!("{selector} tr"));
            let rows = match page.query_all(&query).await {
                Ok(rows) => rows,
                Err(err) => {
                    debug!("table candidate {} errored: {}", query, err);
                    continue;
                }
            };

            let mut lines = Vec::new();
            for row in rows {
                let text = match row.inner_text().await {
                    Ok(text) => text,
                    Err(_) => continue,
                };
                let cells: Vec<&str> = text
                    .split('\t')
                    .map(str::trim)
                    .filter(|cell| !cell.is_empty())
                    .collect();
                if !cells.is_empty() {
                    lines.push(cells.join(" | "));
                }
            }
            if !lines.is_empty() {
                return Some(lines.join("\n"));
            }
        }
        None
    }

    /// First usable URL attribute from the first matching element.
    async fn link_url(
        &self,
        page: &dyn PageDriver,
        strategies: &[LocatorStrategy],
        attrs: &[String],
    ) -> Option<String> {
        for query in candidates(strategies) {
            let element = match page.query(&query).await {
                Ok(Some(element)) => element,
                Ok(None) => continue,
                Err(err) => {
                    debug!("link candidate {} errored: {}", query, err);
                    continue;
                }
            };
            for attr in attrs {
                if let Ok(Some(value)) = element.attribute(attr).await {
                    if let Some(url) = absolutize(&self.base_url, &value) {
                        return Some(url);
                    }
                }
            }
        }
        None
    }

    /// All anchors of the first productive candidate, as `"label: url"`
    /// pairs joined by `"; "`.
    async fn link_list(
        &self,
        page: &dyn PageDriver,
        strategies: &[LocatorStrategy],
    ) -> Option<String> {
        for query in candidates(strategies) {
            let anchors = match page.query_all(&query).await {
                Ok(anchors) => anchors,
                Err(err) => {
                    debug!("link-list candidate {} errored: {}", query, err);
                    continue;
                }
            };

            let mut pairs = Vec::new();
            for anchor in anchors {
                let href = match anchor.attribute("href").await {
                    Ok(Some(href)) => href,
                    _ => continue,
                };
                let label = anchor.inner_text().await.unwrap_or_default();
                let label = label.trim();
                if label.is_empty() {
                    continue;
                }
                if let Some(url) = absolutize(&self.base_url, &href) {
                    pairs.push(format!("{}: {}", label, url));
                }
            }
            if !pairs.is_empty() {
                return Some(pairs.join("; "));
            }
        }
        None
    }

    /// All visible image URLs, absolutized, first-seen order, no
    /// duplicates. Downloading is the persistence collaborator's job.
    async fn image_urls(
        &self,
        page: &dyn PageDriver,
        strategies: &[LocatorStrategy],
    ) -> Option<FieldValue> {
        let elements = self.resolver.resolve_all(page, strategies).await;
        let mut urls: Vec<String> = Vec::new();
        for element in elements {
            if let Ok(Some(src)) = element.attribute("src").await {
                if let Some(url) = absolutize(&self.base_url, &src) {
                    if !urls.contains(&url) {
                        urls.push(url);
                    }
                }
            }
        }
        if urls.is_empty() {
            None
        } else {
            Some(FieldValue::Urls(urls))
        }
    }

    async fn collect_texts(
        &self,
        page: &dyn PageDriver,
        selector: &str,
        min_len: usize,
    ) -> Vec<String> {
        let query = Query::Css(selector.to_string());
        let elements = match page.query_all(&query).await {
            Ok(elements) => elements,
            Err(err) => {
                debug!("list candidate {} errored: {}", query, err);
                return Vec::new();
            }
        };

        let mut texts = Vec::new();
        for element in elements {
            if let Ok(text) = element.inner_text().await {
                let text = text.trim();
                if text.len() >= min_len {
                    texts.push(text.to_string());
                }
            }
        }
        texts
    }
}

fn bulleted(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("\u{2022} {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn candidates(strategies: &[LocatorStrategy]) -> Vec<Query> {
    strategies
        .iter()
        .flat_map(|strategy| strategy.candidates())
        .collect()
}

/// Single CSS selectors usable for derived child queries (`<sel> li`,
/// `<sel> tr`). Comma groups and XPath candidates are skipped; they still
/// participate in the scalar fallback.
fn css_candidates(strategies: &[LocatorStrategy]) -> Vec<String> {
    candidates(strategies)
        .into_iter()
        .filter_map(|query| match query {
            Query::Css(selector) if !selector.contains(',') => Some(selector),
            _ => None,
        })
        .collect()
}
