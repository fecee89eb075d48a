//! Extraction pipeline over a loaded product page

use crate::completeness::{self, CompletenessFinding};
use crate::extractor::FieldExtractor;
use crate::schema::{default_schema, FieldSpec, FieldValue, ProductField, ProductRecord};
use pacing::BehaviorPacer;
use page_adapter::PageDriver;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A finished extraction: the sparse record plus advisory findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedProduct {
    pub record: ProductRecord,
    pub findings: Vec<CompletenessFinding>,
}

/// Runs the ordered field extractors over a loaded product page and
/// assembles a sparse record.
///
/// Extractors are isolated: one field's miss never aborts the others, and
/// nothing here mutates the page, so running the pipeline twice over the
/// same static page yields identical records.
pub struct ExtractionPipeline {
    extractor: FieldExtractor,
    pacer: BehaviorPacer,
    schema: Vec<FieldSpec>,
}

impl ExtractionPipeline {
    pub fn new(base_url: impl Into<String>, pacer: BehaviorPacer) -> Self {
        Self {
            extractor: FieldExtractor::new(base_url),
            pacer,
            schema: default_schema(),
        }
    }

    /// Replace the default schema (used for per-site field overrides).
    pub fn with_schema(mut self, schema: Vec<FieldSpec>) -> Self {
        self.schema = schema;
        self
    }

    /// Extract every schema field from the already-loaded page.
    ///
    /// `product_url` is the `Found` URL the page was reached through; it
    /// seeds the record's `product_link` field.
    pub async fn extract(&self, page: &dyn PageDriver, product_url: &str) -> ExtractedProduct {
        self.pacer.pause(page).await;

        let mut record = ProductRecord::new();
        record.insert(
            ProductField::ProductLink,
            FieldValue::Text(product_url.to_string()),
        );

        for spec in &self.schema {
            match self.extractor.extract(page, spec).await {
                Some(value) if !value.is_empty() => {
                    debug!("extracted '{}'", spec.field.as_str());
                    record.insert(spec.field, value);
                }
                _ => debug!("field '{}' yielded nothing", spec.field.as_str()),
            }
        }

        let findings = completeness::check(&record);
        if findings.is_empty() {
            info!("extraction finished: {} fields", record.len());
        } else {
            for finding in &findings {
                warn!("completeness: {}", finding);
            }
        }

        ExtractedProduct { record, findings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_adapter::mock::{MockElement, MockPage};
    use std::time::Duration;

    const PRODUCT_URL: &str = "https://shop.test/product/20101555";

    fn pipeline() -> ExtractionPipeline {
        ExtractionPipeline::new(
            "https://shop.test",
            BehaviorPacer::new(Duration::ZERO, Duration::ZERO),
        )
    }

    fn product_page() -> MockPage {
        let page = MockPage::new();
        page.insert("h1", MockElement::text("Exhaust gasket kit"));
        page.insert(".gallery img", MockElement::new().attr("src", "/img/1.jpg"));
        page.insert(".gallery img", MockElement::new().attr("src", "/img/2.jpg"));
        page
    }

    #[tokio::test(start_paused = true)]
    async fn missing_specs_still_yields_title_and_images() {
        let page = product_page();

        let extracted = pipeline().extract(&page, PRODUCT_URL).await;

        assert!(extracted.record.contains_key(&ProductField::Title));
        assert!(extracted.record.contains_key(&ProductField::Images));
        assert!(!extracted.record.contains_key(&ProductField::Specs));
        // Flagged, not failed.
        assert!(extracted
            .findings
            .contains(&CompletenessFinding::MissingImportant(ProductField::Specs)));
        assert!(!extracted
            .findings
            .contains(&CompletenessFinding::ImportanceSetEmpty));
    }

    #[tokio::test(start_paused = true)]
    async fn product_link_is_seeded_from_found_url() {
        let page = product_page();

        let extracted = pipeline().extract(&page, PRODUCT_URL).await;
        assert_eq!(
            extracted.record.get(&ProductField::ProductLink),
            Some(&FieldValue::Text(PRODUCT_URL.to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn extraction_is_idempotent_over_a_static_page() {
        let page = product_page();
        page.insert(".fitment-table tr", MockElement::text("CB750\t1975-1978"));

        let first = pipeline().extract(&page, PRODUCT_URL).await;
        let second = pipeline().extract(&page, PRODUCT_URL).await;

        assert_eq!(first.record, second.record);
        assert_eq!(first.findings, second.findings);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_extractor_does_not_abort_the_others() {
        let page = product_page();
        // Title container detaches mid-extraction; everything else lands.
        let _ = page.insert("h2", MockElement::text("boom").poisoned());

        let extracted = pipeline().extract(&page, PRODUCT_URL).await;
        assert!(extracted.record.contains_key(&ProductField::Title));
        assert!(!extracted.record.contains_key(&ProductField::Subtitle));
        assert!(extracted.record.contains_key(&ProductField::Images));
    }

    #[tokio::test(start_paused = true)]
    async fn blank_values_are_stripped() {
        let page = MockPage::new();
        page.insert("h1", MockElement::text("   "));

        let extracted = pipeline().extract(&page, PRODUCT_URL).await;
        assert!(!extracted.record.contains_key(&ProductField::Title));
        assert!(extracted
            .findings
            .contains(&CompletenessFinding::MissingMandatory(ProductField::Title)));
    }
}
