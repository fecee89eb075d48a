//! Advisory completeness check
//!
//! Findings flag a thin record for the operator; they never discard or
//! fail one. A page with only a title is still a record.

use crate::schema::{FieldValue, ProductField, ProductRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields a record is expected to always carry.
const MANDATORY: &[ProductField] = &[ProductField::ProductLink, ProductField::Title];

/// Fields whose collective absence suggests the page structure moved.
const IMPORTANCE_SET: &[ProductField] = &[
    ProductField::Features,
    ProductField::Specs,
    ProductField::Images,
];

/// Fields whose text value must look like an absolute URL.
const URL_FIELDS: &[ProductField] = &[
    ProductField::ProductLink,
    ProductField::VideoUrl,
    ProductField::CatalogLink,
];

/// One advisory finding about an extracted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletenessFinding {
    /// A mandatory field is absent.
    MissingMandatory(ProductField),

    /// An importance-set field is absent.
    MissingImportant(ProductField),

    /// Every importance-set field is absent.
    ImportanceSetEmpty,

    /// A link-bearing field holds something that is not an absolute URL.
    MalformedUrl { field: ProductField, value: String },
}

impl fmt::Display for CompletenessFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletenessFinding::MissingMandatory(field) => {
                write!(f, "mandatory field '{}' missing", field.as_str())
            }
            CompletenessFinding::MissingImportant(field) => {
                write!(f, "important field '{}' missing", field.as_str())
            }
            CompletenessFinding::ImportanceSetEmpty => {
                write!(f, "no important field extracted (features, specs, images)")
            }
            CompletenessFinding::MalformedUrl { field, value } => {
                write!(f, "field '{}' holds a malformed URL: {}", field.as_str(), value)
            }
        }
    }
}

/// Inspect a finished record and produce its advisory findings.
pub fn check(record: &ProductRecord) -> Vec<CompletenessFinding> {
    let mut findings = Vec::new();

    for field in MANDATORY {
        if !record.contains_key(field) {
            findings.push(CompletenessFinding::MissingMandatory(*field));
        }
    }

    let mut important_present = 0usize;
    for field in IMPORTANCE_SET {
        if record.contains_key(field) {
            important_present += 1;
        } else {
            findings.push(CompletenessFinding::MissingImportant(*field));
        }
    }
    if important_present == 0 {
        findings.push(CompletenessFinding::ImportanceSetEmpty);
    }

    for field in URL_FIELDS {
        if let Some(FieldValue::Text(value)) = record.get(field) {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                findings.push(CompletenessFinding::MalformedUrl {
                    field: *field,
                    value: value.clone(),
                });
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(fields: &[(ProductField, &str)]) -> ProductRecord {
        fields
            .iter()
            .map(|(field, value)| (*field, FieldValue::Text(value.to_string())))
            .collect()
    }

    #[test]
    fn complete_record_yields_no_findings() {
        let mut record = record_with(&[
            (ProductField::ProductLink, "https://shop.test/product/1"),
            (ProductField::Title, "Clutch kit"),
            (ProductField::Features, "\u{2022} Complete kit"),
            (ProductField::Specs, "Weight | 2kg"),
        ]);
        record.insert(
            ProductField::Images,
            FieldValue::Urls(vec!["https://cdn.test/a.jpg".to_string()]),
        );
        assert!(check(&record).is_empty());
    }

    #[test]
    fn missing_title_is_flagged_not_fatal() {
        let record = record_with(&[
            (ProductField::ProductLink, "https://shop.test/product/1"),
            (ProductField::Features, "\u{2022} Sealed bearings"),
            (ProductField::Specs, "Bore | 38mm"),
        ]);
        let findings = check(&record);
        assert!(findings.contains(&CompletenessFinding::MissingMandatory(ProductField::Title)));
        assert!(findings.contains(&CompletenessFinding::MissingImportant(ProductField::Images)));
    }

    #[test]
    fn empty_importance_set_is_flagged_once() {
        let record = record_with(&[
            (ProductField::ProductLink, "https://shop.test/product/1"),
            (ProductField::Title, "Handlebar"),
        ]);
        let findings = check(&record);
        assert_eq!(
            findings
                .iter()
                .filter(|f| **f == CompletenessFinding::ImportanceSetEmpty)
                .count(),
            1
        );
    }

    #[test]
    fn malformed_url_is_flagged() {
        let record = record_with(&[
            (ProductField::ProductLink, "product/1"),
            (ProductField::Title, "Handlebar"),
            (ProductField::Features, "\u{2022} Alloy"),
        ]);
        let findings = check(&record);
        assert!(findings.iter().any(|f| matches!(
            f,
            CompletenessFinding::MalformedUrl {
                field: ProductField::ProductLink,
                ..
            }
        )));
    }
}
