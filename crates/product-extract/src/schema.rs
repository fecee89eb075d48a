//! The fixed product schema and its locator tables

use element_locator::LocatorStrategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The 19 fields of a product record.
///
/// Declaration order is the record's canonical column order; `BTreeMap`
/// keys iterate in it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProductField {
    ProductLink,
    Title,
    Subtitle,
    Features,
    Specs,
    PartCodes,
    PartNotices,
    Certifications,
    References,
    PackageInfo,
    SizeChart,
    VideoUrl,
    Images,
    OemReplacement,
    FitmentTable,
    FitmentText,
    CatalogLink,
    DirectoryImage,
    DetailedVideo,
}

impl ProductField {
    /// Stable field name used by the persistence collaborator.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductField::ProductLink => "product_link",
            ProductField::Title => "title",
            ProductField::Subtitle => "subtitle",
            ProductField::Features => "features",
            ProductField::Specs => "specs",
            ProductField::PartCodes => "part_codes",
            ProductField::PartNotices => "part_notices",
            ProductField::Certifications => "certifications",
            ProductField::References => "references",
            ProductField::PackageInfo => "package_info",
            ProductField::SizeChart => "size_chart",
            ProductField::VideoUrl => "video_url",
            ProductField::Images => "images",
            ProductField::OemReplacement => "oem_replacement",
            ProductField::FitmentTable => "fitment_table",
            ProductField::FitmentText => "fitment_text",
            ProductField::CatalogLink => "catalog_link",
            ProductField::DirectoryImage => "directory_image",
            ProductField::DetailedVideo => "detailed_video",
        }
    }
}

/// An extracted value: text (possibly delimited list/table text) or a list
/// of URLs for the images field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Urls(Vec<String>),
}

impl FieldValue {
    /// Empty values are stripped from the record rather than stored.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Urls(urls) => urls.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Urls(_) => None,
        }
    }
}

/// Sparse product record: absent keys mean extraction yielded nothing.
/// Padding with empty strings is the persistence boundary's business, not
/// ours.
pub type ProductRecord = BTreeMap<ProductField, FieldValue>;

/// Shape fallback order applied by the extractor for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldShape {
    /// First non-blank `innerText`.
    Text,

    /// Bullet-list extraction, then child-element texts, then scalar.
    List,

    /// Row/cell table extraction, then scalar container text.
    Table,

    /// Table, then list, then scalar (specification blocks vary wildly).
    TableThenList,

    /// Read URL attributes in order from the first matching element.
    Link { attrs: Vec<String> },

    /// All anchors as `"label: url"` pairs joined by `"; "`.
    LinkList,

    /// All image URLs, absolutized and de-duplicated.
    Images,
}

impl FieldShape {
    fn link(attrs: &[&str]) -> Self {
        FieldShape::Link {
            attrs: attrs.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// One field's extraction recipe: its shape plus its locator cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: ProductField,
    pub shape: FieldShape,
    pub strategies: Vec<LocatorStrategy>,
}

impl FieldSpec {
    fn css(field: ProductField, shape: FieldShape, selectors: &[&str]) -> Self {
        Self {
            field,
            shape,
            strategies: vec![LocatorStrategy::css(selectors.iter().copied())],
        }
    }
}

/// The default extraction schema. `product_link` is seeded by the pipeline
/// from the search outcome, so it carries no recipe here.
pub fn default_schema() -> Vec<FieldSpec> {
    vec![
        FieldSpec::css(
            ProductField::Title,
            FieldShape::Text,
            &[
                "h1",
                ".product-title",
                ".product-name",
                ".main-title",
                "[data-testid='product-title']",
            ],
        ),
        FieldSpec::css(
            ProductField::Subtitle,
            FieldShape::Text,
            &["h2", ".product-subtitle", ".sub-title", ".product-description-short"],
        ),
        FieldSpec::css(
            ProductField::Features,
            FieldShape::List,
            &[
                ".features",
                ".product-features",
                ".feature-list",
                "[data-section='features']",
                ".highlights",
            ],
        ),
        FieldSpec::css(
            ProductField::Specs,
            FieldShape::TableThenList,
            &[
                ".specifications",
                ".specs",
                ".tech-specs",
                ".product-specs",
                "[data-section='specifications']",
                ".spec-table",
            ],
        ),
        FieldSpec::css(
            ProductField::PartCodes,
            FieldShape::Text,
            &[".part-codes", ".product-codes", ".sku-list", ".part-numbers"],
        ),
        FieldSpec::css(
            ProductField::PartNotices,
            FieldShape::Text,
            &[".part-notices", ".product-notices", ".warnings", ".important-info"],
        ),
        FieldSpec::css(
            ProductField::Certifications,
            FieldShape::Text,
            &[".certifications", ".certificates", ".product-certifications"],
        ),
        FieldSpec::css(
            ProductField::References,
            FieldShape::LinkList,
            &[".references a", ".related-links a", ".external-links a"],
        ),
        FieldSpec::css(
            ProductField::PackageInfo,
            FieldShape::Text,
            &[".package-info", ".packaging", ".shipping-info"],
        ),
        FieldSpec::css(
            ProductField::SizeChart,
            FieldShape::Text,
            &[".size-chart", ".sizing-chart", ".dimensions"],
        ),
        FieldSpec::css(
            ProductField::VideoUrl,
            FieldShape::link(&["src", "data-video-url"]),
            &[
                "video source",
                "iframe[src*='youtube']",
                "iframe[src*='vimeo']",
                "[data-video-url]",
            ],
        ),
        FieldSpec::css(
            ProductField::Images,
            FieldShape::Images,
            &[
                ".product-images img",
                ".gallery img",
                ".product-gallery img",
                ".image-gallery img",
                "[data-testid='product-image']",
            ],
        ),
        FieldSpec::css(
            ProductField::OemReplacement,
            FieldShape::Text,
            &[".oem-replacement", ".oem-info", ".replacement-parts"],
        ),
        FieldSpec::css(
            ProductField::FitmentTable,
            FieldShape::Table,
            &[".fitment-table", ".compatibility-table", ".fits-table"],
        ),
        FieldSpec::css(
            ProductField::FitmentText,
            FieldShape::Text,
            &[".fitment-info", ".compatibility-info", ".fits-description"],
        ),
        FieldSpec::css(
            ProductField::CatalogLink,
            FieldShape::link(&["href"]),
            &["a[href*='catalog']", "a[href*='manual']", ".catalog-link"],
        ),
        FieldSpec::css(
            ProductField::DirectoryImage,
            FieldShape::link(&["src"]),
            &[".directory-image img", ".category-image img"],
        ),
        FieldSpec::css(
            ProductField::DetailedVideo,
            FieldShape::link(&["src", "data-detailed-video"]),
            &[
                ".detailed-video iframe",
                ".instruction-video iframe",
                "[data-detailed-video]",
            ],
        ),
    ]
}
