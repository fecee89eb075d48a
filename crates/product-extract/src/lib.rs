//! Per-field extraction pipeline
//!
//! A loaded product page is read through a fixed schema of 19 fields, each
//! with its own locator cascade and shape fallback (table, list, link,
//! scalar text). Extractors fail independently: a miss is key-absence in
//! the sparse record, never an abort. The completeness check at the end is
//! advisory only.

pub mod completeness;
pub mod extractor;
pub mod pipeline;
pub mod schema;

pub use completeness::CompletenessFinding;
pub use extractor::FieldExtractor;
pub use pipeline::{ExtractedProduct, ExtractionPipeline};
pub use schema::{default_schema, FieldShape, FieldSpec, FieldValue, ProductField, ProductRecord};
