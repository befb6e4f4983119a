//! Vendor-record quality scoring and best-effort enrichment.
//!
//! [`validate`] scores a node's `original_data` for completeness, freshness,
//! and accuracy. [`EnrichmentEngine`] uses that score to decide whether a
//! record is worth repairing, then fetches its source URL and/or falls back
//! to a general search through an injected [`ExtractionClient`].

#![warn(missing_docs)]

mod client;
mod enrichment;
mod report;
mod validator;

pub use client::{ExtractionClient, NullExtractionClient};
pub use enrichment::{EnrichedRecord, EnrichmentEngine};
pub use report::QualityReport;
pub use validator::validate;
