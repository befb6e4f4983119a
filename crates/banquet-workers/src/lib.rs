//! Category workers: compile mandatory criteria into predicates, ensure
//! graph coverage, fill quality gaps on low-scoring nodes, filter, and rank
//! candidates with a shared weighted score (30% optional-field match, 20%
//! data-driven inference, 40% style alignment, 10% bonus indicators).

#![warn(missing_docs)]

pub mod catering;
pub mod coverage;
pub mod decor;
mod enrichment;
mod error;
mod rules;
mod scoring;
pub mod venue;

pub use catering::CateringWorker;
pub use coverage::{CoverageCrawler, NullCoverageCrawler};
pub use decor::DecorWorker;
pub use enrichment::fill_quality_gaps;
pub use error::{Result, WorkerError};
pub use venue::VenueWorker;
