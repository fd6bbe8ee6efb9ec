//! The normalization and aggregation pipeline.
//!
//! Raw records flow through [`normalizer::clean`] into canonical
//! [`HostRecord`](crate::models::HostRecord)s, which
//! [`aggregator::summarize`] reduces to corpus statistics. Both stages are
//! stateless and never fail on data-shape grounds.

pub mod aggregator;
pub mod normalizer;

pub use aggregator::summarize;
pub use normalizer::{clean, clean_with, validate, DropSink, TracingSink};
