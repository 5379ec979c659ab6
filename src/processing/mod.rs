//! Signal processing: threshold classification, status aggregation and
//! trend analytics. Everything here is pure and synchronous.

pub mod aggregate;
pub mod analytics;
pub mod threshold;

pub use aggregate::aggregate;
pub use analytics::{format_metric, summarize, TrendSummary};
pub use threshold::classify;
