pub mod aggregate;
pub mod merge;

pub use aggregate::{aggregate, Aggregation};
pub use merge::{merge_results, merge_summaries};
