//! Critical path analysis.
//!
//! Computes the maximum-weight source-to-sink path of a DAG task and
//! partitions the remaining nodes into providers and consumers relative to it.

mod calculation;
mod classification;
mod types;

pub use calculation::{all_paths, longest_path, longest_path_exhaustive, path_weight};
pub use classification::{
    hops_from_critical, hops_to_critical, Classification, Classifier, ProximityClassifier,
};
pub use types::{CriticalPath, PathTieBreak};
