//! Similarity clustering for composite compaction.

pub mod hdbscan_clusterer;

pub use hdbscan_clusterer::HdbscanClusterer;
