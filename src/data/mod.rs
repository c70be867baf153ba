//! Data module: datasets, embedding files and built-in projections.

pub mod dataset;
pub mod projection;
pub mod synthetic;

pub use dataset::{load_csv, load_dataset, load_embedding, Dataset};
pub use projection::{pca, PcaConfig, PcaResult, Projection};
pub use synthetic::make_blobs;
