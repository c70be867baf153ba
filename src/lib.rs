//! projection-morph - Animated transitions between 2-D projections
//!
//! This crate renders a labeled point set as it morphs through a sequence of
//! 2-D embeddings (PCA, t-SNE, UMAP or any precomputed layout) and writes the
//! result as a looping GIF.
//!
//! # Modules
//!
//! - [`animation`] - Normalization, interpolation, frame rendering and GIF encoding
//! - [`data`] - CSV datasets, embedding files, built-in projections and synthetic clusters
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use projection_morph::prelude::*;
//!
//! let a = Embedding::new("before", vec![[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]]);
//! let b = Embedding::new("after", vec![[5.0, 5.0], [6.0, 4.0], [7.0, 5.0]]);
//! let animator = TransitionAnimator::new(AnimationConfig::default())?;
//! animator.build_animation(&[a, b], &[0, 1, 1], "transitions.gif")?;
//! # Ok::<(), MorphError>(())
//! ```

// Core error handling
pub mod error;

pub mod animation;
pub mod data;

// Interface
pub mod cli;

pub use error::{MorphError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::animation::{
        build_animation, interpolate, normalize, render_frame, AnimationConfig, AnimationPlan,
        AnimationSummary, AxisLimits, ClassLabel, ColorMap, Embedding, NormalizedEmbedding,
        Point2, RenderStyle, Rgb, TransitionAnimator,
    };
    pub use crate::data::{load_dataset, load_embedding, make_blobs, Dataset, Projection};
    pub use crate::error::{MorphError, Result};
}
