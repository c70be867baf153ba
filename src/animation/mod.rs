//! Animated transitions between 2-D embeddings
//!
//! The pipeline is `normalize → interpolate → render → encode`:
//! - [`normalize`] rescales each embedding into [0, 1] per axis
//! - [`interpolate`] moves points linearly between two normalized layouts
//! - [`render`] rasterizes one scatter-plot frame with fixed limits and colors
//! - [`encode`] assembles frames into a GIF written atomically
//!
//! [`TransitionAnimator`] drives the whole pipeline from an [`AnimationConfig`].

pub mod animator;
pub mod config;
pub mod embedding;
pub mod encode;
pub mod font;
pub mod interpolate;
pub mod normalize;
pub mod render;

pub use animator::{
    build_animation, AnimationPlan, AnimationSummary, FrameInfo, Segment, TransitionAnimator,
};
pub use config::AnimationConfig;
pub use embedding::{Axis2, ClassLabel, DegenerateAxis, Embedding, NormalizedEmbedding, Point2};
pub use encode::{encode_gif, save_gif, write_atomic, GifSettings};
pub use font::{ensure_font, registered_font, FONT_ENV_VAR};
pub use interpolate::{interpolate, Transition, TransitionFrames};
pub use normalize::{normalize, normalize_all, DEGENERATE_AXIS_VALUE};
pub use render::{render_frame, AxisLimits, ColorMap, RenderStyle, Rgb, TAB10};
