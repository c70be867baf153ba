//! TransitionAnimator: embeddings in, looping GIF out
//!
//! Building an animation runs four stages:
//! 1. normalize every embedding into [0, 1] per axis
//! 2. compute one set of axis limits for the whole animation
//! 3. interpolate each consecutive pair and render every frame
//! 4. encode the frames, in order, into a single GIF
//!
//! The stages are planned up front in an [`AnimationPlan`], which maps a
//! global frame index to its coordinates. Sequential builds render lazily
//! while encoding; parallel builds render on rayon and collect in index order.

use super::config::AnimationConfig;
use super::embedding::{ClassLabel, Embedding, NormalizedEmbedding, Point2};
use super::encode::{encode_gif, write_atomic};
use super::interpolate::Transition;
use super::normalize::normalize_all;
use super::render::{draw_frame, AxisLimits, ColorMap, RenderStyle};
use crate::error::{MorphError, Result};
use image::RgbaImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Minimum number of embeddings an animation needs
pub const MIN_EMBEDDINGS: usize = 2;

/// One contiguous run of frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    /// Embedding `embedding` shown unchanged
    Hold { embedding: usize, frames: usize },
    /// Points moving from embedding `from` to embedding `to`
    Transition { from: usize, to: usize, frames: usize },
}

impl Segment {
    pub fn frames(&self) -> usize {
        match *self {
            Segment::Hold { frames, .. } | Segment::Transition { frames, .. } => frames,
        }
    }
}

/// Where a global frame index falls in the animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub index: usize,
    pub segment: usize,
    /// Index within the segment
    pub local_index: usize,
    /// `"pca"` for a hold, `"pca -> tsne"` for a transition
    pub title: String,
    /// Interpolation parameter, 0 for holds
    pub t: f64,
}

/// Result of a successful build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSummary {
    pub path: PathBuf,
    pub frame_count: usize,
    pub transition_count: usize,
    pub figure_size: (u32, u32),
    pub bytes: usize,
    pub elapsed: Duration,
}

/// Validated, normalized inputs plus the frame layout of one animation
#[derive(Debug, Clone)]
pub struct AnimationPlan {
    normalized: Vec<NormalizedEmbedding>,
    labels: Vec<ClassLabel>,
    color_map: ColorMap,
    limits: AxisLimits,
    style: RenderStyle,
    segments: Vec<Segment>,
    /// First global frame index of each segment
    offsets: Vec<usize>,
    frame_count: usize,
}

impl AnimationPlan {
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn transition_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Transition { .. }))
            .count()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn normalized(&self) -> &[NormalizedEmbedding] {
        &self.normalized
    }

    pub fn labels(&self) -> &[ClassLabel] {
        &self.labels
    }

    pub fn color_map(&self) -> &ColorMap {
        &self.color_map
    }

    pub fn limits(&self) -> &AxisLimits {
        &self.limits
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    fn locate(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.frame_count {
            return None;
        }
        let segment = self.offsets.partition_point(|&start| start <= index) - 1;
        Some((segment, index - self.offsets[segment]))
    }

    fn transition(&self, from: usize, to: usize, frames: usize) -> Option<Transition<'_>> {
        Transition::new(&self.normalized[from], &self.normalized[to], frames).ok()
    }

    /// Position of global frame `index` in the animation
    pub fn frame_info(&self, index: usize) -> Option<FrameInfo> {
        let (segment, local_index) = self.locate(index)?;
        let (title, t) = match self.segments[segment] {
            Segment::Hold { embedding, .. } => (self.normalized[embedding].name().to_string(), 0.0),
            Segment::Transition { from, to, frames } => {
                let transition = self.transition(from, to, frames)?;
                (transition.title(), transition.t_at(local_index))
            }
        };
        Some(FrameInfo {
            index,
            segment,
            local_index,
            title,
            t,
        })
    }

    /// Point coordinates of global frame `index`
    pub fn coordinates_at(&self, index: usize) -> Option<Vec<Point2>> {
        let (segment, local_index) = self.locate(index)?;
        match self.segments[segment] {
            Segment::Hold { embedding, .. } => Some(self.normalized[embedding].points().to_vec()),
            Segment::Transition { from, to, frames } => {
                self.transition(from, to, frames)?.frame_at(local_index)
            }
        }
    }

    /// Lazy iterator over the coordinates of every frame, in order
    pub fn coordinates(&self) -> impl Iterator<Item = Vec<Point2>> + '_ {
        self.segments.iter().flat_map(move |segment| -> Box<dyn Iterator<Item = Vec<Point2>> + '_> {
            match *segment {
                Segment::Hold { embedding, frames } => {
                    let points = self.normalized[embedding].points();
                    Box::new((0..frames).map(move |_| points.to_vec()))
                }
                Segment::Transition { from, to, frames } => match self.transition(from, to, frames) {
                    Some(transition) => Box::new(transition.frames()),
                    None => Box::new(std::iter::empty()),
                },
            }
        })
    }

    /// Render global frame `index`
    pub fn render_at(&self, index: usize) -> Result<RgbaImage> {
        let coordinates = self.coordinates_at(index).ok_or_else(|| {
            MorphError::InvalidInput(format!(
                "frame {} out of range ({} frames)",
                index, self.frame_count
            ))
        })?;

        if let Some((segment, 0)) = self.locate(index) {
            debug!(
                segment,
                kind = ?self.segments[segment],
                "Rendering segment"
            );
        }

        draw_frame(
            &coordinates,
            &self.labels,
            &self.color_map,
            &self.limits,
            &self.style,
        )
    }
}

fn layout_segments(embeddings: usize, config: &AnimationConfig) -> Vec<Segment> {
    let frames = config.frames_per_transition;
    let mut segments = Vec::new();
    for i in 0..embeddings {
        if config.hold_frames > 0 {
            segments.push(Segment::Hold {
                embedding: i,
                frames: config.hold_frames,
            });
        }
        if i + 1 < embeddings {
            segments.push(Segment::Transition { from: i, to: i + 1, frames });
        } else if config.close_loop {
            segments.push(Segment::Transition { from: i, to: 0, frames });
        }
    }
    segments
}

/// Builds transition animations from a fixed configuration
#[derive(Debug, Clone)]
pub struct TransitionAnimator {
    config: AnimationConfig,
}

impl TransitionAnimator {
    /// Create an animator, validating the configuration
    pub fn new(config: AnimationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Validate the inputs, normalize every embedding and lay out the frames.
    ///
    /// Fails with `InsufficientData` for fewer than two embeddings and with
    /// `ShapeMismatch` when an embedding or the labels disagree with the
    /// first embedding's point count.
    pub fn plan(&self, embeddings: &[Embedding], labels: &[ClassLabel]) -> Result<AnimationPlan> {
        if embeddings.len() < MIN_EMBEDDINGS {
            return Err(MorphError::InsufficientData(format!(
                "need at least {} embeddings to animate, got {}",
                MIN_EMBEDDINGS,
                embeddings.len()
            )));
        }

        let expected = embeddings[0].len();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
            return Err(MorphError::ShapeMismatch {
                name: bad.name().to_string(),
                expected,
                actual: bad.len(),
            });
        }
        if labels.len() != expected {
            return Err(MorphError::ShapeMismatch {
                name: "labels".to_string(),
                expected,
                actual: labels.len(),
            });
        }

        let normalized = normalize_all(embeddings)?;
        let limits = AxisLimits::from_embeddings(&normalized, self.config.axis_margin)?;

        let segments = layout_segments(normalized.len(), &self.config);
        let mut offsets = Vec::with_capacity(segments.len());
        let mut frame_count = 0;
        for segment in &segments {
            offsets.push(frame_count);
            frame_count += segment.frames();
        }

        Ok(AnimationPlan {
            normalized,
            labels: labels.to_vec(),
            color_map: self.config.color_map(labels),
            limits,
            style: self.config.render_style(),
            segments,
            offsets,
            frame_count,
        })
    }

    /// Render and encode every frame of `plan` into GIF bytes.
    ///
    /// `progress(done, total)` is called once per frame, after that frame
    /// rendered successfully.
    pub fn encode_plan<F>(&self, plan: &AnimationPlan, progress: &mut F) -> Result<(Vec<u8>, usize)>
    where
        F: FnMut(usize, usize),
    {
        let total = plan.frame_count();
        let settings = self.config.gif_settings();
        if self.config.parallel {
            let frames = self.render_frames(plan)?;
            encode_gif(
                frames.into_iter().enumerate().map(|(i, frame)| {
                    progress(i + 1, total);
                    Ok(frame)
                }),
                &settings,
            )
        } else {
            encode_gif(
                (0..total).map(|i| {
                    let frame = plan.render_at(i)?;
                    progress(i + 1, total);
                    Ok(frame)
                }),
                &settings,
            )
        }
    }

    /// Render every frame of `plan` in order
    pub fn render_frames(&self, plan: &AnimationPlan) -> Result<Vec<RgbaImage>> {
        if self.config.parallel {
            (0..plan.frame_count())
                .into_par_iter()
                .map(|i| plan.render_at(i))
                .collect()
        } else {
            (0..plan.frame_count()).map(|i| plan.render_at(i)).collect()
        }
    }

    /// Build the animation and write it to `path` as a GIF
    pub fn build_animation(
        &self,
        embeddings: &[Embedding],
        labels: &[ClassLabel],
        path: impl AsRef<Path>,
    ) -> Result<AnimationSummary> {
        self.build_animation_with_progress(embeddings, labels, path, |_, _| {})
    }

    /// Like [`build_animation`](Self::build_animation), calling
    /// `progress(done, total)` after each frame renders.
    pub fn build_animation_with_progress<F>(
        &self,
        embeddings: &[Embedding],
        labels: &[ClassLabel],
        path: impl AsRef<Path>,
        mut progress: F,
    ) -> Result<AnimationSummary>
    where
        F: FnMut(usize, usize),
    {
        let path = path.as_ref();
        let start = Instant::now();
        let plan = self.plan(embeddings, labels)?;
        let total = plan.frame_count();

        info!(
            embeddings = embeddings.len(),
            points = plan.labels().len(),
            transitions = plan.transition_count(),
            frames = total,
            parallel = self.config.parallel,
            "Building animation"
        );

        let (bytes, frame_count) = self.encode_plan(&plan, &mut progress)?;
        write_atomic(path, &bytes)?;

        let summary = AnimationSummary {
            path: path.to_path_buf(),
            frame_count,
            transition_count: plan.transition_count(),
            figure_size: self.config.figure_size,
            bytes: bytes.len(),
            elapsed: start.elapsed(),
        };

        info!(
            path = %path.display(),
            frames = summary.frame_count,
            bytes = summary.bytes,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Animation written"
        );

        Ok(summary)
    }
}

/// Build a looping GIF with the default configuration.
///
/// `frames_per_transition` interpolated frames are rendered for each
/// consecutive pair of `embeddings`, each shown for `frame_duration_ms`.
pub fn build_animation(
    embeddings: &[Embedding],
    labels: &[ClassLabel],
    frames_per_transition: usize,
    frame_duration_ms: u32,
    path: impl AsRef<Path>,
) -> Result<AnimationSummary> {
    let config = AnimationConfig::default()
        .with_frames_per_transition(frames_per_transition)
        .with_frame_duration_ms(frame_duration_ms);
    TransitionAnimator::new(config)?.build_animation(embeddings, labels, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> AnimationConfig {
        AnimationConfig::new()
            .with_figure_size(64, 48)
            .with_frames_per_transition(4)
    }

    fn embeddings() -> Vec<Embedding> {
        vec![
            Embedding::new("raw", vec![[0.0, 0.0], [10.0, 0.0], [0.0, 10.0]]),
            Embedding::new("pca", vec![[1.0, 1.0], [0.0, 1.0], [1.0, 0.0]]),
            Embedding::new("tsne", vec![[-5.0, 2.0], [5.0, -2.0], [0.0, 0.0]]),
        ]
    }

    #[test]
    fn test_plan_frame_layout() {
        let animator = TransitionAnimator::new(small_config()).unwrap();
        let plan = animator.plan(&embeddings(), &[0, 1, 0]).unwrap();

        assert_eq!(plan.frame_count(), 8);
        assert_eq!(plan.transition_count(), 2);
        assert_eq!(plan.coordinates().count(), 8);

        let info = plan.frame_info(5).unwrap();
        assert_eq!(info.segment, 1);
        assert_eq!(info.local_index, 1);
        assert_eq!(info.title, "pca -> tsne");
        assert!(plan.frame_info(8).is_none());
    }

    #[test]
    fn test_plan_random_access_matches_iteration() {
        let config = small_config().with_hold_frames(2).with_close_loop(true);
        let animator = TransitionAnimator::new(config).unwrap();
        let plan = animator.plan(&embeddings(), &[0, 1, 2]).unwrap();

        // 3 holds of 2 + 3 transitions of 4
        assert_eq!(plan.frame_count(), 18);
        assert_eq!(plan.transition_count(), 3);

        let sequential: Vec<_> = plan.coordinates().collect();
        assert_eq!(sequential.len(), plan.frame_count());
        for (i, coords) in sequential.iter().enumerate() {
            assert_eq!(Some(coords.clone()), plan.coordinates_at(i));
        }

        let last = plan.frame_info(17).unwrap();
        assert_eq!(last.title, "tsne -> raw");
        assert_eq!(last.t, 1.0);
        assert_eq!(sequential[17].as_slice(), plan.normalized()[0].points());
    }

    #[test]
    fn test_plan_hold_segments() {
        let config = small_config().with_hold_frames(3);
        let plan = TransitionAnimator::new(config)
            .unwrap()
            .plan(&embeddings()[..2], &[0, 0, 0])
            .unwrap();

        assert_eq!(
            plan.segments(),
            &[
                Segment::Hold { embedding: 0, frames: 3 },
                Segment::Transition { from: 0, to: 1, frames: 4 },
                Segment::Hold { embedding: 1, frames: 3 },
            ]
        );
        let hold = plan.frame_info(1).unwrap();
        assert_eq!(hold.title, "raw");
        assert_eq!(hold.t, 0.0);
    }

    #[test]
    fn test_plan_limits_cover_all_frames() {
        let animator = TransitionAnimator::new(small_config()).unwrap();
        let plan = animator.plan(&embeddings(), &[0, 1, 0]).unwrap();
        for frame in plan.coordinates() {
            assert!(frame.iter().all(|&p| plan.limits().contains(p)));
        }
    }

    #[test]
    fn test_plan_errors() {
        let animator = TransitionAnimator::new(small_config()).unwrap();

        let all = embeddings();
        assert!(matches!(
            animator.plan(&all[..1], &[0, 1, 0]),
            Err(MorphError::InsufficientData(_))
        ));

        let mut mismatched = embeddings();
        mismatched.push(Embedding::new("extra", vec![[0.0, 0.0]]));
        match animator.plan(&mismatched, &[0, 1, 0]) {
            Err(MorphError::ShapeMismatch { name, expected, actual }) => {
                assert_eq!(name, "extra");
                assert_eq!(expected, 3);
                assert_eq!(actual, 1);
            }
            other => panic!("expected ShapeMismatch, got {:?}", other.map(|p| p.frame_count())),
        }

        assert!(matches!(
            animator.plan(&embeddings(), &[0, 1]),
            Err(MorphError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_parallel_render_preserves_order() {
        let sequential = TransitionAnimator::new(small_config()).unwrap();
        let parallel = TransitionAnimator::new(small_config().with_parallel(true)).unwrap();

        let plan = sequential.plan(&embeddings(), &[0, 1, 2]).unwrap();
        let a = sequential.render_frames(&plan).unwrap();
        let b = parallel.render_frames(&plan).unwrap();
        assert_eq!(a.len(), 8);
        assert!(a == b);
    }

    #[test]
    fn test_progress_skips_failed_frames() {
        let animator = TransitionAnimator::new(small_config()).unwrap();
        let mut plan = animator.plan(&embeddings(), &[0, 1, 0]).unwrap();
        plan.labels.pop();

        let mut seen = Vec::new();
        let result = animator.encode_plan(&plan, &mut |done, total| seen.push((done, total)));
        assert!(matches!(result, Err(MorphError::ShapeMismatch { .. })));
        assert!(seen.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = small_config().with_frames_per_transition(1);
        assert!(matches!(
            TransitionAnimator::new(config),
            Err(MorphError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_progress_reports_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let animator = TransitionAnimator::new(small_config()).unwrap();
        let mut seen = Vec::new();
        let summary = animator
            .build_animation_with_progress(
                &embeddings(),
                &[0, 1, 0],
                dir.path().join("p.gif"),
                |done, total| seen.push((done, total)),
            )
            .unwrap();

        assert_eq!(summary.frame_count, 8);
        assert_eq!(seen.len(), 8);
        assert_eq!(seen.last(), Some(&(8, 8)));
    }
}
