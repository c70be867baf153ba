//! Linear interpolation between two normalized embeddings
//!
//! A [`Transition`] moves every point along a straight line from its position
//! in the source layout to its position in the target layout. Frames are
//! produced lazily by [`TransitionFrames`], which can be cloned to restart and
//! indexed directly for out-of-order (parallel) rendering.

use super::embedding::{NormalizedEmbedding, Point2};
use crate::error::{MorphError, Result};

/// Minimum number of frames a transition can have (both endpoints)
pub const MIN_TRANSITION_FRAMES: usize = 2;

/// Interpolate `a` at `t = 0` to `b` at `t = 1`, never leaving `[min(a,b), max(a,b)]`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let v = (1.0 - t) * a + t * b;
    v.clamp(a.min(b), a.max(b))
}

/// An ordered pair of normalized embeddings plus a frame count
#[derive(Debug, Clone, Copy)]
pub struct Transition<'a> {
    source: &'a NormalizedEmbedding,
    target: &'a NormalizedEmbedding,
    frame_count: usize,
}

impl<'a> Transition<'a> {
    /// Validate the pair and frame count.
    ///
    /// Both embeddings must have the same number of points, and at least
    /// [`MIN_TRANSITION_FRAMES`] frames are required.
    pub fn new(
        source: &'a NormalizedEmbedding,
        target: &'a NormalizedEmbedding,
        frame_count: usize,
    ) -> Result<Self> {
        if frame_count < MIN_TRANSITION_FRAMES {
            return Err(MorphError::InsufficientData(format!(
                "a transition needs at least {} frames, got {}",
                MIN_TRANSITION_FRAMES, frame_count
            )));
        }
        if source.len() != target.len() {
            return Err(MorphError::ShapeMismatch {
                name: target.name().to_string(),
                expected: source.len(),
                actual: target.len(),
            });
        }
        Ok(Self {
            source,
            target,
            frame_count,
        })
    }

    pub fn source(&self) -> &'a NormalizedEmbedding {
        self.source
    }

    pub fn target(&self) -> &'a NormalizedEmbedding {
        self.target
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Human-readable label, e.g. `"pca -> tsne"`
    pub fn title(&self) -> String {
        format!("{} -> {}", self.source.name(), self.target.name())
    }

    /// Interpolation parameter of frame `k`
    pub fn t_at(&self, k: usize) -> f64 {
        k as f64 / (self.frame_count - 1) as f64
    }

    /// Coordinates of frame `k`, or `None` past the last frame
    pub fn frame_at(&self, k: usize) -> Option<Vec<Point2>> {
        if k >= self.frame_count {
            return None;
        }
        if k == 0 {
            return Some(self.source.points().to_vec());
        }
        if k == self.frame_count - 1 {
            return Some(self.target.points().to_vec());
        }

        let t = self.t_at(k);
        let points = self
            .source
            .points()
            .iter()
            .zip(self.target.points())
            .map(|(a, b)| [lerp(a[0], b[0], t), lerp(a[1], b[1], t)])
            .collect();
        Some(points)
    }

    /// Lazy iterator over every frame, from source to target
    pub fn frames(&self) -> TransitionFrames<'a> {
        TransitionFrames {
            transition: *self,
            next: 0,
        }
    }
}

/// Lazy, finite, restartable sequence of interpolated coordinate sets
#[derive(Debug, Clone)]
pub struct TransitionFrames<'a> {
    transition: Transition<'a>,
    next: usize,
}

impl<'a> TransitionFrames<'a> {
    pub fn transition(&self) -> &Transition<'a> {
        &self.transition
    }

    /// Random access into the sequence, independent of iteration state
    pub fn frame_at(&self, k: usize) -> Option<Vec<Point2>> {
        self.transition.frame_at(k)
    }
}

impl Iterator for TransitionFrames<'_> {
    type Item = Vec<Point2>;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.transition.frame_at(self.next)?;
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.transition.frame_count.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TransitionFrames<'_> {}

/// Produce `frame_count` coordinate sets moving linearly from `a` to `b`.
pub fn interpolate<'a>(
    a: &'a NormalizedEmbedding,
    b: &'a NormalizedEmbedding,
    frame_count: usize,
) -> Result<TransitionFrames<'a>> {
    Ok(Transition::new(a, b, frame_count)?.frames())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::embedding::Embedding;
    use crate::animation::normalize::normalize;

    fn pair() -> (NormalizedEmbedding, NormalizedEmbedding) {
        let a = normalize(&Embedding::new(
            "raw",
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.3, 0.7]],
        ))
        .unwrap();
        let b = normalize(&Embedding::new(
            "pca",
            vec![[1.0, 1.0], [0.0, 1.0], [1.0, 0.0], [0.9, 0.1]],
        ))
        .unwrap();
        (a, b)
    }

    #[test]
    fn test_endpoints_exact() {
        let (a, b) = pair();
        for k in [2, 3, 7, 50] {
            let frames: Vec<_> = interpolate(&a, &b, k).unwrap().collect();
            assert_eq!(frames.len(), k);
            assert_eq!(frames[0].as_slice(), a.points());
            assert_eq!(frames[k - 1].as_slice(), b.points());
        }
    }

    #[test]
    fn test_midpoint() {
        let (a, b) = pair();
        let frames: Vec<_> = interpolate(&a, &b, 5).unwrap().collect();
        assert_eq!(frames[2][0], [0.5, 0.5]);
        assert_eq!(frames[2][1], [0.5, 0.5]);
    }

    #[test]
    fn test_no_overshoot() {
        let (a, b) = pair();
        for frame in interpolate(&a, &b, 17).unwrap() {
            for (i, p) in frame.iter().enumerate() {
                for axis in 0..2 {
                    let lo = a.points()[i][axis].min(b.points()[i][axis]);
                    let hi = a.points()[i][axis].max(b.points()[i][axis]);
                    assert!(p[axis] >= lo && p[axis] <= hi);
                }
            }
        }
    }

    #[test]
    fn test_monotonic_per_point() {
        let (a, b) = pair();
        let frames: Vec<_> = interpolate(&a, &b, 11).unwrap().collect();
        for i in 0..a.len() {
            for axis in 0..2 {
                let increasing = b.points()[i][axis] >= a.points()[i][axis];
                for w in frames.windows(2) {
                    if increasing {
                        assert!(w[1][i][axis] >= w[0][i][axis]);
                    } else {
                        assert!(w[1][i][axis] <= w[0][i][axis]);
                    }
                }
            }
        }
    }

    #[test]
    fn test_restartable() {
        let (a, b) = pair();
        let frames = interpolate(&a, &b, 9).unwrap();
        let first: Vec<_> = frames.clone().collect();
        let second: Vec<_> = frames.collect();
        assert_eq!(first, second);

        let again: Vec<_> = interpolate(&a, &b, 9).unwrap().collect();
        assert_eq!(first, again);
    }

    #[test]
    fn test_exact_size_and_random_access() {
        let (a, b) = pair();
        let mut frames = interpolate(&a, &b, 6).unwrap();
        assert_eq!(frames.len(), 6);
        let first = frames.next().unwrap();
        assert_eq!(frames.len(), 5);
        assert_eq!(frames.frame_at(0).unwrap(), first);
        assert_eq!(frames.frame_at(3), frames.clone().nth(2));
        assert!(frames.frame_at(6).is_none());
    }

    #[test]
    fn test_too_few_frames() {
        let (a, b) = pair();
        assert!(matches!(
            interpolate(&a, &b, 1),
            Err(MorphError::InsufficientData(_))
        ));
        assert!(matches!(
            interpolate(&a, &b, 0),
            Err(MorphError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let (a, _) = pair();
        let short = normalize(&Embedding::new("short", vec![[0.0, 0.0], [1.0, 1.0]])).unwrap();
        match interpolate(&a, &short, 4) {
            Err(MorphError::ShapeMismatch { expected, actual, .. }) => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 2);
            }
            other => panic!("expected ShapeMismatch, got {:?}", other.map(|f| f.len())),
        }
    }

    #[test]
    fn test_title() {
        let (a, b) = pair();
        let transition = Transition::new(&a, &b, 3).unwrap();
        assert_eq!(transition.title(), "raw -> pca");
        assert_eq!(transition.t_at(1), 0.5);
    }
}
