//! Embedding types shared by every stage of the pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Class identifier attached to each point. Only used for coloring.
pub type ClassLabel = u32;

/// A 2-D point coordinate `[x, y]`.
pub type Point2 = [f64; 2];

/// One of the two layout axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis2 {
    X,
    Y,
}

impl Axis2 {
    pub const BOTH: [Axis2; 2] = [Axis2::X, Axis2::Y];

    /// Column index of this axis inside a `Point2`
    pub fn index(self) -> usize {
        match self {
            Axis2::X => 0,
            Axis2::Y => 1,
        }
    }
}

impl fmt::Display for Axis2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis2::X => write!(f, "x"),
            Axis2::Y => write!(f, "y"),
        }
    }
}

/// A named 2-D layout of N points, indexed by point position.
///
/// Point `i` of one embedding must refer to the same data point as point `i`
/// of every other embedding in the same animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    name: String,
    points: Vec<Point2>,
}

impl Embedding {
    /// Create a named embedding from point coordinates
    pub fn new(name: impl Into<String>, points: Vec<Point2>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Build an embedding from separate x and y columns.
    ///
    /// Extra values in the longer column are ignored.
    pub fn from_columns(name: impl Into<String>, xs: &[f64], ys: &[f64]) -> Self {
        let points = xs.iter().zip(ys).map(|(&x, &y)| [x, y]).collect();
        Self::new(name, points)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(min, max)` of one axis, or `None` for an empty embedding
    pub fn axis_range(&self, axis: Axis2) -> Option<(f64, f64)> {
        axis_range(&self.points, axis)
    }
}

/// An axis that had zero range during normalization.
///
/// Not an error: every value on that axis was mapped to
/// [`DEGENERATE_AXIS_VALUE`](crate::animation::normalize::DEGENERATE_AXIS_VALUE).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegenerateAxis {
    pub embedding: String,
    pub axis: Axis2,
    /// The single value every point shared on this axis
    pub value: f64,
}

/// An embedding whose coordinates were min-max rescaled into [0, 1] per axis.
///
/// Only [`normalize`](crate::animation::normalize::normalize) constructs these.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEmbedding {
    pub(crate) name: String,
    pub(crate) points: Vec<Point2>,
    pub(crate) degenerate: Vec<DegenerateAxis>,
}

impl NormalizedEmbedding {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axes that were constant in the source embedding
    pub fn degenerate_axes(&self) -> &[DegenerateAxis] {
        &self.degenerate
    }

    pub fn axis_range(&self, axis: Axis2) -> Option<(f64, f64)> {
        axis_range(&self.points, axis)
    }
}

pub(crate) fn axis_range(points: &[Point2], axis: Axis2) -> Option<(f64, f64)> {
    let i = axis.index();
    points.iter().fold(None, |acc, p| {
        let v = p[i];
        Some(match acc {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_columns() {
        let emb = Embedding::from_columns("pca", &[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert_eq!(emb.name(), "pca");
        assert_eq!(emb.len(), 3);
        assert_eq!(emb.points()[1], [2.0, 5.0]);
    }

    #[test]
    fn test_axis_range() {
        let emb = Embedding::new("raw", vec![[3.0, -1.0], [-2.0, 4.0], [0.5, 0.0]]);
        assert_eq!(emb.axis_range(Axis2::X), Some((-2.0, 3.0)));
        assert_eq!(emb.axis_range(Axis2::Y), Some((-1.0, 4.0)));

        let empty = Embedding::new("empty", vec![]);
        assert!(empty.is_empty());
        assert_eq!(empty.axis_range(Axis2::X), None);
    }
}
