//! Per-axis min-max normalization of embeddings

use super::embedding::{Axis2, DegenerateAxis, Embedding, NormalizedEmbedding};
use crate::error::{MorphError, Result};
use tracing::warn;

/// Value assigned to every point on an axis with zero range
pub const DEGENERATE_AXIS_VALUE: f64 = 0.5;

/// Rescale each axis of `embedding` independently into [0, 1].
///
/// The minimum of an axis maps to 0 and its maximum to 1. A constant axis
/// maps every value to [`DEGENERATE_AXIS_VALUE`] and is recorded on the
/// result instead of failing.
pub fn normalize(embedding: &Embedding) -> Result<NormalizedEmbedding> {
    if embedding.is_empty() {
        return Err(MorphError::InsufficientData(format!(
            "embedding '{}' has no points",
            embedding.name()
        )));
    }

    if let Some(i) = embedding
        .points()
        .iter()
        .position(|p| !p[0].is_finite() || !p[1].is_finite())
    {
        return Err(MorphError::InvalidInput(format!(
            "embedding '{}' has a non-finite coordinate at point {}",
            embedding.name(),
            i
        )));
    }

    let mut points = embedding.points().to_vec();
    let mut degenerate = Vec::new();

    for axis in Axis2::BOTH {
        // Non-empty, checked above
        let (min, max) = embedding.axis_range(axis).unwrap_or((0.0, 0.0));
        let range = max - min;
        let i = axis.index();

        if range == 0.0 {
            warn!(
                embedding = %embedding.name(),
                axis = %axis,
                value = min,
                "Degenerate axis, mapping to constant"
            );
            points.iter_mut().for_each(|p| p[i] = DEGENERATE_AXIS_VALUE);
            degenerate.push(DegenerateAxis {
                embedding: embedding.name().to_string(),
                axis,
                value: min,
            });
        } else if range.is_finite() {
            points
                .iter_mut()
                .for_each(|p| p[i] = ((p[i] - min) / range).clamp(0.0, 1.0));
        } else {
            // Spread exceeds f64::MAX; halving is exact at this magnitude
            let half_range = max / 2.0 - min / 2.0;
            points
                .iter_mut()
                .for_each(|p| p[i] = ((p[i] / 2.0 - min / 2.0) / half_range).clamp(0.0, 1.0));
        }
    }

    Ok(NormalizedEmbedding {
        name: embedding.name().to_string(),
        points,
        degenerate,
    })
}

/// Normalize every embedding of a sequence, keeping order
pub fn normalize_all(embeddings: &[Embedding]) -> Result<Vec<NormalizedEmbedding>> {
    embeddings.iter().map(normalize).collect()
}
