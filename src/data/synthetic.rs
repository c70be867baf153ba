//! Synthetic labeled clusters for demos and benchmarks

use super::dataset::Dataset;
use crate::animation::ClassLabel;
use crate::error::{MorphError, Result};
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generate `n_per_class` points around each center.
///
/// Offsets are the sum of three uniform draws in `[-spread, spread]`, a cheap
/// bell-shaped noise. Class `i` is labeled `i` and named `class_i`.
pub fn make_blobs(
    n_per_class: usize,
    centers: &[Vec<f64>],
    spread: f64,
    seed: u64,
) -> Result<Dataset> {
    let d = centers.first().map(Vec::len).unwrap_or(0);
    if n_per_class == 0 || d == 0 {
        return Err(MorphError::InsufficientData(
            "need at least one point per class and one feature".to_string(),
        ));
    }
    if let Some(bad) = centers.iter().find(|c| c.len() != d) {
        return Err(MorphError::ShapeMismatch {
            name: "centers".to_string(),
            expected: d,
            actual: bad.len(),
        });
    }
    if !(spread.is_finite() && spread >= 0.0) {
        return Err(MorphError::invalid_parameter("spread", spread, "must be non-negative"));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = n_per_class * centers.len();
    let mut features = Array2::<f64>::zeros((n, d));
    let mut labels = Vec::with_capacity(n);

    for (class, center) in centers.iter().enumerate() {
        for i in 0..n_per_class {
            let row = class * n_per_class + i;
            for (j, &c) in center.iter().enumerate() {
                let noise: f64 = if spread > 0.0 {
                    (0..3).map(|_| rng.gen_range(-spread..=spread)).sum()
                } else {
                    0.0
                };
                features[[row, j]] = c + noise;
            }
            labels.push(class as ClassLabel);
        }
    }

    let feature_names = (0..d).map(|j| format!("x{}", j)).collect();
    let label_names = (0..centers.len()).map(|i| format!("class_{}", i)).collect();
    Dataset::new(feature_names, features, labels, label_names)
}
