//! Built-in 2-D projections of a dataset
//!
//! Two cheap projections for the CLI: a pair of raw feature axes, and PCA.
//! PCA extracts the top eigenvectors of the covariance matrix with seeded
//! power iteration and deflation. Each component's sign is fixed so its
//! largest-magnitude loading is positive, which keeps runs reproducible.

use super::dataset::Dataset;
use crate::animation::Embedding;
use crate::error::{MorphError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// PCA configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcaConfig {
    /// Scale features to unit variance after centering
    pub scale: bool,
    /// Seed for the power-iteration start vectors
    pub random_state: u64,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            scale: true,
            random_state: 42,
            max_iter: 300,
            tol: 1e-10,
        }
    }
}

/// 2-D PCA projection with its explained variance
#[derive(Debug, Clone)]
pub struct PcaResult {
    pub points: Vec<[f64; 2]>,
    /// Fraction of total variance per component
    pub explained_variance_ratio: Vec<f64>,
}

/// Project `data` (n_samples x n_features) onto its two leading principal components.
pub fn pca(data: &Array2<f64>, config: &PcaConfig) -> Result<PcaResult> {
    let (n, d) = data.dim();
    if n < 2 {
        return Err(MorphError::InsufficientData(
            "PCA requires at least 2 samples".to_string(),
        ));
    }
    if d < 1 {
        return Err(MorphError::InsufficientData(
            "PCA requires at least 1 feature".to_string(),
        ));
    }

    let mean = data
        .mean_axis(Axis(0))
        .ok_or_else(|| MorphError::InsufficientData("empty data".to_string()))?;
    let mut centered = data - &mean;
    if config.scale {
        let std = centered.std_axis(Axis(0), 1.0).mapv(|s| s.max(1e-12));
        centered /= &std;
    }

    let cov = centered.t().dot(&centered) / (n as f64 - 1.0);
    let total_variance = cov.diag().sum().max(1e-12);

    let k = d.min(2);
    let (eigenvalues, components) = power_iteration(&cov, k, config);

    let mut projected = [Array1::<f64>::zeros(n), Array1::<f64>::zeros(n)];
    for (c, component) in components.iter().enumerate() {
        projected[c] = centered.dot(component);
    }

    let points = (0..n).map(|i| [projected[0][i], projected[1][i]]).collect();
    let explained_variance_ratio = eigenvalues
        .iter()
        .map(|&ev| (ev / total_variance).max(0.0))
        .collect();

    Ok(PcaResult {
        points,
        explained_variance_ratio,
    })
}

fn power_iteration(cov: &Array2<f64>, k: usize, config: &PcaConfig) -> (Vec<f64>, Vec<Array1<f64>>) {
    let d = cov.nrows();
    let mut rng = ChaCha8Rng::seed_from_u64(config.random_state);
    let mut work = cov.clone();
    let mut eigenvalues = Vec::with_capacity(k);
    let mut components = Vec::with_capacity(k);

    for _ in 0..k {
        let mut v: Array1<f64> = (0..d).map(|_| rng.gen_range(-1.0..1.0)).collect();
        v /= v.dot(&v).sqrt().max(1e-12);
        let mut eigenvalue = 0.0;

        for _ in 0..config.max_iter {
            let w = work.dot(&v);
            eigenvalue = v.dot(&w);
            let norm = w.dot(&w).sqrt();
            if norm < 1e-12 {
                break;
            }
            let next = w / norm;
            let diff = (&next - &v).mapv(|x| x * x).sum().sqrt();
            v = next;
            if diff < config.tol {
                break;
            }
        }

        // Deterministic sign
        let pivot = v
            .iter()
            .enumerate()
            .fold((0, 0.0f64), |best, (i, &x)| if x.abs() > best.1 { (i, x.abs()) } else { best })
            .0;
        if v[pivot] < 0.0 {
            v.mapv_inplace(|x| -x);
        }

        let eigenvalue = eigenvalue.max(0.0);
        for i in 0..d {
            for j in 0..d {
                work[[i, j]] -= eigenvalue * v[i] * v[j];
            }
        }
        eigenvalues.push(eigenvalue);
        components.push(v);
    }

    (eigenvalues, components)
}

/// How to turn a dataset into a 2-D embedding
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Two raw feature columns, by index
    Axes { x: usize, y: usize },
    /// Leading two principal components
    Pca,
}

impl FromStr for Projection {
    type Err = MorphError;

    /// `pca`, or `raw:<x>,<y>` / `axes:<x>,<y>` with feature indices
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("pca") {
            return Ok(Projection::Pca);
        }
        let invalid = || MorphError::invalid_parameter("projection", s, "expected 'pca' or 'raw:<x>,<y>'");
        let axes = s
            .strip_prefix("raw:")
            .or_else(|| s.strip_prefix("axes:"))
            .ok_or_else(invalid)?;
        let (x, y) = axes.split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse().map_err(|_| invalid())?;
        let y = y.trim().parse().map_err(|_| invalid())?;
        Ok(Projection::Axes { x, y })
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Axes { x, y } => write!(f, "raw:{},{}", x, y),
            Projection::Pca => write!(f, "pca"),
        }
    }
}

impl Projection {
    /// Project `dataset`. Raw projections are named after their feature columns.
    pub fn project(&self, dataset: &Dataset) -> Result<Embedding> {
        match *self {
            Projection::Axes { x, y } => {
                let n_features = dataset.n_features();
                if let Some(&bad) = [x, y].iter().find(|&&i| i >= n_features) {
                    return Err(MorphError::invalid_parameter(
                        "projection",
                        self,
                        &format!("feature index {} out of range ({} features)", bad, n_features),
                    ));
                }
                let features = dataset.features();
                let points = features
                    .rows()
                    .into_iter()
                    .map(|row| [row[x], row[y]])
                    .collect();
                let names = dataset.feature_names();
                Ok(Embedding::new(format!("{} / {}", names[x], names[y]), points))
            }
            Projection::Pca => {
                let result = pca(dataset.features(), &PcaConfig::default())?;
                Ok(Embedding::new("PCA", result.points))
            }
        }
    }
}
