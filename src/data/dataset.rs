//! Labeled datasets and CSV loading

use crate::animation::{ClassLabel, Embedding};
use crate::error::{MorphError, Result};
use ndarray::Array2;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;

/// N points with D features each and one class label per point
#[derive(Debug, Clone)]
pub struct Dataset {
    feature_names: Vec<String>,
    features: Array2<f64>,
    labels: Vec<ClassLabel>,
    label_names: Vec<String>,
}

impl Dataset {
    /// `label_names[id]` is the display name of label `id`.
    pub fn new(
        feature_names: Vec<String>,
        features: Array2<f64>,
        labels: Vec<ClassLabel>,
        label_names: Vec<String>,
    ) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(MorphError::ShapeMismatch {
                name: "labels".to_string(),
                expected: features.nrows(),
                actual: labels.len(),
            });
        }
        if features.ncols() != feature_names.len() {
            return Err(MorphError::ShapeMismatch {
                name: "feature_names".to_string(),
                expected: features.ncols(),
                actual: feature_names.len(),
            });
        }
        Ok(Self {
            feature_names,
            features,
            labels,
            label_names,
        })
    }

    /// Build from a DataFrame: every numeric column except `label_column` is a feature.
    pub fn from_dataframe(df: &DataFrame, label_column: &str) -> Result<Self> {
        let (labels, label_names) = encode_labels(df, label_column)?;

        let feature_names: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|c| c.name().as_str() != label_column)
            .filter(|c| c.dtype().is_float() || c.dtype().is_integer())
            .map(|c| c.name().to_string())
            .collect();

        if feature_names.is_empty() {
            return Err(MorphError::DataError(
                "dataset has no numeric feature columns".to_string(),
            ));
        }

        let n = df.height();
        let mut features = Array2::<f64>::zeros((n, feature_names.len()));
        for (j, name) in feature_names.iter().enumerate() {
            let values = numeric_column(df, name)?;
            features.column_mut(j).assign(&ndarray::Array1::from(values));
        }

        Self::new(feature_names, features, labels, label_names)
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn labels(&self) -> &[ClassLabel] {
        &self.labels
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    pub fn label_name(&self, label: ClassLabel) -> Option<&str> {
        self.label_names.get(label as usize).map(String::as_str)
    }

    /// Number of points per label, in label order
    pub fn class_counts(&self) -> Vec<(ClassLabel, usize)> {
        let mut counts = vec![0usize; self.label_names.len()];
        for &label in &self.labels {
            if let Some(c) = counts.get_mut(label as usize) {
                *c += 1;
            }
        }
        counts
            .into_iter()
            .enumerate()
            .map(|(i, c)| (i as ClassLabel, c))
            .collect()
    }
}

/// Read a CSV file with a header row
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Load a labeled dataset from CSV
pub fn load_dataset(path: impl AsRef<Path>, label_column: &str) -> Result<Dataset> {
    let df = load_csv(path)?;
    Dataset::from_dataframe(&df, label_column)
}

/// Load a precomputed embedding from CSV.
///
/// Uses the named `columns` when given, otherwise the first two numeric
/// columns. The embedding is named after the file stem unless `name` is set.
pub fn load_embedding(
    path: impl AsRef<Path>,
    name: Option<&str>,
    columns: Option<(&str, &str)>,
) -> Result<Embedding> {
    let path = path.as_ref();
    let df = load_csv(path)?;

    let (x_col, y_col) = match columns {
        Some((x, y)) => (x.to_string(), y.to_string()),
        None => {
            let numeric: Vec<String> = df
                .get_columns()
                .iter()
                .filter(|c| c.dtype().is_float() || c.dtype().is_integer())
                .take(2)
                .map(|c| c.name().to_string())
                .collect();
            match numeric.as_slice() {
                [x, y] => (x.clone(), y.clone()),
                _ => {
                    return Err(MorphError::DataError(format!(
                        "{} needs at least two numeric columns",
                        path.display()
                    )))
                }
            }
        }
    };

    let xs = numeric_column(&df, &x_col)?;
    let ys = numeric_column(&df, &y_col)?;
    let name = match name {
        Some(n) => n.to_string(),
        None => path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("embedding")
            .to_string(),
    };
    Ok(Embedding::from_columns(name, &xs, &ys))
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| MorphError::DataError(format!("column '{}' not found", name)))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    series
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                MorphError::DataError(format!("column '{}' is missing a value at row {}", name, row))
            })
        })
        .collect()
}

/// Map label values to ids in order of first appearance
fn encode_labels(df: &DataFrame, label_column: &str) -> Result<(Vec<ClassLabel>, Vec<String>)> {
    let column = df
        .column(label_column)
        .map_err(|_| MorphError::DataError(format!("label column '{}' not found", label_column)))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;

    let mut ids: HashMap<String, ClassLabel> = HashMap::new();
    let mut names = Vec::new();
    let mut labels = Vec::with_capacity(series.len());
    for (row, value) in series.str()?.into_iter().enumerate() {
        let value = value.ok_or_else(|| {
            MorphError::DataError(format!("label column is missing a value at row {}", row))
        })?;
        let id = *ids.entry(value.to_string()).or_insert_with(|| {
            names.push(value.to_string());
            (names.len() - 1) as ClassLabel
        });
        labels.push(id);
    }
    Ok((labels, names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "sepal,petal,width,species").unwrap();
        writeln!(file, "5.1,1.4,0.2,setosa").unwrap();
        writeln!(file, "7.0,4.7,1.4,versicolor").unwrap();
        writeln!(file, "4.9,1.3,0.2,setosa").unwrap();
        writeln!(file, "6.3,6.0,2.5,virginica").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_dataset_validation() {
        let features = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(Dataset::new(
            vec!["a".into(), "b".into()],
            features.clone(),
            vec![0],
            vec!["x".into()]
        )
        .is_err());
        assert!(Dataset::new(vec!["a".into()], features, vec![0, 0], vec!["x".into()]).is_err());
    }

    #[test]
    fn test_load_dataset() {
        let file = create_test_csv();
        let dataset = load_dataset(file.path(), "species").unwrap();

        assert_eq!(dataset.n_samples(), 4);
        assert_eq!(dataset.n_features(), 3);
        assert_eq!(dataset.feature_names(), &["sepal", "petal", "width"]);
        assert_eq!(dataset.labels(), &[0, 1, 0, 2]);
        assert_eq!(dataset.label_name(2), Some("virginica"));
        assert_eq!(dataset.features()[[1, 1]], 4.7);
        assert_eq!(dataset.class_counts(), vec![(0, 2), (1, 1), (2, 1)]);
    }

    #[test]
    fn test_load_dataset_missing_label_column() {
        let file = create_test_csv();
        assert!(matches!(
            load_dataset(file.path(), "class"),
            Err(MorphError::DataError(_))
        ));
    }

    #[test]
    fn test_load_embedding_first_numeric_columns() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "id,x,y").unwrap();
        writeln!(file, "a,0.5,1.5").unwrap();
        writeln!(file, "b,-2.0,3.0").unwrap();
        file.flush().unwrap();

        let emb = load_embedding(file.path(), Some("tsne"), None).unwrap();
        assert_eq!(emb.name(), "tsne");
        assert_eq!(emb.points(), &[[0.5, 1.5], [-2.0, 3.0]]);

        let emb = load_embedding(file.path(), None, Some(("y", "x"))).unwrap();
        assert_eq!(emb.points()[1], [3.0, -2.0]);
    }

    #[test]
    fn test_load_embedding_needs_two_columns() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "id,x").unwrap();
        writeln!(file, "a,1.0").unwrap();
        file.flush().unwrap();
        assert!(load_embedding(file.path(), None, None).is_err());
    }
}
