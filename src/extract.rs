//! Per-file, per-column trimmed-mean extraction.

use crate::discovery::IMAGE_DIR;
use crate::error::ReportError;
use crate::metrics;
use crate::model::ReportConfig;
use crate::plot;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// File name -> metric name -> reported mean.
pub type FileMeans = BTreeMap<String, BTreeMap<String, f64>>;

/// Read the named columns of a headered CSV file as numeric samples.
pub fn load_columns(path: &Path, columns: &[&str]) -> Result<BTreeMap<String, Vec<f64>>> {
    let file = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("read header of {}", path.display()))?
        .clone();
    let mut indices = Vec::with_capacity(columns.len());
    for column in columns {
        let idx = headers
            .iter()
            .position(|h| h == *column)
            .ok_or_else(|| ReportError::MissingColumn {
                file: file.clone(),
                column: column.to_string(),
            })?;
        indices.push((*column, idx));
    }

    let mut samples: BTreeMap<String, Vec<f64>> = columns
        .iter()
        .map(|c| (c.to_string(), Vec::new()))
        .collect();
    for record in reader.records() {
        let record = record.with_context(|| format!("read record of {}", path.display()))?;
        for (column, idx) in &indices {
            let raw = record.get(*idx).unwrap_or_default();
            let value: f64 = raw.parse().map_err(|_| ReportError::InvalidSample {
                file: file.clone(),
                column: column.to_string(),
                value: raw.to_string(),
            })?;
            if let Some(values) = samples.get_mut(*column) {
                values.push(value);
            }
        }
    }
    Ok(samples)
}

/// Trimmed means of every configured column for each file of `folder`.
///
/// Columns flagged with `histogram` also get `jpg/<column>_<stem>.jpg`
/// rendered from their filtered samples.
pub fn extract_means(folder: &Path, files: &[String], cfg: &ReportConfig) -> Result<FileMeans> {
    let columns: Vec<&str> = cfg.columns.iter().map(|c| c.name.as_str()).collect();
    let mut means = FileMeans::new();

    for file_name in files {
        info!("Processing : {file_name}");
        let samples = load_columns(&folder.join(file_name), &columns)?;
        let mut file_mean = BTreeMap::new();

        for spec in &cfg.columns {
            info!("Processing : {file_name}, Col : {}", spec.name);
            let values = samples.get(&spec.name).map(Vec::as_slice).unwrap_or(&[]);
            let trimmed = metrics::trimmed_mean(values).ok_or_else(|| ReportError::EmptyColumn {
                file: file_name.clone(),
                column: spec.name.clone(),
            })?;
            debug!(
                column = %spec.name,
                mean = trimmed.fit.mean,
                std = trimmed.fit.std,
                kept = trimmed.filtered.len(),
                of = values.len(),
                "one-sigma filter"
            );
            file_mean.insert(spec.name.clone(), trimmed.value(cfg.mean_policy));

            if spec.histogram {
                let stem = file_name.split('.').next().unwrap_or(file_name);
                let target = folder
                    .join(IMAGE_DIR)
                    .join(format!("{}_{}.jpg", spec.name, stem));
                plot::render_histogram(&trimmed.filtered, &spec.name, &target)?;
            }
        }
        means.insert(file_name.clone(), file_mean);
    }
    Ok(means)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnSpec, MeanPolicy};
    use std::fs;

    const SERIAL: &str = "DIM_10_LB_0_HB_5_MPI_00_OMP_.csv";

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn loads_columns_by_header_name() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            SERIAL,
            "mpi, kosaraju_time, comm_time, elapsed\n0, 1.0, 0, 1.0\n0, 3.0, 0, 3.0\n",
        );
        let cols = load_columns(&dir.path().join(SERIAL), &["elapsed", "comm_time"]).unwrap();
        assert_eq!(cols["elapsed"], vec![1.0, 3.0]);
        assert_eq!(cols["comm_time"], vec![0.0, 0.0]);
    }

    #[test]
    fn missing_column_and_bad_sample_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.csv", "elapsed\n1.0\n");
        let err = load_columns(&dir.path().join("a.csv"), &["comm_time"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::MissingColumn { .. })
        ));

        write(dir.path(), "b.csv", "elapsed\n1.0\nfast\n");
        let err = load_columns(&dir.path().join("b.csv"), &["elapsed"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::InvalidSample { .. })
        ));
    }

    #[test]
    fn means_cover_every_file_and_column() {
        let dir = tempfile::tempdir().unwrap();
        let parallel = "DIM_10_LB_0_HB_5_MPI_02_OMP_1.csv";
        write(
            dir.path(),
            SERIAL,
            "kosaraju_time,comm_time,elapsed\n2,0,10\n2,0,10\n",
        );
        write(
            dir.path(),
            parallel,
            "kosaraju_time,comm_time,elapsed\n1,1,4\n1,1,4\n1,1,4\n1,1,16\n",
        );
        let files = vec![SERIAL.to_string(), parallel.to_string()];

        let cfg = ReportConfig::default();
        let means = extract_means(dir.path(), &files, &cfg).unwrap();
        assert_eq!(means.len(), 2);
        assert_eq!(means[SERIAL]["elapsed"], 10.0);
        assert_eq!(means[parallel].len(), 3);
        assert_eq!(means[parallel]["elapsed"], 7.0);

        let trimmed = ReportConfig {
            mean_policy: MeanPolicy::Trimmed,
            ..ReportConfig::default()
        };
        let means = extract_means(dir.path(), &files, &trimmed).unwrap();
        assert_eq!(means[parallel]["elapsed"], 4.0);
    }

    #[test]
    fn two_sample_column_reports_raw_mean() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), SERIAL, "elapsed\n3.376447\n0.186628\n");
        let cfg = ReportConfig {
            columns: vec![ColumnSpec::new("elapsed", false, true)],
            ..ReportConfig::default()
        };
        let means = extract_means(dir.path(), &[SERIAL.to_string()], &cfg).unwrap();
        assert!((means[SERIAL]["elapsed"] - 1.7815375).abs() < 1e-12);
    }

    #[test]
    fn histogram_flag_renders_image_per_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), SERIAL, "elapsed\n1.0\n2.0\n2.5\n3.0\n2.2\n");
        let cfg = ReportConfig::default();
        let grammar = crate::naming::FileGrammar::new(&cfg).unwrap();
        let files = crate::discovery::discover_measurement_files(dir.path(), &grammar).unwrap();

        let cfg = ReportConfig {
            columns: vec![ColumnSpec::new("elapsed", true, true)],
            ..cfg
        };
        extract_means(dir.path(), &files, &cfg).unwrap();
        assert!(dir
            .path()
            .join(IMAGE_DIR)
            .join("elapsed_DIM_10_LB_0_HB_5_MPI_00_OMP_.jpg")
            .is_file());
    }

    #[test]
    fn header_only_file_has_empty_columns() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), SERIAL, "elapsed\n");
        let cfg = ReportConfig {
            columns: vec![ColumnSpec::new("elapsed", false, true)],
            ..ReportConfig::default()
        };
        let err = extract_means(dir.path(), &[SERIAL.to_string()], &cfg).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::EmptyColumn { .. })
        ));
    }
}
