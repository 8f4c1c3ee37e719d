//! Per-folder processing: rows, table and plot.

use super::controller::ReportOptions;
use crate::discovery;
use crate::error::ReportError;
use crate::extract::{self, FileMeans};
use crate::metrics;
use crate::model::{MetricValue, ReportConfig, SummaryRow};
use crate::naming::{self, FileGrammar};
use crate::plot::{self, PlotOptions};
use crate::table::{self, TableOptions};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of processing one configuration folder.
#[derive(Debug)]
pub(crate) struct ProcessedFolder {
    pub folder: PathBuf,
    pub rows: Vec<SummaryRow>,
    pub table_path: PathBuf,
    pub plot_path: Option<PathBuf>,
}

/// One summary row per file of `means`, in file name order.
///
/// The serial baseline is located before any row is built, so its position
/// in the folder listing does not matter.
pub(crate) fn build_rows(
    folder: &Path,
    means: &FileMeans,
    grammar: &FileGrammar,
    cfg: &ReportConfig,
) -> Result<Vec<SummaryRow>> {
    let baseline = find_baseline(folder, means, grammar, cfg)?;

    let mut rows = Vec::with_capacity(means.len());
    for (file_name, file_means) in means {
        let parsed = grammar.parse_file(file_name)?;
        let mut metrics_out = Vec::with_capacity(cfg.columns.len());

        for spec in &cfg.columns {
            let mean = *file_means
                .get(&spec.name)
                .ok_or_else(|| ReportError::MissingColumn {
                    file: file_name.clone(),
                    column: spec.name.clone(),
                })?;
            let scaling = if spec.compute_speedup {
                let serial = baseline
                    .and_then(|b| b.get(&spec.name))
                    .copied()
                    .ok_or_else(|| ReportError::MissingBaseline {
                        folder: folder.to_path_buf(),
                        marker: grammar.serial_marker().to_string(),
                    })?;
                Some(
                    metrics::compute_speedup(serial, mean, parsed.processes)
                        .with_context(|| format!("speedup of {file_name}"))?,
                )
            } else {
                None
            };
            metrics_out.push(MetricValue {
                column: spec.name.clone(),
                mean,
                scaling,
            });
        }

        let row = SummaryRow {
            file_name: file_name.clone(),
            kind: parsed.kind,
            processes: parsed.processes,
            threads: parsed.threads,
            metrics: metrics_out,
        };
        debug!(file = %row.file_name, kind = row.kind.label(), "row built");
        rows.push(row);
    }
    Ok(rows)
}

/// The baseline file's means. Exactly one serial file must exist whenever
/// the folder has files and some column needs a speedup.
fn find_baseline<'a>(
    folder: &Path,
    means: &'a FileMeans,
    grammar: &FileGrammar,
    cfg: &ReportConfig,
) -> Result<Option<&'a BTreeMap<String, f64>>> {
    let mut serial = means.iter().filter(|(name, _)| grammar.is_serial(name));
    let first = serial.next();
    if let (Some((first, _)), Some((second, _))) = (first, serial.next()) {
        return Err(ReportError::DuplicateBaseline {
            folder: folder.to_path_buf(),
            first: first.clone(),
            second: second.clone(),
        }
        .into());
    }
    if first.is_none() && !means.is_empty() && cfg.speedup_columns().next().is_some() {
        return Err(ReportError::MissingBaseline {
            folder: folder.to_path_buf(),
            marker: grammar.serial_marker().to_string(),
        }
        .into());
    }
    Ok(first.map(|(_, m)| m))
}

/// Discover, extract, aggregate and persist one configuration folder.
///
/// `opt` is the optimization level of the enclosing root, if it has one.
pub(crate) fn process_folder(
    folder: &Path,
    opt: Option<&str>,
    grammar: &FileGrammar,
    cfg: &ReportConfig,
    opts: &ReportOptions,
) -> Result<ProcessedFolder> {
    let folder_name = folder
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    info!("Folder : {folder_name}");
    let parsed = grammar.parse_folder(folder_name)?;

    let files = discovery::discover_measurement_files(folder, grammar)?;
    info!("Found files : {files:?}");
    let means = extract::extract_means(folder, &files, cfg)?;
    let rows = build_rows(folder, &means, grammar, cfg)?;

    let (table_name, plot_name) = naming::output_names(&parsed, opt);
    let table_path = folder.join(table_name);
    let cells = rows.iter().map(SummaryRow::cells).collect();
    table::make_table(
        &cfg.table.header,
        cells,
        cfg.table.style,
        &TableOptions {
            print_table: opts.print_table,
            save: true,
            name: Some(table_path.as_path()),
        },
    )?;
    info!("Table written : {}", table_path.display());

    let plot_path = if opts.plot {
        let path = folder.join(plot_name);
        plot::plot_from_rows(
            &rows,
            cfg,
            &PlotOptions {
                save: true,
                name: Some(path.as_path()),
            },
        )
        .with_context(|| format!("plot {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    Ok(ProcessedFolder {
        folder: folder.to_path_buf(),
        rows,
        table_path,
        plot_path,
    })
}
