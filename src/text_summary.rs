//! Text summary builder for CLI output.
//!
//! This module formats human-readable lines for each processed folder.

use crate::model::RunKind;
use crate::orchestrator::ProcessedFolder;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build a text summary for one processed folder: a heading, then one line
/// per row with every metric mean and the scaling of flagged metrics.
pub(crate) fn build_text_summary(done: &ProcessedFolder) -> TextSummary {
    let mut lines = vec![format!("== {} ==", done.folder.display())];

    for row in &done.rows {
        let mut line = match row.kind {
            RunKind::Serial => format!("{:<9}", row.kind.label()),
            RunKind::Parallel => format!(
                "{:<9} MPI {:>3} OMP {:>3}",
                row.kind.label(),
                row.processes,
                row.threads
            ),
        };
        for metric in &row.metrics {
            line.push_str(&format!("  {} {:.6}", metric.column, metric.mean));
            if let Some(s) = metric.scaling {
                line.push_str(&format!(" speedup {:.2} eff {:.2}", s.speedup, s.efficiency));
            }
        }
        lines.push(line);
    }

    lines.push(format!("Table: {}", done.table_path.display()));
    if let Some(plot) = done.plot_path.as_ref() {
        lines.push(format!("Plot: {}", plot.display()));
    }
    TextSummary { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MetricValue, Scaling, SummaryRow};
    use std::path::PathBuf;

    #[test]
    fn one_line_per_row_plus_outputs() {
        let done = ProcessedFolder {
            folder: PathBuf::from("DIM_10_LB_0_HB_5"),
            rows: vec![SummaryRow {
                file_name: "DIM_10_LB_0_HB_5_MPI_04_OMP_2.csv".into(),
                kind: RunKind::Parallel,
                processes: 4,
                threads: 2,
                metrics: vec![MetricValue {
                    column: "elapsed".into(),
                    mean: 1.25,
                    scaling: Some(Scaling {
                        speedup: 2.4,
                        efficiency: 0.6,
                    }),
                }],
            }],
            table_path: PathBuf::from("psize-10-O0-table.csv"),
            plot_path: None,
        };
        let summary = build_text_summary(&done);
        assert_eq!(summary.lines.len(), 3);
        assert_eq!(
            summary.lines[1],
            "Parallel  MPI   4 OMP   2  elapsed 1.250000 speedup 2.40 eff 0.60"
        );
        assert_eq!(summary.lines[2], "Table: psize-10-O0-table.csv");
    }
}
