use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable description of the measurement schema and report layout.
///
/// Built once at startup (defaults or a JSON file) and passed by reference to
/// every stage of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Substring that identifies the serial baseline file of a folder.
    pub serial_marker: String,
    /// Measurement file name pattern. Must capture `mpi` and `omp`.
    pub file_pattern: String,
    /// Configuration folder pattern. Must capture `dim`.
    pub folder_pattern: String,
    pub columns: Vec<ColumnSpec>,
    pub table: TableSpec,
    pub plot: PlotSpec,
    pub mean_policy: MeanPolicy,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            serial_marker: "MPI_00".to_string(),
            file_pattern:
                r"^DIM_(?P<dim>[0-9]+)_LB_(?P<lb>[0-9]+)_HB_(?P<hb>[0-9]+)_MPI_(?P<mpi>[0-9]+)_OMP_(?P<omp>[0-9]*)\.csv$"
                    .to_string(),
            folder_pattern: r"^DIM_(?P<dim>[0-9]+)_LB_(?P<lb>[0-9]+)_HB_(?P<hb>[0-9]+)$".to_string(),
            columns: vec![
                ColumnSpec::new("kosaraju_time", false, false),
                ColumnSpec::new("comm_time", false, false),
                ColumnSpec::new("elapsed", false, true),
            ],
            table: TableSpec::default(),
            plot: PlotSpec::default(),
            mean_policy: MeanPolicy::default(),
        }
    }
}

impl ReportConfig {
    /// Columns whose means are compared against the serial baseline.
    pub fn speedup_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.compute_speedup)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    /// Render a histogram of the filtered samples under `jpg/`.
    #[serde(default)]
    pub histogram: bool,
    /// Append speedup and efficiency cells after this column's mean.
    #[serde(default)]
    pub compute_speedup: bool,
}

impl ColumnSpec {
    pub fn new(name: &str, histogram: bool, compute_speedup: bool) -> Self {
        Self {
            name: name.to_string(),
            histogram,
            compute_speedup,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSpec {
    pub header: Vec<String>,
    pub style: TableStyle,
}

impl Default for TableSpec {
    fn default() -> Self {
        Self {
            header: [
                "Version",
                "Processes",
                "OMP",
                "Kosaraju",
                "Communication",
                "Elapsed",
                "Speedup",
                "Efficiency",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            style: TableStyle::default(),
        }
    }
}

/// Header columns bound to the plot axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSpec {
    pub x_from_table: String,
    pub y_from_table: String,
}

impl Default for PlotSpec {
    fn default() -> Self {
        Self {
            x_from_table: "Processes".to_string(),
            y_from_table: "Speedup".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStyle {
    #[default]
    MsWordFriendly,
    Markdown,
}

/// Which estimate a trimmed-mean extraction reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum MeanPolicy {
    /// Unfiltered arithmetic mean (the historical output of these reports).
    #[default]
    Arithmetic,
    /// Mean refit on the one-sigma filtered samples.
    Trimmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunKind {
    Serial,
    Parallel,
}

impl RunKind {
    pub fn label(self) -> &'static str {
        match self {
            RunKind::Serial => "Serial",
            RunKind::Parallel => "Parallel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scaling {
    pub speedup: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub column: String,
    pub mean: f64,
    pub scaling: Option<Scaling>,
}

/// One aggregated measurement file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub file_name: String,
    pub kind: RunKind,
    pub processes: u32,
    pub threads: u32,
    pub metrics: Vec<MetricValue>,
}

impl SummaryRow {
    /// Table cells in header order: kind, processes, threads, then each
    /// metric mean followed by its speedup and efficiency when present.
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            Cell::Text(self.kind.label().to_string()),
            Cell::Int(i64::from(self.processes)),
            Cell::Int(i64::from(self.threads)),
        ];
        for metric in &self.metrics {
            cells.push(Cell::Float(metric.mean));
            if let Some(scaling) = metric.scaling {
                cells.push(Cell::Float(scaling.speedup));
                cells.push(Cell::Float(scaling.efficiency));
            }
        }
        cells
    }

    /// Scaling of the first metric that carries one.
    pub fn primary_scaling(&self) -> Option<Scaling> {
        self.metrics.iter().find_map(|m| m.scaling)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}

/// Shortest round-trip form of `v`: positional with a trailing `.0` on
/// integral values, scientific (`3.2e-05`, `1e+16`) when the decimal
/// exponent is below -4 or at least 16.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let sci = format!("{v:e}");
    let parts = sci
        .split_once('e')
        .and_then(|(mantissa, exp)| exp.parse::<i32>().ok().map(|exp| (mantissa, exp)));
    match parts {
        Some((mantissa, exp)) if !(-4..16).contains(&exp) => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        _ => {
            let plain = format!("{v}");
            if plain.contains('.') {
                plain
            } else {
                format!("{plain}.0")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_json() {
        let cfg = ReportConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ReportConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.columns.len(), 3);
        assert_eq!(back.table.header, cfg.table.header);
        assert_eq!(back.mean_policy, MeanPolicy::Arithmetic);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: ReportConfig =
            serde_json::from_str(r#"{"serial_marker": "SEQ", "mean_policy": "trimmed"}"#).unwrap();
        assert_eq!(cfg.serial_marker, "SEQ");
        assert_eq!(cfg.mean_policy, MeanPolicy::Trimmed);
        assert_eq!(cfg.plot.y_from_table, "Speedup");
        assert_eq!(cfg.table.style, TableStyle::MsWordFriendly);
    }

    #[test]
    fn row_cells_follow_header_order() {
        let row = SummaryRow {
            file_name: "x.csv".into(),
            kind: RunKind::Parallel,
            processes: 4,
            threads: 2,
            metrics: vec![
                MetricValue {
                    column: "comm_time".into(),
                    mean: 0.5,
                    scaling: None,
                },
                MetricValue {
                    column: "elapsed".into(),
                    mean: 2.0,
                    scaling: Some(Scaling {
                        speedup: 2.5,
                        efficiency: 0.625,
                    }),
                },
            ],
        };
        let rendered: Vec<String> = row.cells().iter().map(|c| c.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["Parallel", "4", "2", "0.5", "2.0", "2.5", "0.625"]
        );
        assert_eq!(row.primary_scaling().map(|s| s.speedup), Some(2.5));
    }

    #[test]
    fn float_cells_switch_to_scientific_at_the_exponent_limits() {
        assert_eq!(format_float(3.2e-5), "3.2e-05");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(-0.00012), "-0.00012");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1.5e300), "1.5e+300");
        assert_eq!(format_float(1e15), "1000000000000000.0");
        assert_eq!(format_float(10.0), "10.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(Cell::Float(1.25).to_string(), "1.25");
    }
}
