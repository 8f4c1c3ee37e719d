//! Speedup charts and sample histograms rendered to JPEG.

use crate::error::ReportError;
use crate::metrics;
use crate::model::{PlotSpec, ReportConfig, RunKind, SummaryRow};
use anyhow::{anyhow, Result};
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

const CHART_SIZE: (u32, u32) = (1200, 800);
const HISTOGRAM_SIZE: (u32, u32) = (800, 600);
const KDE_POINTS: usize = 200;

const SERIES_COLORS: [RGBColor; 8] = [
    RED,
    GREEN,
    BLUE,
    YELLOW,
    CYAN,
    MAGENTA,
    RGBColor(255, 165, 0),
    RGBColor(128, 0, 128),
];

/// Speedup over process count for one thread count.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedupSeries {
    pub threads: u32,
    /// `(processes, speedup)`, starting at the origin, ordered by processes.
    pub points: Vec<(f64, f64)>,
}

impl SpeedupSeries {
    pub fn label(&self) -> String {
        if self.threads == 1 {
            "1 OpenMP thread".to_string()
        } else {
            format!("{} OpenMP threads", self.threads)
        }
    }
}

/// Group parallel rows by thread count. Rows without a speedup value and the
/// serial baseline are left out.
pub fn speedup_series(rows: &[SummaryRow]) -> Vec<SpeedupSeries> {
    let mut groups: BTreeMap<u32, Vec<(f64, f64)>> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.kind == RunKind::Parallel) {
        if let Some(scaling) = row.primary_scaling() {
            groups
                .entry(row.threads)
                .or_default()
                .push((f64::from(row.processes), scaling.speedup));
        }
    }

    groups
        .into_iter()
        .map(|(threads, mut points)| {
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            points.insert(0, (0.0, 0.0));
            SpeedupSeries { threads, points }
        })
        .collect()
}

/// Axis labels bound to header columns. An unknown binding is logged and the
/// default labels are used instead.
pub fn axis_labels(header: &[String], plot: &PlotSpec) -> (String, String) {
    let bound = |name: &str| header.iter().any(|h| h == name);
    if bound(&plot.x_from_table) && bound(&plot.y_from_table) {
        (plot.x_from_table.clone(), plot.y_from_table.clone())
    } else {
        warn!(
            x = %plot.x_from_table,
            y = %plot.y_from_table,
            "config table or plot error: axis binding is not a table column"
        );
        let defaults = PlotSpec::default();
        (defaults.x_from_table, defaults.y_from_table)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlotOptions<'a> {
    pub save: bool,
    /// Destination image, required when `save` is set.
    pub name: Option<&'a Path>,
}

/// Render speedup against process count, one line per thread count, plus
/// the ideal linear speedup.
pub fn plot_from_rows(
    rows: &[SummaryRow],
    cfg: &ReportConfig,
    opts: &PlotOptions<'_>,
) -> Result<()> {
    let name = match (opts.save, opts.name) {
        (true, None) => return Err(ReportError::MissingOutputName { what: "plot" }.into()),
        (true, Some(name)) => name,
        (false, _) => {
            debug!("plot not saved, nothing to render");
            return Ok(());
        }
    };

    let series = speedup_series(rows);
    if series.is_empty() {
        warn!(plot = %name.display(), "no parallel rows with speedup, skipping plot");
        return Ok(());
    }
    let (x_label, y_label) = axis_labels(&cfg.table.header, &cfg.plot);

    let x_max = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.0))
        .fold(1.0, f64::max);
    let y_max = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.1))
        .fold(x_max, f64::max)
        * 1.05;

    let root = BitMapBackend::new(name, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)
        .map_err(draw_err)?;
    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .draw()
        .map_err(draw_err)?;

    for (i, s) in series.iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        chart
            .draw_series(LineSeries::new(s.points.iter().copied(), color.stroke_width(2)))
            .map_err(draw_err)?
            .label(s.label())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }
    chart
        .draw_series(LineSeries::new(
            vec![(0.0, 0.0), (x_max, x_max)],
            BLACK.stroke_width(1),
        ))
        .map_err(draw_err)?
        .label("Ideal")
        .legend(|(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(1))
        });

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(draw_err)?;
    root.present().map_err(draw_err)?;
    debug!(plot = %name.display(), series = series.len(), "speedup plot written");
    Ok(())
}

/// Histogram of `samples` with its kernel density curve scaled to counts.
pub fn render_histogram(samples: &[f64], column: &str, target: &Path) -> Result<()> {
    if samples.is_empty() {
        return Ok(());
    }
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };

    let bins = metrics::sturges_bins(samples.len());
    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in samples {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let kde: Vec<(f64, f64)> = metrics::gaussian_kde(samples, KDE_POINTS)
        .unwrap_or_default()
        .into_iter()
        .map(|(x, d)| (x, d * samples.len() as f64 * width))
        .collect();
    let x_min = kde.first().map_or(lo, |p| p.0.min(lo));
    let x_max = kde.last().map_or(hi, |p| p.0.max(hi));
    let y_max = counts
        .iter()
        .map(|&c| c as f64)
        .chain(kde.iter().map(|p| p.1))
        .fold(1.0, f64::max)
        * 1.1;

    let root = BitMapBackend::new(target, HISTOGRAM_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)
        .map_err(draw_err)?;
    chart
        .configure_mesh()
        .x_desc(column)
        .y_desc("Count")
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, &c)| {
            let x0 = lo + width * i as f64;
            Rectangle::new([(x0, 0.0), (x0 + width, c as f64)], BLUE.mix(0.4).filled())
        }))
        .map_err(draw_err)?;
    if !kde.is_empty() {
        chart
            .draw_series(LineSeries::new(kde, BLUE.stroke_width(2)))
            .map_err(draw_err)?;
    }
    root.present().map_err(draw_err)?;
    Ok(())
}

fn draw_err<E: std::fmt::Debug>(e: E) -> anyhow::Error {
    anyhow!("plot rendering failed: {e:?}")
}
