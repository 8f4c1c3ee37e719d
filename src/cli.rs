use crate::model::{MeanPolicy, ReportConfig};
use crate::naming::FileGrammar;
use crate::orchestrator::{run_extraction, ReportOptions};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "speedup-report",
    version,
    about = "Summarize MPI/OpenMP benchmark measurements into speedup tables and plots"
)]
pub struct Cli {
    /// Measurement roots holding DIM_<n>_LB_<n>_HB_<n> folders
    /// (default: kosaraju/measure_O0..O3 under --base-dir)
    pub roots: Vec<PathBuf>,

    /// Directory the default roots are resolved against
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,

    /// JSON report configuration (columns, table header, naming patterns)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Which mean to report for each metric column
    #[arg(long, value_enum)]
    pub mean_policy: Option<MeanPolicy>,

    /// Echo every table to stdout
    #[arg(long)]
    pub print_table: bool,

    /// Print a text summary of each folder
    #[arg(long)]
    pub text: bool,

    /// Skip speedup plot rendering
    #[arg(long)]
    pub no_plot: bool,

    /// Keep processing other folders when one fails
    #[arg(long)]
    pub keep_going: bool,

    /// Log debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Log errors only
    #[arg(short, long)]
    pub quiet: bool,
}

/// Optimization levels of the default measurement roots.
const DEFAULT_OPT_LEVELS: [&str; 4] = ["O0", "O1", "O2", "O3"];

/// Roots to process: the ones given, or the four default roots under `base`.
pub fn resolve_roots(args: &Cli) -> Vec<PathBuf> {
    if !args.roots.is_empty() {
        return args.roots.clone();
    }
    default_roots(&args.base_dir)
}

fn default_roots(base: &Path) -> Vec<PathBuf> {
    DEFAULT_OPT_LEVELS
        .iter()
        .map(|opt| base.join("kosaraju").join(format!("measure_{opt}")))
        .collect()
}

/// Build the `ReportConfig` from the optional config file and CLI overrides.
pub fn build_config(args: &Cli) -> Result<ReportConfig> {
    let mut cfg = match args.config.as_deref() {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parse config {}", path.display()))?
        }
        None => ReportConfig::default(),
    };
    if let Some(policy) = args.mean_policy {
        cfg.mean_policy = policy;
    }
    if cfg.columns.is_empty() {
        anyhow::bail!("configuration names no metric columns");
    }
    Ok(cfg)
}

pub fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args)?;
    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        return Ok(());
    }
    let grammar = FileGrammar::new(&cfg).context("invalid naming patterns in configuration")?;

    let opts = ReportOptions {
        print_table: args.print_table,
        plot: !args.no_plot,
        keep_going: args.keep_going,
    };

    let mut failed = 0usize;
    for root in resolve_roots(&args) {
        let outcome = match run_extraction(&root, &grammar, &cfg, &opts) {
            Ok(outcome) => outcome,
            Err(e) if args.keep_going => {
                warn!("skipping {}: {e:#}", root.display());
                failed += 1;
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("extract {}", root.display())),
        };
        failed += outcome.failed.len();

        if args.text {
            for done in &outcome.processed {
                let summary = crate::text_summary::build_text_summary(done);
                for line in summary.lines {
                    println!("{line}");
                }
            }
        }
        info!(
            root = %root.display(),
            folders = outcome.processed.len(),
            "root done"
        );
    }

    if failed > 0 {
        anyhow::bail!("{failed} folder(s) or root(s) failed");
    }
    Ok(())
}
