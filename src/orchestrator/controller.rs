//! Root-level extraction controller.
//!
//! Walks the configuration folders of one measurement root and applies the
//! folder error policy.

use super::post_process::{process_folder, ProcessedFolder};
use crate::discovery;
use crate::model::ReportConfig;
use crate::naming::{self, FileGrammar};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Switches shared by every folder of a run.
#[derive(Debug, Clone)]
pub(crate) struct ReportOptions {
    /// Echo each table to stdout.
    pub print_table: bool,
    /// Render the speedup plot next to each table.
    pub plot: bool,
    /// Log a failing folder and move on instead of aborting the run.
    pub keep_going: bool,
}

/// Folders of a root that were processed, and those that failed.
#[derive(Debug, Default)]
pub(crate) struct RootOutcome {
    pub processed: Vec<ProcessedFolder>,
    pub failed: Vec<PathBuf>,
}

/// Process every configuration folder under `root`, in name order.
pub(crate) fn run_extraction(
    root: &Path,
    grammar: &FileGrammar,
    cfg: &ReportConfig,
    opts: &ReportOptions,
) -> Result<RootOutcome> {
    info!("Listing folder for problem size in {}", root.display());
    let folders = discovery::discover_config_folders(root, grammar)?;
    info!("Found folders : {folders:?}");

    let opt = naming::optimization_level(root);
    let mut outcome = RootOutcome::default();
    for folder in folders {
        let res = process_folder(&folder, opt.as_deref(), grammar, cfg, opts)
            .with_context(|| format!("process {}", folder.display()));
        match res {
            Ok(done) => outcome.processed.push(done),
            Err(e) if opts.keep_going => {
                error!("{e:#}");
                outcome.failed.push(folder);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(outcome)
}
