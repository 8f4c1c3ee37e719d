//! Report orchestration.
//!
//! This module walks measurement roots folder by folder and turns each
//! folder's trimmed means into summary rows, a table and a speedup plot.
//! CLI layers call into this module to keep responsibilities separated.

mod controller;
mod post_process;

pub(crate) use controller::{run_extraction, ReportOptions};
pub(crate) use post_process::ProcessedFolder;
