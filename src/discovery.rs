//! Locating configuration folders and measurement files on disk.
//!
//! Every path is resolved against the folder being scanned; the process
//! working directory is never touched.

use crate::naming::FileGrammar;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Image subdirectory created inside every scanned folder.
pub const IMAGE_DIR: &str = "jpg";

/// Sorted names of the regular `.csv` files in `folder` that match the
/// measurement grammar. Creates `folder/jpg` if it does not exist.
pub fn discover_measurement_files(folder: &Path, grammar: &FileGrammar) -> Result<Vec<String>> {
    let image_dir = folder.join(IMAGE_DIR);
    if !image_dir.exists() {
        fs::create_dir(&image_dir)
            .with_context(|| format!("create image directory {}", image_dir.display()))?;
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(folder).with_context(|| format!("list {}", folder.display()))? {
        let entry = entry.with_context(|| format!("read entry in {}", folder.display()))?;
        if !entry.path().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let is_csv = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "csv");
        if is_csv && grammar.is_measurement_file(&name) {
            names.push(name);
        }
    }
    names.sort();
    debug!(folder = %folder.display(), files = ?names, "measurement files");
    Ok(names)
}

/// Sorted subdirectories of `root` whose names match the folder grammar.
pub fn discover_config_folders(root: &Path, grammar: &FileGrammar) -> Result<Vec<PathBuf>> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("list {}", root.display()))? {
        let entry = entry.with_context(|| format!("read entry in {}", root.display()))?;
        if !entry.path().is_dir() {
            continue;
        }
        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| grammar.is_config_folder(name))
        {
            folders.push(entry.path());
        }
    }
    folders.sort();
    Ok(folders)
}
