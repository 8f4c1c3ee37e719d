//! Filename grammar for measurement files and configuration folders.

use crate::error::ReportError;
use crate::model::{ReportConfig, RunKind};
use regex::Regex;
use std::path::Path;

/// What a measurement file name says about its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementName {
    pub kind: RunKind,
    pub processes: u32,
    pub threads: u32,
}

/// What a configuration folder name says about its problem size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderName {
    /// The `dim` capture.
    pub size: String,
    /// Token following the size (`LB` for the default layout), used when the
    /// root directory carries no optimization level.
    pub fallback_opt: String,
}

/// Compiled form of the naming patterns in a [`ReportConfig`].
#[derive(Debug, Clone)]
pub struct FileGrammar {
    file: Regex,
    folder: Regex,
    serial_marker: String,
}

impl FileGrammar {
    pub fn new(cfg: &ReportConfig) -> Result<Self, ReportError> {
        let file = compile("file", &cfg.file_pattern, &["mpi", "omp"])?;
        let folder = compile("folder", &cfg.folder_pattern, &["dim"])?;
        if cfg.serial_marker.is_empty() {
            return Err(ReportError::InvalidPattern {
                what: "serial marker",
                reason: "marker is empty".to_string(),
            });
        }
        Ok(Self {
            file,
            folder,
            serial_marker: cfg.serial_marker.clone(),
        })
    }

    pub fn is_measurement_file(&self, name: &str) -> bool {
        self.file.is_match(name)
    }

    pub fn is_config_folder(&self, name: &str) -> bool {
        self.folder.is_match(name)
    }

    pub fn is_serial(&self, name: &str) -> bool {
        name.contains(&self.serial_marker)
    }

    pub fn serial_marker(&self) -> &str {
        &self.serial_marker
    }

    /// Recover run kind and process/thread counts. Serial runs are recorded
    /// as one process and zero threads whatever the name encodes.
    pub fn parse_file(&self, name: &str) -> Result<MeasurementName, ReportError> {
        let malformed = || ReportError::MalformedFileName {
            name: name.to_string(),
        };
        let caps = self.file.captures(name).ok_or_else(malformed)?;

        if self.is_serial(name) {
            return Ok(MeasurementName {
                kind: RunKind::Serial,
                processes: 1,
                threads: 0,
            });
        }

        let number = |group: &str| -> Result<u32, ReportError> {
            caps.name(group)
                .and_then(|m| m.as_str().parse().ok())
                .ok_or_else(malformed)
        };
        Ok(MeasurementName {
            kind: RunKind::Parallel,
            processes: number("mpi")?,
            threads: number("omp")?,
        })
    }

    pub fn parse_folder(&self, name: &str) -> Result<FolderName, ReportError> {
        let malformed = || ReportError::MalformedFileName {
            name: name.to_string(),
        };
        let caps = self.folder.captures(name).ok_or_else(malformed)?;
        let size = caps.name("dim").ok_or_else(malformed)?.as_str().to_string();
        let fallback_opt = name.split('_').nth(2).unwrap_or_default().to_string();
        Ok(FolderName { size, fallback_opt })
    }
}

fn compile(what: &'static str, pattern: &str, groups: &[&str]) -> Result<Regex, ReportError> {
    let re = Regex::new(pattern).map_err(|e| ReportError::InvalidPattern {
        what,
        reason: e.to_string(),
    })?;
    let names: Vec<&str> = re.capture_names().flatten().collect();
    if let Some(missing) = groups.iter().find(|g| !names.contains(g)) {
        return Err(ReportError::InvalidPattern {
            what,
            reason: format!("missing named group `{missing}`"),
        });
    }
    Ok(re)
}

/// Optimization level encoded as the last `_`-separated token of a root
/// directory name, e.g. `O2` for `measure_O2`.
pub fn optimization_level(root: &Path) -> Option<String> {
    let name = root.file_name()?.to_str()?;
    let token = name.rsplit('_').next()?;
    let digits = token.strip_prefix('O')?;
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(token.to_string())
    } else {
        None
    }
}

/// Table and plot file names for a folder: `psize-<size>-<opt>-table.csv`
/// and `speedup-<size>-<opt>.jpg`.
pub fn output_names(folder: &FolderName, opt: Option<&str>) -> (String, String) {
    let opt = opt.unwrap_or(&folder.fallback_opt);
    (
        format!("psize-{}-{}-table.csv", folder.size, opt),
        format!("speedup-{}-{}.jpg", folder.size, opt),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> FileGrammar {
        FileGrammar::new(&ReportConfig::default()).unwrap()
    }

    #[test]
    fn parses_parallel_file() {
        let m = grammar()
            .parse_file("DIM_1000_LB_0_HB_10_MPI_04_OMP_16.csv")
            .unwrap();
        assert_eq!(m.kind, RunKind::Parallel);
        assert_eq!(m.processes, 4);
        assert_eq!(m.threads, 16);
    }

    #[test]
    fn serial_marker_overrides_counts() {
        let g = grammar();
        for name in [
            "DIM_1000_LB_0_HB_10_MPI_00_OMP_.csv",
            "DIM_1000_LB_0_HB_10_MPI_00_OMP_00.csv",
        ] {
            let m = g.parse_file(name).unwrap();
            assert_eq!(m.kind, RunKind::Serial);
            assert_eq!((m.processes, m.threads), (1, 0));
        }
    }

    #[test]
    fn rejects_malformed_names() {
        let g = grammar();
        assert!(!g.is_measurement_file("a.csv"));
        assert!(!g.is_measurement_file("DIM_1_LB_0_HB_10_MPI_02_OMP_4.txt"));
        assert!(matches!(
            g.parse_file("DIM_1_LB_0_HB_10_MPI_02.csv"),
            Err(ReportError::MalformedFileName { .. })
        ));
        // parallel run without a thread count
        assert!(g.parse_file("DIM_1_LB_0_HB_10_MPI_02_OMP_.csv").is_err());
    }

    #[test]
    fn folder_names() {
        let g = grammar();
        assert!(g.is_config_folder("DIM_5000_LB_0_HB_20"));
        assert!(!g.is_config_folder("DIM_5000_LB_0"));
        assert!(!g.is_config_folder("jpg"));
        let f = g.parse_folder("DIM_5000_LB_0_HB_20").unwrap();
        assert_eq!(f.size, "5000");
        assert_eq!(f.fallback_opt, "LB");
    }

    #[test]
    fn pattern_without_required_groups_is_rejected() {
        let cfg = ReportConfig {
            file_pattern: r"^DIM_\d+_MPI_\d+\.csv$".to_string(),
            ..ReportConfig::default()
        };
        assert!(matches!(
            FileGrammar::new(&cfg),
            Err(ReportError::InvalidPattern { what: "file", .. })
        ));
    }

    #[test]
    fn output_names_use_root_optimization_level() {
        let folder = FolderName {
            size: "1000".into(),
            fallback_opt: "LB".into(),
        };
        let opt = optimization_level(Path::new("measures/kosaraju/measure_O2"));
        assert_eq!(opt.as_deref(), Some("O2"));
        assert_eq!(
            output_names(&folder, opt.as_deref()),
            (
                "psize-1000-O2-table.csv".to_string(),
                "speedup-1000-O2.jpg".to_string()
            )
        );
        assert_eq!(optimization_level(Path::new("/tmp/measures")), None);
        assert_eq!(output_names(&folder, None).0, "psize-1000-LB-table.csv");
    }
}
