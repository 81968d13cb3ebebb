//! Incremental directory scanner
//!
//! Each pass reports files modified after the previous successful pass. The
//! high-water mark only moves when a walk completes, so a failed walk is
//! re-examined in full next time.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use autopost_core::WatchConfig;
use walkdir::WalkDir;

use crate::error::ScanError;

const ELIGIBLE_EXTENSIONS: [&str; 3] = ["png", "jpg", "gif"];

pub struct DirectoryScanner {
    config: WatchConfig,
    last_check: SystemTime,
    new_last_check: SystemTime,
}

impl DirectoryScanner {
    /// Scanner that only reports files modified from now on.
    pub fn new(config: WatchConfig) -> Self {
        Self::with_last_check(config, SystemTime::now())
    }

    pub fn with_last_check(config: WatchConfig, last_check: SystemTime) -> Self {
        Self {
            config,
            last_check,
            new_last_check: last_check,
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn last_check(&self) -> SystemTime {
        self.last_check
    }

    /// Walk the directory and return new eligible files.
    ///
    /// On error nothing is returned and the high-water mark stays put.
    pub fn scan(&mut self) -> Result<Vec<PathBuf>, ScanError> {
        let root = self.config.path.clone();
        check_directory(&root)?;

        let mut newest = self.last_check;
        let mut found = Vec::new();

        for entry in WalkDir::new(&root) {
            let entry = entry?;
            // Cheap name filter before touching the filesystem
            if !has_eligible_extension(entry.path()) {
                continue;
            }

            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().map_err(|source| ScanError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;

            if modified > newest {
                newest = modified;
            }
            if modified <= self.last_check {
                continue;
            }
            if self.config.is_excluded(entry.path()) {
                tracing::debug!(file = %entry.path().display(), "Skipping excluded file");
                continue;
            }

            found.push(entry.into_path());
        }

        self.new_last_check = newest;
        self.last_check = self.new_last_check;

        tracing::debug!(
            path = %root.display(),
            new_files = found.len(),
            "Scanned directory"
        );
        Ok(found)
    }
}

fn check_directory(path: &Path) -> Result<(), ScanError> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(ScanError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ScanError::MissingPath(path.to_path_buf()))
        }
        Err(source) => Err(ScanError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn has_eligible_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ELIGIBLE_EXTENSIONS
                .iter()
                .any(|eligible| ext.eq_ignore_ascii_case(eligible))
        })
        .unwrap_or(false)
}
