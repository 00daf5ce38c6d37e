//! Directory walker
//!
//! Recursively discovers supported game files and binds each one to the
//! first parser that accepts its extension. Errors on individual entries
//! are logged and skipped; only root-level failures abort the walk.

use crate::error::{Error, Result};
use crate::parsers::{default_parsers, Parser};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Extensions handled by the tool.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = [".lua", ".ini", ".txt"];

/// A discovered file ready for processing.
#[derive(Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub ext: String,
    pub parser: Arc<dyn Parser>,
}

pub struct Walker {
    parsers: Vec<Arc<dyn Parser>>,
}

impl Walker {
    pub fn new() -> Self {
        Self {
            parsers: default_parsers(),
        }
    }

    /// Discovers all supported files under the given root directory.
    pub fn walk(&self, root: &Path) -> Result<Vec<FileEntry>> {
        let root = root
            .canonicalize()
            .map_err(|e| Error::InvalidPath(format!("{}: {}", root.display(), e)))?;

        if !root.is_dir() {
            return Err(Error::InvalidPath(format!(
                "root is not a directory: {}",
                root.display()
            )));
        }

        let mut entries = Vec::new();

        for item in WalkDir::new(&root) {
            let item = match item {
                Ok(i) => i,
                Err(e) => {
                    warn!(error = %e, "Error walking path");
                    continue;
                }
            };

            if !item.file_type().is_file() {
                continue;
            }

            let ext = match item.path().extension() {
                Some(e) => format!(".{}", e.to_string_lossy().to_lowercase()),
                None => continue,
            };
            if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
                continue;
            }

            if let Some(parser) = self.parsers.iter().find(|p| p.can_parse(&ext)) {
                entries.push(FileEntry {
                    path: item.path().to_path_buf(),
                    ext,
                    parser: Arc::clone(parser),
                });
            }
        }

        info!(count = entries.len(), root = %root.display(), "Discovered files");
        Ok(entries)
    }
}

impl Default for Walker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_walk_finds_supported_files_recursively() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.lua"), "x").unwrap();
        fs::write(dir.path().join("b.INI"), "x").unwrap();
        fs::write(dir.path().join("sub/c.txt"), "x").unwrap();
        fs::write(dir.path().join("d.png"), "x").unwrap();

        let entries = Walker::new().walk(dir.path()).unwrap();
        let mut exts: Vec<&str> = entries.iter().map(|e| e.ext.as_str()).collect();
        exts.sort();
        assert_eq!(exts, vec![".ini", ".lua", ".txt"]);
    }

    #[test]
    fn test_walk_rejects_non_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(Walker::new().walk(file.path()).is_err());
    }

    #[test]
    fn test_walk_rejects_missing_root() {
        assert!(Walker::new()
            .walk(Path::new("/nonexistent/gameloc-test"))
            .is_err());
    }
}
