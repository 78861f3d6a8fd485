//! Report destination: stdout or a file.

use skillgate_common::{Error, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

/// Write `text` to `destination`, or to stdout when there is none.
pub fn emit(text: &str, destination: Option<&Path>) -> Result<()> {
    match destination {
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|e| Error::formatter(format!("cannot write to stdout: {}", e)))
        }
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::formatter(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
            fs::write(path, text)
                .map_err(|e| Error::formatter(format!("cannot write {}: {}", path.display(), e)))?;
            info!("Report written to {}", path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_emit_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports/ci/junit.xml");
        emit("<testsuite/>\n", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<testsuite/>\n");
    }

    #[test]
    fn test_emit_unwritable_destination() {
        let dir = tempdir().unwrap();
        // A regular file cannot be a parent directory.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let err = emit("report", Some(&blocker.join("out.json"))).unwrap_err();
        assert!(matches!(err, Error::Formatter(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
