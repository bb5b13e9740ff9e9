use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

/// Candidate data directories, relative to the base, in preference order.
pub const DATA_DIR_CANDIDATES: [&str; 2] = ["./data", "../data"];

#[derive(Debug, Error)]
pub enum PathError {
    #[error("Data directory not found (tried {})", display_paths(.tried))]
    DirectoryNotFound { tried: Vec<PathBuf> },
    #[error("Data file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },
    #[error("cannot determine current directory: {0}")]
    CurrentDir(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Find the data directory next to, or one level above, the working directory.
pub fn locate_data_dir() -> Result<PathBuf, PathError> {
    let cwd = std::env::current_dir()?;
    locate_data_dir_in(&cwd)
}

/// Like [`locate_data_dir`] but relative to `base`. `base/data` wins over
/// `base/../data` when both exist.
pub fn locate_data_dir_in(base: &Path) -> Result<PathBuf, PathError> {
    let tried: Vec<PathBuf> = DATA_DIR_CANDIDATES
        .iter()
        .map(|candidate| base.join(candidate))
        .collect();

    for dir in &tried {
        if dir.exists() {
            debug!("using data directory {}", dir.display());
            return Ok(dir.clone());
        }
    }
    Err(PathError::DirectoryNotFound { tried })
}

/// Resolve `name` inside the data directory.
pub fn locate_data_file(name: &str) -> Result<PathBuf, PathError> {
    let dir = locate_data_dir()?;
    locate_data_file_in(&dir, name)
}

/// Resolve `name` inside an already-known data directory.
pub fn locate_data_file_in(data_dir: &Path, name: &str) -> Result<PathBuf, PathError> {
    let path = data_dir.join(name);
    if !path.exists() {
        return Err(PathError::FileNotFound { path });
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn prefers_local_data_over_parent() {
        let root = tempfile::tempdir().unwrap();
        let work = root.path().join("work");
        fs::create_dir_all(work.join("data")).unwrap();
        fs::create_dir_all(root.path().join("data")).unwrap();

        let found = locate_data_dir_in(&work).unwrap();
        assert_eq!(found, work.join("./data"));
    }

    #[test]
    fn falls_back_to_parent_data() {
        let root = tempfile::tempdir().unwrap();
        let work = root.path().join("work");
        fs::create_dir_all(&work).unwrap();
        fs::create_dir_all(root.path().join("data")).unwrap();

        let found = locate_data_dir_in(&work).unwrap();
        assert_eq!(found, work.join("../data"));
    }

    #[test]
    fn missing_directory_lists_attempts() {
        let root = tempfile::tempdir().unwrap();
        let work = root.path().join("work");
        fs::create_dir_all(&work).unwrap();

        let err = locate_data_dir_in(&work).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Data directory not found"), "{msg}");
        assert!(msg.contains("../data"), "{msg}");
    }

    #[test]
    fn missing_file_reports_full_path() {
        let root = tempfile::tempdir().unwrap();
        let err = locate_data_file_in(root.path(), "nope.txt").unwrap_err();
        match err {
            PathError::FileNotFound { path } => assert_eq!(path, root.path().join("nope.txt")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn existing_file_resolves() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("limits.txt"), "1 0.1\n").unwrap();
        let path = locate_data_file_in(root.path(), "limits.txt").unwrap();
        assert!(path.ends_with("limits.txt"));
    }
}
