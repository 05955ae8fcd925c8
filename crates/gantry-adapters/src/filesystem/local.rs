//! Local filesystem adapter using std::fs.

use std::io;
use std::path::{Path, PathBuf};

use gantry_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{GantryError, GantryResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> GantryResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> GantryResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn read_to_string(&self, path: &Path) -> GantryResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path).is_ok_and(|meta| meta.file_type().is_symlink())
    }

    fn list_dir(&self, path: &Path) -> GantryResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path).map_err(|e| map_io_error(path, e, "list directory"))?;
        let mut children = entries
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| map_io_error(path, e, "list directory"))?;
        children.sort();
        Ok(children)
    }

    fn remove_file(&self, path: &Path) -> GantryResult<()> {
        std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }

    fn remove_dir(&self, path: &Path) -> GantryResult<()> {
        std::fs::remove_dir(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> GantryError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {operation}: {e}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_children_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFilesystem::new();
        fs.write_file(&dir.path().join("b.ts"), "b").unwrap();
        fs.write_file(&dir.path().join("a.ts"), "a").unwrap();
        fs.create_dir_all(&dir.path().join("nested/deeper")).unwrap();

        let names: Vec<String> = fs
            .list_dir(dir.path())
            .unwrap()
            .iter()
            .filter_map(|p| p.file_name()?.to_str().map(str::to_string))
            .collect();
        assert_eq!(names, vec!["a.ts", "b.ts", "nested"]);
        assert!(fs.is_dir(&dir.path().join("nested")));
    }

    #[test]
    fn removing_a_non_empty_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFilesystem::new();
        let sub = dir.path().join("sub");
        fs.create_dir_all(&sub).unwrap();
        fs.write_file(&sub.join("keep.txt"), "x").unwrap();

        let err = fs.remove_dir(&sub).unwrap_err();
        assert!(err.to_string().contains("remove directory"));
        fs.remove_file(&sub.join("keep.txt")).unwrap();
        fs.remove_dir(&sub).unwrap();
        assert!(!fs.exists(&sub));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_reported_without_following() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFilesystem::new();
        let target = dir.path().join("target");
        fs.create_dir_all(&target).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert!(fs.is_symlink(&link));
        assert!(!fs.is_symlink(&target));
        assert!(!fs.is_symlink(&dir.path().join("missing")));
    }
}
