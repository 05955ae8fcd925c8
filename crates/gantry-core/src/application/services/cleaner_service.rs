//! Output Cleaner - removes stale generated files after a complete run.
//!
//! Deletion is irreversible, so every candidate is checked against the
//! run's [`KnownGoodSet`] (which normalizes path spellings) and I/O
//! failures are downgraded to warnings so one stuck file never leaves the
//! rest of the directory half-cleaned.
//!
//! Symbolic links are never followed or removed: a link inside a
//! generated directory may point anywhere, and the generator never
//! creates one.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::application::ports::Filesystem;
use crate::domain::generation::{CleanDepth, CleanerSpec, KnownGoodSet};

/// What a cleaning pass did (or, in dry-run mode, would have done).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanOutcome {
    pub deleted: Vec<PathBuf>,
    pub removed_dirs: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

pub struct OutputCleaner<'a> {
    filesystem: &'a dyn Filesystem,
    dry_run: bool,
}

impl<'a> OutputCleaner<'a> {
    pub fn new(filesystem: &'a dyn Filesystem) -> Self {
        Self {
            filesystem,
            dry_run: false,
        }
    }

    /// Log would-be deletions without touching the filesystem.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Delete every file under `directory` that `spec` owns and that is
    /// not known-good, then every directory below `directory` that became
    /// empty as a result.
    ///
    /// `directory` is `spec.directory` already resolved against the
    /// declaring composite. It is never removed itself.
    #[instrument(skip_all, fields(directory = %directory.display(), depth = ?spec.depth, dry_run = self.dry_run))]
    pub fn clean(&self, directory: &Path, spec: &CleanerSpec, known_good: &KnownGoodSet) -> CleanOutcome {
        let mut outcome = CleanOutcome::default();
        if self.filesystem.is_symlink(directory) {
            warn!("Cleaner directory is a symbolic link, not cleaning");
            outcome
                .warnings
                .push(format!("not cleaning {}: it is a symbolic link", directory.display()));
            return outcome;
        }
        if !self.filesystem.is_dir(directory) {
            debug!("Nothing to clean");
            return outcome;
        }

        self.clean_dir(directory, spec, known_good, &mut outcome);

        info!(
            deleted = outcome.deleted.len(),
            removed_dirs = outcome.removed_dirs.len(),
            "Cleanup finished"
        );
        outcome
    }

    /// Returns whether anything below `directory` was (or would be) deleted.
    fn clean_dir(
        &self,
        directory: &Path,
        spec: &CleanerSpec,
        known_good: &KnownGoodSet,
        outcome: &mut CleanOutcome,
    ) -> bool {
        let entries = match self.filesystem.list_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %directory.display(), error = %e, "Could not list directory");
                outcome.warnings.push(format!("could not list {}: {e}", directory.display()));
                return false;
            }
        };

        let mut deleted_any = false;
        for entry in entries {
            if self.filesystem.is_symlink(&entry) {
                debug!(path = %entry.display(), "Skipping symbolic link");
                continue;
            }
            if self.filesystem.is_dir(&entry) {
                if spec.depth == CleanDepth::Recursive
                    && self.clean_dir(&entry, spec, known_good, outcome)
                {
                    deleted_any = true;
                    self.remove_if_empty(&entry, outcome);
                }
                continue;
            }

            if known_good.contains(&entry) || !spec.owns(&entry) {
                continue;
            }

            if self.dry_run {
                info!(path = %entry.display(), "Would delete stale file");
                outcome.deleted.push(entry);
                deleted_any = true;
                continue;
            }

            match self.filesystem.remove_file(&entry) {
                Ok(()) => {
                    debug!(path = %entry.display(), "Deleted stale file");
                    outcome.deleted.push(entry);
                    deleted_any = true;
                }
                Err(e) => {
                    warn!(path = %entry.display(), error = %e, "Could not delete stale file");
                    outcome.warnings.push(format!("could not delete {}: {e}", entry.display()));
                }
            }
        }
        deleted_any
    }

    fn remove_if_empty(&self, directory: &Path, outcome: &mut CleanOutcome) {
        if self.dry_run {
            return;
        }
        let empty = self
            .filesystem
            .list_dir(directory)
            .is_ok_and(|entries| entries.is_empty());
        if !empty {
            return;
        }
        match self.filesystem.remove_dir(directory) {
            Ok(()) => {
                debug!(path = %directory.display(), "Removed empty directory");
                outcome.removed_dirs.push(directory.to_path_buf());
            }
            Err(e) => {
                warn!(path = %directory.display(), error = %e, "Could not remove directory");
                outcome
                    .warnings
                    .push(format!("could not remove {}: {e}", directory.display()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    use super::*;
    use crate::application::ApplicationError;
    use crate::error::GantryResult;

    /// Minimal in-memory tree, enough to exercise the walk.
    #[derive(Default)]
    struct Tree {
        files: Mutex<BTreeSet<PathBuf>>,
        dirs: Mutex<BTreeSet<PathBuf>>,
        locked: BTreeSet<PathBuf>,
        links: BTreeSet<PathBuf>,
    }

    impl Tree {
        fn with_files(files: &[&str]) -> Self {
            let tree = Self::default();
            for f in files {
                let path = PathBuf::from(f);
                let mut parent = path.parent();
                while let Some(p) = parent {
                    if !p.as_os_str().is_empty() {
                        tree.dirs.lock().unwrap().insert(p.to_path_buf());
                    }
                    parent = p.parent();
                }
                tree.files.lock().unwrap().insert(path);
            }
            tree
        }

        fn has(&self, path: &str) -> bool {
            let p = PathBuf::from(path);
            self.files.lock().unwrap().contains(&p) || self.dirs.lock().unwrap().contains(&p)
        }
    }

    impl Filesystem for Tree {
        fn create_dir_all(&self, _: &Path) -> GantryResult<()> {
            Ok(())
        }
        fn write_file(&self, _: &Path, _: &str) -> GantryResult<()> {
            Ok(())
        }
        fn read_to_string(&self, _: &Path) -> GantryResult<String> {
            Ok(String::new())
        }
        fn exists(&self, path: &Path) -> bool {
            self.files.lock().unwrap().contains(path) || self.is_dir(path)
        }
        fn is_dir(&self, path: &Path) -> bool {
            self.dirs.lock().unwrap().contains(path)
        }
        fn is_symlink(&self, path: &Path) -> bool {
            self.links.contains(path)
        }
        fn list_dir(&self, path: &Path) -> GantryResult<Vec<PathBuf>> {
            let files = self.files.lock().unwrap();
            let dirs = self.dirs.lock().unwrap();
            Ok(files
                .iter()
                .chain(dirs.iter())
                .filter(|p| p.parent() == Some(path))
                .cloned()
                .collect())
        }
        fn remove_file(&self, path: &Path) -> GantryResult<()> {
            if self.locked.contains(path) {
                return Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "permission denied".into(),
                }
                .into());
            }
            self.files.lock().unwrap().remove(path);
            Ok(())
        }
        fn remove_dir(&self, path: &Path) -> GantryResult<()> {
            self.dirs.lock().unwrap().remove(path);
            Ok(())
        }
    }

    fn fixture() -> Tree {
        Tree::with_files(&[
            "/site/gen/keep.g.ts",
            "/site/gen/stale.g.ts",
            "/site/gen/old/gone.g.ts",
            "/site/gen/nested/keep.g.ts",
            "/site/gen/nested/stale.g.ts",
        ])
    }

    fn spec(depth: CleanDepth) -> CleanerSpec {
        CleanerSpec::new(crate::domain::generation::RelativePath::root(), depth)
    }

    fn known_good() -> KnownGoodSet {
        let mut set = KnownGoodSet::new("/site");
        // Relative and absolute spellings must both protect their file.
        set.insert("gen/keep.g.ts");
        set.insert("/site/gen/./nested/keep.g.ts");
        set
    }

    #[test]
    fn recursive_clean_keeps_known_good_and_prunes_empty_dirs() {
        let tree = fixture();
        let outcome =
            OutputCleaner::new(&tree).clean(Path::new("/site/gen"), &spec(CleanDepth::Recursive), &known_good());

        assert!(tree.has("/site/gen/keep.g.ts"));
        assert!(tree.has("/site/gen/nested/keep.g.ts"));
        assert!(!tree.has("/site/gen/stale.g.ts"));
        assert!(!tree.has("/site/gen/nested/stale.g.ts"));
        assert!(!tree.has("/site/gen/old"));
        assert!(tree.has("/site/gen/nested"));
        assert!(tree.has("/site/gen"));
        assert_eq!(outcome.deleted.len(), 3);
        assert_eq!(outcome.removed_dirs, vec![PathBuf::from("/site/gen/old")]);
    }

    #[test]
    fn top_level_clean_leaves_subdirectories_alone() {
        let tree = fixture();
        OutputCleaner::new(&tree).clean(Path::new("/site/gen"), &spec(CleanDepth::TopLevel), &known_good());

        assert!(!tree.has("/site/gen/stale.g.ts"));
        assert!(tree.has("/site/gen/old/gone.g.ts"));
        assert!(tree.has("/site/gen/nested/stale.g.ts"));
    }

    #[test]
    fn dry_run_touches_nothing() {
        let tree = fixture();
        let outcome = OutputCleaner::new(&tree)
            .dry_run(true)
            .clean(Path::new("/site/gen"), &spec(CleanDepth::Recursive), &known_good());

        assert_eq!(outcome.deleted.len(), 3);
        assert!(tree.has("/site/gen/stale.g.ts"));
        assert!(tree.has("/site/gen/old"));
    }

    #[test]
    fn delete_failure_is_a_warning_and_cleanup_continues() {
        let mut tree = fixture();
        tree.locked.insert(PathBuf::from("/site/gen/stale.g.ts"));
        let outcome =
            OutputCleaner::new(&tree).clean(Path::new("/site/gen"), &spec(CleanDepth::Recursive), &known_good());

        assert_eq!(outcome.warnings.len(), 1);
        assert!(tree.has("/site/gen/stale.g.ts"));
        assert!(!tree.has("/site/gen/nested/stale.g.ts"));
    }

    #[test]
    fn missing_directory_is_a_no_op() {
        let tree = fixture();
        let outcome =
            OutputCleaner::new(&tree).clean(Path::new("/elsewhere"), &spec(CleanDepth::Recursive), &known_good());
        assert_eq!(outcome, CleanOutcome::default());
    }

    #[test]
    fn linked_directories_are_never_entered() {
        let mut tree = Tree::with_files(&["/site/gen/stale.g.ts", "/site/gen/link/thesis.txt"]);
        tree.links.insert(PathBuf::from("/site/gen/link"));
        let outcome =
            OutputCleaner::new(&tree).clean(Path::new("/site/gen"), &spec(CleanDepth::Recursive), &known_good());

        assert_eq!(outcome.deleted, vec![PathBuf::from("/site/gen/stale.g.ts")]);
        assert!(tree.has("/site/gen/link/thesis.txt"));
        assert!(tree.has("/site/gen/link"));
    }

    #[test]
    fn linked_cleaner_directory_is_refused() {
        let mut tree = fixture();
        tree.links.insert(PathBuf::from("/site/gen"));
        let outcome =
            OutputCleaner::new(&tree).clean(Path::new("/site/gen"), &spec(CleanDepth::Recursive), &known_good());

        assert!(outcome.deleted.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(tree.has("/site/gen/stale.g.ts"));
    }

    #[test]
    fn files_outside_the_owned_suffixes_survive() {
        let tree = fixture();
        let outcome = OutputCleaner::new(&tree).clean(
            Path::new("/site/gen"),
            &spec(CleanDepth::TopLevel).owning(&[".g.rs"]),
            &known_good(),
        );

        assert!(outcome.deleted.is_empty());
        assert!(tree.has("/site/gen/stale.g.ts"));
    }
}
