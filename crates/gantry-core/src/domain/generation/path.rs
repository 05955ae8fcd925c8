use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::domain::error::DomainError;

/// An output-path suffix that can only ever point below its parent.
///
/// Invariant: never absolute, never escapes with `..`. Enforced at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    pub fn try_new(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let reject = |reason: &str| DomainError::InvalidOutputPath {
            path: path.display().to_string(),
            reason: reason.to_string(),
        };

        let mut clean = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                Component::ParentDir => return Err(reject("'..' is not allowed")),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(reject("must be relative"));
                }
            }
        }
        Ok(Self(clean))
    }

    /// The empty suffix.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn join(&self, other: &RelativePath) -> Self {
        Self(self.0.join(&other.0))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.as_os_str().is_empty()
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.0.display())
        }
    }
}

/// Resolve `.` and `..` without touching the filesystem.
///
/// Relative input is first anchored at `base`.
pub fn normalize(path: &Path, base: &Path) -> PathBuf {
    let joined;
    let path = if path.is_absolute() {
        path
    } else {
        joined = base.join(path);
        &joined
    };

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Absolute output paths legitimately produced by the current run.
///
/// Every path is normalized against the run's output root on the way in
/// and on lookup, so relative and absolute spellings of one file agree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownGoodSet {
    base: PathBuf,
    paths: BTreeSet<PathBuf>,
}

impl KnownGoodSet {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            paths: BTreeSet::new(),
        }
    }

    pub fn insert(&mut self, path: impl AsRef<Path>) -> bool {
        let path = normalize(path.as_ref(), &self.base);
        self.paths.insert(path)
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.paths.contains(&normalize(path.as_ref(), &self.base))
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
