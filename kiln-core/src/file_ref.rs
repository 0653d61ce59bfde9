use std::{
    fmt,
    path::{Component, Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// A reference to a source or generated file.
///
/// Paths are lexically normalized on construction (`.` dropped, `..`
/// folded into the parent) so two references to the same file compare equal
/// without touching the file system.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(PathBuf);

impl FileRef {
    /// Create a reference from any path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(normalize(path.as_ref()))
    }

    /// The referenced path.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// The file name without its directory, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name().and_then(|name| name.to_str())
    }
}

impl AsRef<Path> for FileRef {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for FileRef {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for FileRef {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_current_dir() {
        let a = FileRef::new("src/./main/Foo.kt");
        let b = FileRef::new("src/main/Foo.kt");
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalizes_parent_dir() {
        let file = FileRef::new("/project/build/../src/Foo.kt");
        assert_eq!(file.path(), Path::new("/project/src/Foo.kt"));
    }

    #[test]
    fn test_leading_parent_dir_kept() {
        let file = FileRef::new("../Foo.kt");
        assert_eq!(file.path(), Path::new("../Foo.kt"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(FileRef::new("/a/b/Abc.kt").file_name(), Some("Abc.kt"));
    }
}
