//! Classpath roots: the two storage shapes a walk can start from.

use memmap2::Mmap;
use std::fmt;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zip::ZipArchive;

use crate::error::{DiscoveryError, Result};

#[derive(Debug, Clone)]
pub enum ArchiveSource {
    File(PathBuf),
    Memory { label: String, bytes: Arc<[u8]> },
}

impl ArchiveSource {
    pub fn label(&self) -> String {
        match self {
            Self::File(path) => path.to_string_lossy().to_string(),
            Self::Memory { label, .. } => label.clone(),
        }
    }
}

/// One classpath root plus the storage-path scope of the lookup that found it.
#[derive(Debug, Clone)]
pub enum RootLocator {
    Directory { base: PathBuf, scope: String },
    Archive { source: ArchiveSource, scope: String },
}

impl RootLocator {
    pub fn directory(base: impl Into<PathBuf>) -> Self {
        Self::Directory {
            base: base.into(),
            scope: String::new(),
        }
    }

    pub fn archive(path: impl Into<PathBuf>) -> Self {
        Self::Archive {
            source: ArchiveSource::File(path.into()),
            scope: String::new(),
        }
    }

    pub fn in_memory_archive(label: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Archive {
            source: ArchiveSource::Memory {
                label: label.into(),
                bytes: bytes.into(),
            },
            scope: String::new(),
        }
    }

    /// Restricts the root to entries under `storage_prefix` (`a/b`, no trailing slash).
    pub fn scoped(self, storage_prefix: &str) -> Self {
        let prefix = storage_prefix.trim_matches('/').to_string();
        match self {
            Self::Directory { base, .. } => Self::Directory { base, scope: prefix },
            Self::Archive { source, .. } => Self::Archive {
                source,
                scope: prefix,
            },
        }
    }

    pub fn scope(&self) -> &str {
        match self {
            Self::Directory { scope, .. } | Self::Archive { scope, .. } => scope,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Directory { base, .. } => base.to_string_lossy().to_string(),
            Self::Archive { source, .. } => source.label(),
        }
    }
}

impl fmt::Display for RootLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Directory { .. } => "dir",
            Self::Archive { .. } => "archive",
        };
        if self.scope().is_empty() {
            write!(f, "{kind}:{}", self.label())
        } else {
            write!(f, "{kind}:{}!/{}", self.label(), self.scope())
        }
    }
}

/// Backing bytes of an open archive.
pub(crate) enum ArchiveBytes {
    Mapped(Mmap),
    Shared(Arc<[u8]>),
}

impl AsRef<[u8]> for ArchiveBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            Self::Mapped(mmap) => &mmap[..],
            Self::Shared(bytes) => &bytes[..],
        }
    }
}

pub(crate) type OpenArchive = ZipArchive<Cursor<ArchiveBytes>>;

pub(crate) fn open_archive(source: &ArchiveSource) -> Result<OpenArchive> {
    let bytes = match source {
        ArchiveSource::File(path) => ArchiveBytes::Mapped(map_file(path)?),
        ArchiveSource::Memory { bytes, .. } => ArchiveBytes::Shared(Arc::clone(bytes)),
    };
    ZipArchive::new(Cursor::new(bytes)).map_err(|source_err| DiscoveryError::Archive {
        root: source.label(),
        source: source_err,
    })
}

fn map_file(path: &Path) -> Result<Mmap> {
    let io_err = |source| DiscoveryError::Io {
        root: path.to_string_lossy().to_string(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    // SAFETY: The file is opened read-only and the map is owned by the archive reader,
    // which never outlives a single scan.
    unsafe { Mmap::map(&file) }.map_err(io_err)
}

/// True when `name` is `scope` itself or lies beneath it.
pub(crate) fn in_scope(name: &str, scope: &str) -> bool {
    if scope.is_empty() {
        return true;
    }
    match name.strip_prefix(scope) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_scope_respects_segment_boundaries() {
        assert!(in_scope("com/acme/Widget.class", ""));
        assert!(in_scope("com/acme/Widget.class", "com/acme"));
        assert!(in_scope("com/acme", "com/acme"));
        assert!(!in_scope("com/acmex/Widget.class", "com/acme"));
        assert!(!in_scope("org/acme/Widget.class", "com/acme"));
    }

    #[test]
    fn scoped_trims_slashes_and_display_shows_scope() {
        let root = RootLocator::archive("/tmp/lib.jar").scoped("/com/acme/");
        assert_eq!(root.scope(), "com/acme");
        assert_eq!(root.to_string(), "archive:/tmp/lib.jar!/com/acme");

        let dir = RootLocator::directory("/tmp/classes");
        assert_eq!(dir.to_string(), "dir:/tmp/classes");
    }

    #[test]
    fn open_archive_reports_garbage_as_archive_error() {
        let root = ArchiveSource::Memory {
            label: "garbage.jar".to_string(),
            bytes: Arc::from(&b"not a zip"[..]),
        };
        let err = open_archive(&root).err().unwrap();
        assert!(err.is_io());
        assert!(err.to_string().contains("garbage.jar"));
    }

    #[test]
    fn open_archive_reports_missing_file_as_io_error() {
        let missing = std::env::temp_dir().join(format!(
            "class_scanner_missing_{}.jar",
            std::process::id()
        ));
        let err = open_archive(&ArchiveSource::File(missing)).err().unwrap();
        assert!(matches!(err, DiscoveryError::Io { .. }));
    }
}
