//! The classpath capability every discovery call receives explicitly.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::result::ZipError;

use crate::error::{DiscoveryError, Result};
use crate::root::{ArchiveSource, OpenArchive, RootLocator, open_archive};
use crate::unit::{UnitInfo, unit_storage_path};

pub trait Classpath: Sync {
    /// Every root that holds something under `storage_prefix` (`""` for all roots).
    fn roots(&self, storage_prefix: &str) -> Result<Vec<RootLocator>>;

    /// Content of the first resource named `name`, in classpath order.
    fn read_resource(&self, name: &str) -> Result<Vec<u8>>;

    fn resolve_unit(&self, name: &str) -> Result<UnitInfo> {
        resolve_from(name, self.read_resource(&unit_storage_path(name)))
    }

    /// Lookup handle for one discovery call. Storage it opens stays open until
    /// the handle is dropped.
    fn lookup(&self) -> Box<dyn ResourceLookup + '_> {
        Box::new(DirectLookup(self))
    }
}

/// Resource reads that share opened storage across many lookups.
pub trait ResourceLookup {
    fn read_resource(&mut self, name: &str) -> Result<Vec<u8>>;

    fn resolve_unit(&mut self, name: &str) -> Result<UnitInfo> {
        let bytes = self.read_resource(&unit_storage_path(name));
        resolve_from(name, bytes)
    }
}

struct DirectLookup<'a, C: ?Sized>(&'a C);

impl<C: Classpath + ?Sized> ResourceLookup for DirectLookup<'_, C> {
    fn read_resource(&mut self, name: &str) -> Result<Vec<u8>> {
        self.0.read_resource(name)
    }
}

fn resolve_from(name: &str, bytes: Result<Vec<u8>>) -> Result<UnitInfo> {
    match bytes {
        Ok(bytes) => UnitInfo::parse(name, bytes),
        Err(DiscoveryError::ResourceNotFound(_)) => {
            Err(DiscoveryError::unresolved(name, "not on classpath"))
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClasspathEntry {
    Directory(PathBuf),
    Archive(PathBuf),
}

impl ClasspathEntry {
    /// Anything that is not an existing directory is treated as an archive, so a
    /// missing path fails loudly when it is opened instead of being skipped.
    pub fn classify(path: PathBuf) -> Self {
        if path.is_dir() {
            Self::Directory(path)
        } else {
            Self::Archive(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(p) | Self::Archive(p) => p,
        }
    }
}

/// Directories and jar files on the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsClasspath {
    entries: Vec<ClasspathEntry>,
}

impl FsClasspath {
    /// Builds a classpath in lookup order; a path listed twice is kept once.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut seen = HashSet::new();
        let entries = paths
            .into_iter()
            .map(Into::<PathBuf>::into)
            .filter(|p| seen.insert(p.clone()))
            .map(ClasspathEntry::classify)
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }
}

impl Classpath for FsClasspath {
    fn roots(&self, storage_prefix: &str) -> Result<Vec<RootLocator>> {
        let prefix = storage_prefix.trim_matches('/');
        let mut roots = Vec::new();
        for entry in &self.entries {
            match entry {
                ClasspathEntry::Directory(base) => {
                    if prefix.is_empty() || base.join(prefix).is_dir() {
                        roots.push(RootLocator::directory(base).scoped(prefix));
                    }
                }
                ClasspathEntry::Archive(path) => {
                    roots.push(RootLocator::archive(path).scoped(prefix));
                }
            }
        }
        Ok(roots)
    }

    fn read_resource(&self, name: &str) -> Result<Vec<u8>> {
        self.open_lookup().read_resource(name)
    }

    fn lookup(&self) -> Box<dyn ResourceLookup + '_> {
        Box::new(self.open_lookup())
    }
}

impl FsClasspath {
    pub fn open_lookup(&self) -> FsLookup<'_> {
        FsLookup {
            entries: &self.entries,
            archives: HashMap::new(),
        }
    }
}

/// Reads resources from an [`FsClasspath`], opening each archive at most once.
pub struct FsLookup<'a> {
    entries: &'a [ClasspathEntry],
    archives: HashMap<usize, OpenArchive>,
}

impl FsLookup<'_> {
    /// Archives opened so far.
    pub fn open_archives(&self) -> usize {
        self.archives.len()
    }
}

impl ResourceLookup for FsLookup<'_> {
    fn read_resource(&mut self, name: &str) -> Result<Vec<u8>> {
        let entries = self.entries;
        for (index, entry) in entries.iter().enumerate() {
            match entry {
                ClasspathEntry::Directory(base) => {
                    let path = base.join(name);
                    if !path.is_file() {
                        continue;
                    }
                    return std::fs::read(&path).map_err(|source| DiscoveryError::Io {
                        root: base.to_string_lossy().to_string(),
                        source,
                    });
                }
                ClasspathEntry::Archive(path) => {
                    let label = || path.to_string_lossy().to_string();
                    let archive = match self.archives.entry(index) {
                        Entry::Occupied(open) => open.into_mut(),
                        Entry::Vacant(slot) => {
                            slot.insert(open_archive(&ArchiveSource::File(path.clone()))?)
                        }
                    };
                    let mut file = match archive.by_name(name) {
                        Ok(file) => file,
                        Err(ZipError::FileNotFound) => continue,
                        Err(source) => {
                            return Err(DiscoveryError::Archive {
                                root: label(),
                                source,
                            });
                        }
                    };
                    let mut buf = Vec::new();
                    file.read_to_end(&mut buf)
                        .map_err(|source| DiscoveryError::Io {
                            root: label(),
                            source,
                        })?;
                    return Ok(buf);
                }
            }
        }
        Err(DiscoveryError::ResourceNotFound(name.to_string()))
    }
}
