//! Uniform entry enumeration over one classpath root.
//!
//! A directory root is traversed with `ignore` (all filters off), an archive
//! root is iterated entry by entry. Both yield [`Entry`] values whose path is
//! relative to the classpath root, so a unit's qualified name can always be
//! recovered from the path alone.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::error::{DiscoveryError, Result};
use crate::root::{OpenArchive, RootLocator, in_scope, open_archive};

pub const UNIT_SUFFIX: &str = ".class";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    pub path: String,
    pub is_unit: bool,
}

impl Entry {
    fn new(path: String) -> Self {
        let is_unit = path.ends_with(UNIT_SUFFIX);
        Self { path, is_unit }
    }
}

/// Lazy walk over one root. Dropping it releases any open archive.
///
/// Archive entries are listed without decompressing them, so an entry stored
/// with a method this build cannot inflate is still reported.
pub struct Walk {
    root: String,
    inner: WalkInner,
    done: bool,
}

enum WalkInner {
    Directory {
        base: PathBuf,
        walker: ignore::Walk,
    },
    Archive {
        archive: OpenArchive,
        next: usize,
        scope: String,
    },
}

pub fn walk(root: &RootLocator) -> Result<Walk> {
    let inner = match root {
        RootLocator::Directory { base, scope } => {
            let start = scope
                .split('/')
                .filter(|s| !s.is_empty())
                .fold(base.clone(), |p, segment| p.join(segment));
            let meta = std::fs::metadata(&start).map_err(|source| DiscoveryError::Io {
                root: root.to_string(),
                source,
            })?;
            if !meta.is_dir() {
                return Err(DiscoveryError::Io {
                    root: root.to_string(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotADirectory,
                        format!("{} is not a directory", start.display()),
                    ),
                });
            }
            let walker = WalkBuilder::new(&start)
                .hidden(false)
                .ignore(false)
                .parents(false)
                .git_ignore(false)
                .git_global(false)
                .git_exclude(false)
                .follow_links(true)
                .build();
            WalkInner::Directory {
                base: base.clone(),
                walker,
            }
        }
        RootLocator::Archive { source, scope } => WalkInner::Archive {
            archive: open_archive(source)?,
            next: 0,
            scope: scope.clone(),
        },
    };

    Ok(Walk {
        root: root.to_string(),
        inner,
        done: false,
    })
}

impl Walk {
    fn advance(&mut self) -> Option<Result<Entry>> {
        match &mut self.inner {
            WalkInner::Directory { base, walker } => loop {
                let dent = match walker.next()? {
                    Ok(dent) => dent,
                    Err(source) => {
                        return Some(Err(DiscoveryError::Walk {
                            root: self.root.clone(),
                            source,
                        }));
                    }
                };
                if !dent.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                if let Some(path) = relative_storage_path(base, dent.path()) {
                    return Some(Ok(Entry::new(path)));
                }
            },
            WalkInner::Archive {
                archive,
                next,
                scope,
            } => loop {
                if *next >= archive.len() {
                    return None;
                }
                let index = *next;
                *next += 1;
                let file = match archive.by_index_raw(index) {
                    Ok(file) => file,
                    Err(source) => {
                        return Some(Err(DiscoveryError::Archive {
                            root: self.root.clone(),
                            source,
                        }));
                    }
                };
                if file.is_dir() || !in_scope(file.name(), scope) {
                    continue;
                }
                return Some(Ok(Entry::new(file.name().to_string())));
            },
        }
    }
}

impl Iterator for Walk {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.advance();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

fn relative_storage_path(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
