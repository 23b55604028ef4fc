//! Namespace-scoped discovery of unit and resource names.
//!
//! Every query asks the [`Classpath`] for the roots registered under a storage
//! prefix, walks each root and turns the observed entry paths into names.
//! Nothing is cached: two calls against an unchanged classpath walk it twice
//! and return equal sets.

use rayon::prelude::*;
use std::collections::HashSet;
use tracing::debug;

use crate::classpath::{Classpath, ResourceLookup};
use crate::error::Result;
use crate::root::RootLocator;
use crate::unit::UnitInfo;
use crate::walk::{UNIT_SUFFIX, walk};

/// Annotation marking a Spring Boot application class.
pub const SPRING_BOOT_APPLICATION: &str =
    "org.springframework.boot.autoconfigure.SpringBootApplication";

/// Marks unit names produced by an upstream code generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticFilter {
    markers: Vec<String>,
}

impl Default for SyntheticFilter {
    fn default() -> Self {
        Self::new(["__"])
    }
}

impl SyntheticFilter {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(Into::<String>::into)
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn is_synthetic(&self, name: &str) -> bool {
        self.markers.iter().any(|m| name.contains(m.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Unit,
    Resource,
}

#[derive(Debug, Clone, Default)]
pub struct NamespaceResolver {
    filter: SyntheticFilter,
    parallel_roots: bool,
}

impl NamespaceResolver {
    pub fn new(filter: SyntheticFilter) -> Self {
        Self {
            filter,
            parallel_roots: false,
        }
    }

    /// Walk the roots of one query on the rayon pool instead of in sequence.
    pub fn with_parallel_roots(mut self, parallel: bool) -> Self {
        self.parallel_roots = parallel;
        self
    }

    pub fn filter(&self) -> &SyntheticFilter {
        &self.filter
    }

    pub fn find_unit_names<C, I, S>(&self, cp: &C, prefixes: I) -> Result<HashSet<String>>
    where
        C: Classpath + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = HashSet::new();
        for prefix in prefixes {
            names.extend(self.collect(cp, prefix.as_ref(), EntryKind::Unit, true)?);
        }
        Ok(names)
    }

    pub fn find_all_unit_names<C>(&self, cp: &C) -> Result<HashSet<String>>
    where
        C: Classpath + ?Sized,
    {
        self.collect(cp, "", EntryKind::Unit, true)
    }

    /// Every unit name on the classpath, synthetic ones included.
    pub fn find_all_unit_names_unfiltered<C>(&self, cp: &C) -> Result<HashSet<String>>
    where
        C: Classpath + ?Sized,
    {
        self.collect(cp, "", EntryKind::Unit, false)
    }

    /// Storage paths of every non-unit entry under `prefix` (all of them for `None`).
    pub fn find_resource_names<C>(&self, cp: &C, prefix: Option<&str>) -> Result<HashSet<String>>
    where
        C: Classpath + ?Sized,
    {
        self.collect(cp, prefix.unwrap_or(""), EntryKind::Resource, false)
    }

    pub fn is_present<C>(&self, cp: &C, name: &str) -> bool
    where
        C: Classpath + ?Sized,
    {
        cp.resolve_unit(name).is_ok()
    }

    /// Resolves every filtered unit under `prefixes` and keeps those matching `predicate`.
    pub fn find_units<C, I, S, P>(&self, cp: &C, prefixes: I, predicate: P) -> Result<Vec<UnitInfo>>
    where
        C: Classpath + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        P: Fn(&UnitInfo) -> bool,
    {
        let names = self.find_unit_names(cp, prefixes)?;
        Ok(select_units(cp, names, predicate))
    }

    /// Like [`find_units`](Self::find_units) over the whole classpath, synthetic units included.
    pub fn find_all_units<C, P>(&self, cp: &C, predicate: P) -> Result<Vec<UnitInfo>>
    where
        C: Classpath + ?Sized,
        P: Fn(&UnitInfo) -> bool,
    {
        let names = self.find_all_unit_names_unfiltered(cp)?;
        Ok(select_units(cp, names, predicate))
    }

    /// Units anywhere on the classpath carrying the runtime-visible annotation `type_name`.
    pub fn find_annotated_units<C>(&self, cp: &C, type_name: &str) -> Result<Vec<UnitInfo>>
    where
        C: Classpath + ?Sized,
    {
        self.find_all_units(cp, |unit| unit.has_annotation(type_name))
    }

    fn collect<C>(
        &self,
        cp: &C,
        prefix: &str,
        kind: EntryKind,
        filtered: bool,
    ) -> Result<HashSet<String>>
    where
        C: Classpath + ?Sized,
    {
        let roots = cp.roots(&storage_prefix(prefix))?;
        if self.parallel_roots {
            roots
                .par_iter()
                .map(|root| self.collect_root(root, kind, filtered))
                .try_reduce(HashSet::new, |mut acc, part| {
                    acc.extend(part);
                    Ok(acc)
                })
        } else {
            let mut names = HashSet::new();
            for root in &roots {
                names.extend(self.collect_root(root, kind, filtered)?);
            }
            Ok(names)
        }
    }

    fn collect_root(
        &self,
        root: &RootLocator,
        kind: EntryKind,
        filtered: bool,
    ) -> Result<HashSet<String>> {
        let mut names = HashSet::new();
        let mut seen = 0usize;
        for entry in walk(root)? {
            let entry = entry?;
            seen += 1;
            match kind {
                EntryKind::Resource if !entry.is_unit => {
                    names.insert(entry.path);
                }
                EntryKind::Unit if entry.is_unit => {
                    let Some(name) = qualified_name(&entry.path) else {
                        continue;
                    };
                    if filtered && self.filter.is_synthetic(&name) {
                        continue;
                    }
                    names.insert(name);
                }
                _ => {}
            }
        }
        debug!("walked {root}: {seen} entries, {} kept", names.len());
        Ok(names)
    }
}

fn select_units<C, P>(cp: &C, names: HashSet<String>, predicate: P) -> Vec<UnitInfo>
where
    C: Classpath + ?Sized,
    P: Fn(&UnitInfo) -> bool,
{
    let mut names: Vec<String> = names.into_iter().collect();
    names.sort();

    let mut lookup = cp.lookup();
    let mut units = Vec::new();
    for name in names {
        match lookup.resolve_unit(&name) {
            Ok(unit) if predicate(&unit) => units.push(unit),
            Ok(_) => {}
            Err(e) => debug!("skipping {name}: {e}"),
        }
    }
    units
}

/// `com.acme` -> `com/acme`; `""` stays empty.
pub fn storage_prefix(namespace: &str) -> String {
    namespace
        .trim_matches(|c: char| c == '.' || c == '/')
        .replace('.', "/")
}

/// `com/acme/Widget.class` -> `com.acme.Widget`; `None` for non-unit paths.
pub fn qualified_name(storage_path: &str) -> Option<String> {
    let stem = storage_path.strip_suffix(UNIT_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }
    Some(stem.replace(['/', '\\'], "."))
}
