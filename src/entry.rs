//! Entry-unit discovery.
//!
//! The reflective scan resolves every unit on the classpath and keeps those
//! exposing a `main` entry method. When that finds nothing, the build
//! descriptors (`native-image.properties`) are searched for an
//! `-H:Class=<name>` argument and each named unit is checked the same way.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, trace};

use crate::classpath::{Classpath, ResourceLookup};
use crate::error::{DiscoveryError, Result};
use crate::resolver::NamespaceResolver;
use crate::unit::{UnitInfo, package_of};

pub const DESCRIPTOR_FILE_NAME: &str = "native-image.properties";

const MAX_SUPER_DEPTH: usize = 64;

static ENTRY_CLASS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-H:Class\s*=\s*([\w.]+)").expect("entry class pattern is valid")
});

/// First `-H:Class=<name>` value in a descriptor.
pub fn parse_entry_class(content: &str) -> Option<String> {
    ENTRY_CLASS_PATTERN
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// A declared non-private entry method, or a public static one inherited
/// through the super-class chain.
pub fn is_entry_unit(lookup: &mut dyn ResourceLookup, unit: &UnitInfo) -> bool {
    if unit.declares_entry_method() {
        return true;
    }

    let mut visited = HashSet::from([unit.name.clone()]);
    let mut next = unit.super_name.clone();
    while let Some(name) = next {
        if visited.len() > MAX_SUPER_DEPTH || !visited.insert(name.clone()) {
            return false;
        }
        match lookup.resolve_unit(&name) {
            Ok(parent) if parent.declares_public_entry_method() => return true,
            Ok(parent) => next = parent.super_name,
            Err(e) => {
                trace!("super chain of {} stops at {name}: {e}", unit.name);
                return false;
            }
        }
    }
    false
}

/// Entry units named by build descriptors on the classpath.
pub fn recover_entry_units<C>(resolver: &NamespaceResolver, cp: &C) -> Result<HashSet<String>>
where
    C: Classpath + ?Sized,
{
    let mut descriptors: Vec<String> = resolver
        .find_resource_names(cp, None)?
        .into_iter()
        .filter(|name| name.ends_with(DESCRIPTOR_FILE_NAME))
        .collect();
    descriptors.sort();

    let mut lookup = cp.lookup();
    let mut units = HashSet::new();
    for descriptor in descriptors {
        let candidate = match read_candidate(lookup.as_mut(), &descriptor) {
            Ok(candidate) => candidate,
            Err(e) => {
                debug!("skipping descriptor: {e}");
                continue;
            }
        };
        match lookup.resolve_unit(&candidate) {
            Ok(unit) if is_entry_unit(lookup.as_mut(), &unit) => {
                debug!("{descriptor} names entry unit {candidate}");
                units.insert(unit.name);
            }
            Ok(_) => debug!("{candidate} from {descriptor} has no entry method"),
            Err(e) => debug!("skipping {candidate} from {descriptor}: {e}"),
        }
    }
    Ok(units)
}

fn read_candidate(lookup: &mut dyn ResourceLookup, descriptor: &str) -> Result<String> {
    let bytes = lookup.read_resource(descriptor)?;
    let content = String::from_utf8_lossy(&bytes);
    parse_entry_class(&content)
        .ok_or_else(|| DiscoveryError::DescriptorParseMiss(descriptor.to_string()))
}

/// Reflective scan first; descriptors only when it comes back empty.
pub fn find_entry_units<C>(resolver: &NamespaceResolver, cp: &C) -> Result<HashSet<String>>
where
    C: Classpath + ?Sized,
{
    let mut names: Vec<String> = resolver
        .find_all_unit_names_unfiltered(cp)?
        .into_iter()
        .collect();
    names.sort();

    let mut lookup = cp.lookup();
    let mut units = HashSet::new();
    for name in names {
        match lookup.resolve_unit(&name) {
            Ok(unit) if is_entry_unit(lookup.as_mut(), &unit) => {
                units.insert(unit.name);
            }
            Ok(_) => {}
            Err(e) => trace!("skipping {name}: {e}"),
        }
    }
    drop(lookup);

    if units.is_empty() {
        debug!("no entry unit found reflectively, falling back to {DESCRIPTOR_FILE_NAME}");
        return recover_entry_units(resolver, cp);
    }
    Ok(units)
}

pub fn find_entry_packages<C>(resolver: &NamespaceResolver, cp: &C) -> Result<HashSet<String>>
where
    C: Classpath + ?Sized,
{
    Ok(find_entry_units(resolver, cp)?
        .iter()
        .map(|name| package_of(name).to_string())
        .collect())
}
