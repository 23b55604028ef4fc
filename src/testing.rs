//! Test fixtures: hand-assembled class files and an in-memory classpath.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;
use zip::write::FileOptions;

use crate::classpath::Classpath;
use crate::error::{DiscoveryError, Result};
use crate::root::RootLocator;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_STATIC: u16 = 0x0008;

/// Minimal version 52 class file with bodiless methods.
pub fn class_bytes(name: &str, super_name: Option<&str>, methods: &[(u16, &str, &str)]) -> Vec<u8> {
    build_class(name, super_name, methods, &[])
}

/// Class file carrying runtime-visible annotations of the given dotted types.
pub fn annotated_class_bytes(name: &str, annotations: &[&str]) -> Vec<u8> {
    build_class(name, None, &[], annotations)
}

fn build_class(
    name: &str,
    super_name: Option<&str>,
    methods: &[(u16, &str, &str)],
    annotations: &[&str],
) -> Vec<u8> {
    let mut pool: Vec<Vec<u8>> = Vec::new();
    let utf8 = |pool: &mut Vec<Vec<u8>>, s: &str| -> u16 {
        let mut c = vec![1u8];
        c.extend_from_slice(&(s.len() as u16).to_be_bytes());
        c.extend_from_slice(s.as_bytes());
        pool.push(c);
        pool.len() as u16
    };
    let class = |pool: &mut Vec<Vec<u8>>, name_index: u16| -> u16 {
        let mut c = vec![7u8];
        c.extend_from_slice(&name_index.to_be_bytes());
        pool.push(c);
        pool.len() as u16
    };

    let this_name = utf8(&mut pool, &name.replace('.', "/"));
    let this_class = class(&mut pool, this_name);
    let super_class = match super_name {
        Some(s) => {
            let idx = utf8(&mut pool, &s.replace('.', "/"));
            class(&mut pool, idx)
        }
        None => 0,
    };
    let method_refs: Vec<(u16, u16, u16)> = methods
        .iter()
        .map(|(flags, n, d)| {
            let ni = utf8(&mut pool, n);
            let di = utf8(&mut pool, d);
            (*flags, ni, di)
        })
        .collect();
    let annotation_refs: Vec<u16> = annotations
        .iter()
        .map(|a| utf8(&mut pool, &format!("L{};", a.replace('.', "/"))))
        .collect();
    let attribute_name = if annotation_refs.is_empty() {
        0
    } else {
        utf8(&mut pool, "RuntimeVisibleAnnotations")
    };

    let mut out = Vec::new();
    out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&52u16.to_be_bytes());
    out.extend_from_slice(&((pool.len() + 1) as u16).to_be_bytes());
    for c in &pool {
        out.extend_from_slice(c);
    }
    out.extend_from_slice(&0x0021u16.to_be_bytes());
    out.extend_from_slice(&this_class.to_be_bytes());
    out.extend_from_slice(&super_class.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(method_refs.len() as u16).to_be_bytes());
    for (flags, ni, di) in method_refs {
        out.extend_from_slice(&flags.to_be_bytes());
        out.extend_from_slice(&ni.to_be_bytes());
        out.extend_from_slice(&di.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
    }
    if annotation_refs.is_empty() {
        out.extend_from_slice(&0u16.to_be_bytes());
    } else {
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&attribute_name.to_be_bytes());
        let length = 2 + 4 * annotation_refs.len() as u32;
        out.extend_from_slice(&length.to_be_bytes());
        out.extend_from_slice(&(annotation_refs.len() as u16).to_be_bytes());
        for type_index in annotation_refs {
            out.extend_from_slice(&type_index.to_be_bytes());
            out.extend_from_slice(&0u16.to_be_bytes());
        }
    }
    out
}

pub fn jar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Classpath made of in-memory archives, in lookup order.
#[derive(Default)]
pub struct MemoryClasspath {
    archives: Vec<(String, Arc<[u8]>)>,
    broken: Vec<String>,
}

impl MemoryClasspath {
    pub fn with_archive(mut self, label: &str, entries: &[(&str, &[u8])]) -> Self {
        self.archives
            .push((label.to_string(), Arc::from(jar_bytes(entries))));
        self
    }

    /// A root whose bytes are not a valid archive.
    pub fn with_broken_archive(mut self, label: &str) -> Self {
        self.broken.push(label.to_string());
        self
    }

    fn entries(&self, label: &str) -> Option<BTreeMap<String, Vec<u8>>> {
        let (_, bytes) = self.archives.iter().find(|(l, _)| l == label)?;
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).ok()?;
        let mut out = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).ok()?;
            let mut buf = Vec::new();
            std::io::Read::read_to_end(&mut file, &mut buf).ok()?;
            out.insert(file.name().to_string(), buf);
        }
        Some(out)
    }
}

impl Classpath for MemoryClasspath {
    fn roots(&self, storage_prefix: &str) -> Result<Vec<RootLocator>> {
        let mut roots: Vec<RootLocator> = self
            .archives
            .iter()
            .map(|(label, bytes)| {
                RootLocator::in_memory_archive(label.clone(), Arc::clone(bytes)).scoped(storage_prefix)
            })
            .collect();
        roots.extend(self.broken.iter().map(|label| {
            RootLocator::in_memory_archive(label.clone(), b"broken".to_vec()).scoped(storage_prefix)
        }));
        Ok(roots)
    }

    fn read_resource(&self, name: &str) -> Result<Vec<u8>> {
        for (label, _) in &self.archives {
            if let Some(content) = self.entries(label).and_then(|mut e| e.remove(name)) {
                return Ok(content);
            }
        }
        Err(DiscoveryError::ResourceNotFound(name.to_string()))
    }
}
