//! Loadable unit descriptors parsed from class files.

use ristretto_classfile::attributes::Attribute;
use ristretto_classfile::{ClassFile, MethodAccessFlags};
use std::io::Cursor;

use crate::error::{DiscoveryError, Result};
use crate::walk::UNIT_SUFFIX;

const ENTRY_METHOD_NAME: &str = "main";
const ENTRY_DESCRIPTORS: [&str; 2] = ["([Ljava/lang/String;)V", "()V"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    pub descriptor: String,
    pub is_public: bool,
    pub is_static: bool,
    pub is_private: bool,
}

impl MethodInfo {
    /// `void main()` or `void main(String[])`, any modifiers.
    pub fn has_entry_shape(&self) -> bool {
        self.name == ENTRY_METHOD_NAME && ENTRY_DESCRIPTORS.contains(&self.descriptor.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitInfo {
    pub name: String,
    pub super_name: Option<String>,
    pub methods: Vec<MethodInfo>,
    /// Runtime-visible class annotations, as dotted type names.
    pub annotations: Vec<String>,
}

impl UnitInfo {
    /// Parses class file bytes, rejecting a file whose declared name differs from `expected`.
    pub fn parse(expected: &str, bytes: Vec<u8>) -> Result<Self> {
        let class = ClassFile::from_bytes(&mut Cursor::new(bytes))
            .map_err(|e| DiscoveryError::unresolved(expected, format!("malformed class file: {e:?}")))?;
        let pool = &class.constant_pool;

        let declared = pool
            .try_get_class(class.this_class)
            .map_err(|e| DiscoveryError::unresolved(expected, format!("bad this_class: {e:?}")))?
            .to_string()
            .replace('/', ".");
        if declared != expected {
            return Err(DiscoveryError::unresolved(
                expected,
                format!("class file declares {declared}"),
            ));
        }

        let super_name = if class.super_class == 0 {
            None
        } else {
            let name = pool
                .try_get_class(class.super_class)
                .map_err(|e| DiscoveryError::unresolved(expected, format!("bad super_class: {e:?}")))?;
            Some(name.to_string().replace('/', "."))
        };

        let mut methods = Vec::with_capacity(class.methods.len());
        for method in &class.methods {
            let name = pool
                .try_get_utf8(method.name_index)
                .map_err(|e| DiscoveryError::unresolved(expected, format!("bad method name: {e:?}")))?;
            let descriptor = pool.try_get_utf8(method.descriptor_index).map_err(|e| {
                DiscoveryError::unresolved(expected, format!("bad method descriptor: {e:?}"))
            })?;
            methods.push(MethodInfo {
                name: name.to_string(),
                descriptor: descriptor.to_string(),
                is_public: method.access_flags.contains(MethodAccessFlags::PUBLIC),
                is_static: method.access_flags.contains(MethodAccessFlags::STATIC),
                is_private: method.access_flags.contains(MethodAccessFlags::PRIVATE),
            });
        }

        let mut annotations = Vec::new();
        for attribute in &class.attributes {
            let Attribute::RuntimeVisibleAnnotations {
                annotations: visible,
                ..
            } = attribute
            else {
                continue;
            };
            for annotation in visible {
                let descriptor = pool.try_get_utf8(annotation.type_index).map_err(|e| {
                    DiscoveryError::unresolved(expected, format!("bad annotation type: {e:?}"))
                })?;
                if let Some(name) = descriptor_type_name(descriptor) {
                    annotations.push(name);
                }
            }
        }

        Ok(Self {
            name: declared,
            super_name,
            methods,
            annotations,
        })
    }

    pub fn has_annotation(&self, type_name: &str) -> bool {
        self.annotations.iter().any(|a| a == type_name)
    }

    pub fn package(&self) -> &str {
        package_of(&self.name)
    }

    /// Public static entry method, the form that is also visible on subclasses.
    pub fn declares_public_entry_method(&self) -> bool {
        self.methods
            .iter()
            .any(|m| m.has_entry_shape() && m.is_public && m.is_static)
    }

    /// Any non-private entry method declared directly on this unit.
    pub fn declares_entry_method(&self) -> bool {
        self.methods
            .iter()
            .any(|m| m.has_entry_shape() && !m.is_private)
    }
}

/// `Lcom/acme/Tag;` -> `com.acme.Tag`.
fn descriptor_type_name(descriptor: &str) -> Option<String> {
    let internal = descriptor.strip_prefix('L')?.strip_suffix(';')?;
    Some(internal.replace('/', "."))
}

pub fn unit_storage_path(name: &str) -> String {
    format!("{}{UNIT_SUFFIX}", name.replace('.', "/"))
}

pub fn package_of(name: &str) -> &str {
    name.rsplit_once('.').map(|(pkg, _)| pkg).unwrap_or("")
}
