//! # class-scanner
//!
//! Discovers class and resource names on a JVM classpath so an ahead-of-time
//! compiler can register metadata for code it only reaches reflectively.
//!
//! ## Architecture
//!
//! - **root**: Classpath roots (directory trees and jar archives) and archive opening
//! - **walk**: Uniform entry enumeration over one root
//! - **classpath**: The `Classpath` capability and its filesystem implementation
//! - **unit**: Class file descriptors and entry-method checks
//! - **resolver**: Package-scoped unit/resource discovery with synthetic-class filtering
//! - **entry**: Entry-point discovery, with the `native-image.properties` fallback
//! - **scan**: Classpath wildcard (`dir/*`) expansion
//! - **config**: Classpath and resolver settings for the CLI
//! - **logging**: tracing subscriber setup

pub mod classpath;
pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod root;
pub mod scan;
pub mod unit;
pub mod walk;

#[cfg(test)]
pub(crate) mod testing;

pub use classpath::{Classpath, FsClasspath};
pub use error::DiscoveryError;
pub use resolver::{NamespaceResolver, SyntheticFilter};
pub use root::RootLocator;
