use anyhow::{Context, Result};
use std::collections::HashSet;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::resolver::{NamespaceResolver, SyntheticFilter};
use crate::scan::expand_classpath_entry;

pub const CLASSPATH_ENV: &str = "CLASSPATH";

pub fn resolve_classpath(cli: &Cli) -> Result<Vec<PathBuf>> {
    let raw: OsString = match cli.classpath.clone() {
        Some(cp) => cp.into(),
        None => env::var_os(CLASSPATH_ENV)
            .filter(|v| !v.is_empty())
            .context("No classpath given (use --classpath or set CLASSPATH)")?,
    };
    expand_classpath(&raw)
}

/// Splits a platform path list, expands `~` and `dir/*`, and drops repeats.
pub fn expand_classpath(raw: &OsString) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for element in env::split_paths(raw) {
        if element.as_os_str().is_empty() {
            continue;
        }
        for path in expand_classpath_entry(&expand_home(&element))? {
            if seen.insert(path.clone()) {
                out.push(path);
            }
        }
    }
    Ok(out)
}

pub fn resolve_resolver(cli: &Cli) -> NamespaceResolver {
    let filter = if cli.synthetic_markers.is_empty() {
        SyntheticFilter::default()
    } else {
        SyntheticFilter::new(cli.synthetic_markers.iter().cloned())
    };
    NamespaceResolver::new(filter).with_parallel_roots(cli.parallel)
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn expand_classpath_splits_and_dedupes() {
        let joined = env::join_paths(["/a/classes", "/b/lib.jar", "/a/classes"]).unwrap();
        let paths = expand_classpath(&joined).unwrap();
        assert_eq!(
            paths,
            vec![PathBuf::from("/a/classes"), PathBuf::from("/b/lib.jar")]
        );
    }

    #[test]
    fn expand_home_only_touches_leading_tilde() {
        assert_eq!(expand_home(Path::new("/opt/~x")), PathBuf::from("/opt/~x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/lib.jar")), home.join("lib.jar"));
        }
    }

    #[test]
    fn resolver_uses_cli_markers() {
        let cli = Cli::parse_from([
            "class-scanner",
            "--synthetic-marker",
            "$$",
            "--parallel",
            "all-units",
        ]);
        let resolver = resolve_resolver(&cli);
        assert_eq!(resolver.filter().markers(), &["$$".to_string()]);

        let cli = Cli::parse_from(["class-scanner", "all-units"]);
        assert_eq!(resolve_resolver(&cli).filter(), &SyntheticFilter::default());
    }

    #[test]
    fn flag_wins_over_environment() {
        let cli = Cli::parse_from(["class-scanner", "--classpath", "/x/classes", "all-units"]);
        assert_eq!(
            resolve_classpath(&cli).unwrap(),
            vec![PathBuf::from("/x/classes")]
        );
    }
}
