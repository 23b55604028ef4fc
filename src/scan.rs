use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

const ARCHIVE_EXTENSION: &str = "jar";

/// Jar files directly inside `dir`, sorted by path.
pub fn scan_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("classpath wildcard directory not found: {}", dir.display());
    }
    let (tx, rx) = mpsc::channel();

    let walker = WalkBuilder::new(dir)
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .max_depth(Some(1))
        .build_parallel();

    walker.run(|| {
        let tx = tx.clone();
        Box::new(move |entry| {
            if let Ok(entry) = entry {
                let path = entry.path();
                if entry.file_type().is_some_and(|t| t.is_file()) && is_archive(path) {
                    let _ = tx.send(path.to_path_buf());
                }
            }
            ignore::WalkState::Continue
        })
    });

    drop(tx);
    let mut jars: Vec<PathBuf> = rx.iter().collect();
    jars.sort();
    Ok(jars)
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

/// Expands one classpath element: `dir/*` becomes the jars inside `dir`.
pub fn expand_classpath_entry(entry: &Path) -> Result<Vec<PathBuf>> {
    if entry.file_name().is_some_and(|n| n == "*") {
        let dir = entry
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        return scan_archives(dir)
            .with_context(|| format!("Failed to expand classpath wildcard {}", entry.display()));
    }
    Ok(vec![entry.to_path_buf()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(prefix: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "{prefix}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    #[test]
    fn wildcard_expands_to_sorted_top_level_jars() {
        let lib = temp_dir("class-scanner-scan");
        fs::create_dir_all(lib.join("nested")).unwrap();
        fs::write(lib.join("b.jar"), b"").unwrap();
        fs::write(lib.join("a.JAR"), b"").unwrap();
        fs::write(lib.join("notes.txt"), b"").unwrap();
        fs::write(lib.join("nested/c.jar"), b"").unwrap();

        let expanded = expand_classpath_entry(&lib.join("*")).unwrap();
        assert_eq!(expanded, vec![lib.join("a.JAR"), lib.join("b.jar")]);

        let _ = fs::remove_dir_all(lib);
    }

    #[test]
    fn plain_entries_pass_through() {
        let entry = PathBuf::from("/opt/app/classes");
        assert_eq!(expand_classpath_entry(&entry).unwrap(), vec![entry]);
    }

    #[test]
    fn wildcard_on_missing_directory_fails() {
        let missing = temp_dir("class-scanner-scan-missing").join("*");
        assert!(expand_classpath_entry(&missing).is_err());
    }
}
