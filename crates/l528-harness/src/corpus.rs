use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// File extension for l528 source programs.
pub const SOURCE_EXTENSION: &str = "src";

/// Enumerate the `.src` files directly under `dir`, sorted by path so every
/// run visits the corpus in the same order.
pub fn source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read corpus dir: {}", dir.display()))?;

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read corpus dir: {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
            continue;
        }
        out.push(path);
    }
    out.sort();
    Ok(out)
}

/// The corpus-facing name of a source file (its final path component).
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_temp_dir(prefix: &str) -> PathBuf {
        let base = std::env::temp_dir();
        let pid = std::process::id();
        for n in 0..10_000u32 {
            let p = base.join(format!("l528-corpus-{prefix}-{pid}-{n}"));
            if std::fs::create_dir(&p).is_ok() {
                return p;
            }
        }
        panic!("failed to create temp dir under {}", base.display());
    }

    #[test]
    fn discovers_only_src_files_sorted() {
        let root = make_temp_dir("discover");
        std::fs::write(root.join("b.src"), "").unwrap();
        std::fs::write(root.join("a.src"), "").unwrap();
        std::fs::write(root.join("notes.txt"), "").unwrap();
        std::fs::write(root.join("a.src.exit"), "").unwrap();
        std::fs::create_dir(root.join("sub.src")).unwrap();

        let got = source_files(&root).unwrap();
        let names: Vec<String> = got.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["a.src".to_string(), "b.src".to_string()]);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_corpus_dir_is_an_error() {
        let missing = std::env::temp_dir().join("l528-corpus-does-not-exist");
        assert!(source_files(&missing).is_err());
    }
}
