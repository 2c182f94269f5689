use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Resolve a relative path by walking parent directories up from the CWD
/// until a matching entry exists. Absolute paths are returned unchanged, as
/// is the input when nothing matches (so the caller's existence check can
/// produce the error message).
pub fn resolve_existing_path_upwards(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut dir: Option<&Path> = Some(cwd.as_path());
    while let Some(d) = dir {
        let candidate = d.join(path);
        if candidate.exists() {
            return candidate;
        }
        dir = d.parent();
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_matches_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn absolute_paths_resolve_to_themselves() {
        let p = Path::new("/definitely/not/a/real/path");
        assert_eq!(resolve_existing_path_upwards(p), p.to_path_buf());
    }

    #[test]
    fn unresolvable_relative_paths_come_back_unchanged() {
        let p = Path::new("no-such-entry-l528-harness");
        assert_eq!(resolve_existing_path_upwards(p), p.to_path_buf());
    }
}
