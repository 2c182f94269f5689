use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::toolchain::ExecResult;

/// Separator between captured stdout and stderr inside an output artifact.
pub const STDERR_SEPARATOR: &[u8] = b"\n--- STDERR ---\n";

/// Banner prepended to an artifact when the compile step failed and the
/// program was never run.
pub const COMPILE_ERROR_BANNER: &[u8] = b"COMPILE ERROR:\n";

/// Serialize one captured result into the on-disk artifact format:
/// stdout, separator, stderr.
pub fn artifact_bytes(result: &ExecResult) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        result.stdout.len() + STDERR_SEPARATOR.len() + result.stderr.len(),
    );
    out.extend_from_slice(&result.stdout);
    out.extend_from_slice(STDERR_SEPARATOR);
    out.extend_from_slice(&result.stderr);
    out
}

/// Artifact for a case whose compile step failed: the compiler's own streams
/// behind a banner, so the difference is visible in the artifact itself.
pub fn compile_failure_artifact_bytes(compile: &ExecResult) -> Vec<u8> {
    let mut out = COMPILE_ERROR_BANNER.to_vec();
    out.extend_from_slice(&artifact_bytes(compile));
    out
}

/// Path of the artifact for `file_name` under `dir` (`<file_name>.out`).
pub fn artifact_path(dir: &Path, file_name: &str) -> PathBuf {
    dir.join(format!("{file_name}.out"))
}

pub fn write_artifact(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<()> {
    let path = artifact_path(dir, file_name);
    std::fs::write(&path, bytes).with_context(|| format!("write artifact: {}", path.display()))
}

/// Per-corpus verdict of the differential comparison.
#[derive(Debug, Clone)]
pub struct CorpusReport {
    pub total: usize,
    pub identical: usize,
    pub different: usize,
    pub differing: Vec<String>,
}

impl CorpusReport {
    pub fn any_different(&self) -> bool {
        self.different > 0
    }
}

/// Compare the persisted interpreter and compile+run artifacts for every
/// corpus file, byte for byte.
///
/// This deliberately knows nothing about directives: its verdict is pure
/// text equality, catching silent divergence between the backends even when
/// neither reports a failure. A missing artifact on either side counts as a
/// difference, not an error.
pub fn compare_corpus(names: &[String], exec_dir: &Path, comp_dir: &Path) -> CorpusReport {
    let mut identical = 0;
    let mut differing = Vec::new();

    for name in names {
        let exec_out = std::fs::read(artifact_path(exec_dir, name));
        let comp_out = std::fs::read(artifact_path(comp_dir, name));
        match (exec_out, comp_out) {
            (Ok(a), Ok(b)) if a == b => identical += 1,
            _ => differing.push(name.clone()),
        }
    }

    CorpusReport {
        total: names.len(),
        identical,
        different: differing.len(),
        differing,
    }
}
