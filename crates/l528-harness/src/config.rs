use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::toolchain::Toolchain;
use crate::util;

/// Flags shared by every suite. No process-wide state: the resolved paths are
/// passed into the suite and the verdict comes back as a report value.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Path to the l528 toolchain binary. Relative paths are resolved
    /// upwards from the CWD.
    #[arg(long, value_name = "PATH", default_value = "output")]
    pub toolchain: PathBuf,

    /// Corpus directory of .src programs. Relative paths are resolved
    /// upwards from the CWD.
    #[arg(long, value_name = "DIR", default_value = "examples")]
    pub corpus: PathBuf,

    /// Scratch directory for compiled executables and captured output.
    #[arg(long, value_name = "DIR", default_value = "target/l528-harness")]
    pub scratch: PathBuf,

    /// Write a machine-readable JSON report to this path.
    #[arg(long, value_name = "PATH")]
    pub report_out: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct HarnessPaths {
    pub toolchain: Toolchain,
    pub corpus_dir: PathBuf,
    pub scratch_dir: PathBuf,
}

impl CommonArgs {
    pub fn resolve(&self) -> Result<HarnessPaths> {
        let toolchain_bin = util::resolve_existing_path_upwards(&self.toolchain);
        if !toolchain_bin.is_file() {
            anyhow::bail!(
                "toolchain binary not found: {} (pass --toolchain <path>)",
                self.toolchain.display()
            );
        }

        let corpus_dir = util::resolve_existing_path_upwards(&self.corpus);
        if !corpus_dir.is_dir() {
            anyhow::bail!(
                "corpus directory not found: {} (pass --corpus <dir>)",
                self.corpus.display()
            );
        }

        std::fs::create_dir_all(&self.scratch)
            .with_context(|| format!("create scratch dir: {}", self.scratch.display()))?;

        Ok(HarnessPaths {
            toolchain: Toolchain::new(toolchain_bin),
            corpus_dir,
            scratch_dir: self.scratch.clone(),
        })
    }
}
