use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// Captured output of one external process invocation.
#[derive(Debug, Clone)]
pub struct ExecResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Process exit code. Signal-terminated children report -1.
    pub exit_code: i32,
}

impl ExecResult {
    pub fn failed(&self) -> bool {
        self.exit_code != 0
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Wrapper around the external l528 toolchain binary.
///
/// Every invocation spawns one process and blocks until it exits. No timeout
/// is enforced: a hung toolchain blocks the corresponding phase.
#[derive(Debug, Clone)]
pub struct Toolchain {
    bin: PathBuf,
}

impl Toolchain {
    pub fn new(bin: PathBuf) -> Self {
        Toolchain { bin }
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }

    /// Interpret a program (`--exec`). Program output and directive lines
    /// both arrive on stdout.
    pub fn interpret(&self, input: &Path, argv: Option<&str>) -> Result<ExecResult> {
        let mut args = vec!["--exec".to_string(), format!("--input={}", input.display())];
        if let Some(argv) = argv {
            args.push(format!("--argv={argv}"));
        }
        capture(&self.bin, &args)
    }

    /// Parse a program without executing it (`--parse`). A nonzero exit code
    /// signals a syntax error.
    pub fn parse_only(&self, input: &Path) -> Result<ExecResult> {
        let args = vec!["--parse".to_string(), format!("--input={}", input.display())];
        capture(&self.bin, &args)
    }

    /// Compile a program to an executable artifact (`--comp-e2e`). A nonzero
    /// exit code signals a compile-time error; the captured streams are the
    /// compiler's diagnostics, not the program's output.
    pub fn compile(&self, input: &Path, artifact: &Path) -> Result<ExecResult> {
        let args = vec![
            "--comp-e2e".to_string(),
            format!("--input={}", input.display()),
            format!("--output={}", artifact.display()),
        ];
        capture(&self.bin, &args)
    }
}

/// Run a compiled artifact directly, passing runtime arguments through.
pub fn run_artifact(artifact: &Path, args: &[String]) -> Result<ExecResult> {
    capture(artifact, args)
}

fn capture(program: &Path, args: &[String]) -> Result<ExecResult> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("exec {}", program.display()))?;
    Ok(ExecResult {
        stdout: output.stdout,
        stderr: output.stderr,
        exit_code: output.status.code().unwrap_or(-1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn run_artifact_captures_streams_and_exit_code() {
        let res = run_artifact(
            Path::new("/bin/sh"),
            &[
                "-c".to_string(),
                "echo out; echo err 1>&2; exit 3".to_string(),
            ],
        )
        .unwrap();
        assert_eq!(res.stdout, b"out\n");
        assert_eq!(res.stderr, b"err\n");
        assert_eq!(res.exit_code, 3);
        assert!(res.failed());
    }

    #[test]
    fn missing_binary_surfaces_as_error() {
        let res = run_artifact(Path::new("/nonexistent/l528-toolchain"), &[]);
        assert!(res.is_err());
    }
}
