use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

/// Marker character for directive lines in program stdout (`#KIND#message`).
pub const DIRECTIVE_MARKER: char = '#';

/// Reserved prefix on the first line of a source file announcing that the
/// program is expected to fail at compile time.
pub const COMPILE_ERROR_PREFIX: &str = "@COMPILE_ERROR@";

/// A structured marker line embedded in a program's own output, instructing
/// the harness how to judge the run. Messages may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Informational passing check.
    Pass(String),
    /// Unconditional failing check.
    Fail(String),
    /// The program expects to terminate with a nonzero exit code.
    Expect(String),
}

/// Scan captured stdout for directive lines.
///
/// A directive line starts with [`DIRECTIVE_MARKER`] and splits on that same
/// marker into an empty prefix, a kind token, and a message. Unknown kind
/// tokens and malformed lines are ignored so that future directive kinds do
/// not break older harnesses.
pub fn extract_directives(stdout: &str) -> Vec<Directive> {
    let mut out = Vec::new();
    for line in stdout.lines() {
        if !line.starts_with(DIRECTIVE_MARKER) {
            continue;
        }
        let mut parts = line.splitn(3, DIRECTIVE_MARKER);
        let _empty_prefix = parts.next();
        let Some(kind) = parts.next() else {
            continue;
        };
        let Some(message) = parts.next() else {
            continue;
        };
        let message = message.trim().to_string();
        match kind {
            "PASS" => out.push(Directive::Pass(message)),
            "FAIL" => out.push(Directive::Fail(message)),
            "EXPECT" => out.push(Directive::Expect(message)),
            _ => {}
        }
    }
    out
}

/// Annotation on a source file saying the compiler is expected to reject it.
///
/// The message is advisory only: it is never compared against the actual
/// diagnostic text, only the compiler's exit status is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileErrorExpectation {
    pub message: String,
}

/// Peek at the first line of a source file for a [`COMPILE_ERROR_PREFIX`]
/// annotation. The rest of the file is never read.
pub fn compile_error_expectation(path: &Path) -> Result<Option<CompileErrorExpectation>> {
    let file =
        File::open(path).with_context(|| format!("open source file: {}", path.display()))?;
    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .with_context(|| format!("read first line: {}", path.display()))?;
    let Some(rest) = first_line.strip_prefix(COMPILE_ERROR_PREFIX) else {
        return Ok(None);
    };
    Ok(Some(CompileErrorExpectation {
        message: rest.trim().to_string(),
    }))
}
