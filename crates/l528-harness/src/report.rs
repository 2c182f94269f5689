use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::judge::{Check, CheckKind, Outcome};

pub const E2E_REPORT_SCHEMA_VERSION: &str = "l528.harness.e2e@0.1.0";
pub const INTEGRATION_REPORT_SCHEMA_VERSION: &str = "l528.harness.integration@0.1.0";
pub const ACCEPTANCE_REPORT_SCHEMA_VERSION: &str = "l528.harness.acceptance@0.1.0";

const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_RED: &str = "\x1b[31m";
const ANSI_RESET: &str = "\x1b[0m";

fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn green(text: &str) -> String {
    paint(ANSI_GREEN, text)
}

pub fn red(text: &str) -> String {
    paint(ANSI_RED, text)
}

fn paint(color: &str, text: &str) -> String {
    if color_enabled() {
        format!("{color}{text}{ANSI_RESET}")
    } else {
        text.to_string()
    }
}

/// Per-case verdict line.
pub fn case_banner(name: &str, passed: bool) -> String {
    if passed {
        format!("{} {name}", green("PASS"))
    } else {
        format!("{} {name}", red("FAIL"))
    }
}

/// One check as a colored ` - ...` line, with the directive message quoted
/// when present.
pub fn check_line(check: &Check) -> String {
    let suffix = if check.message.is_empty() {
        String::new()
    } else {
        format!(": \"{}\"", check.message)
    };
    let text = match (check.kind, check.passed) {
        (CheckKind::Pass, _) => format!(" - Passed check{suffix}"),
        (CheckKind::Fail, _) => format!(" - Failed check{suffix}"),
        (CheckKind::Expect, true) => format!(" - Passed expect{suffix}"),
        (CheckKind::Expect, false) => format!(" - Failed expect{suffix}"),
        (CheckKind::CompileError, true) => format!(" - Expected compile error{suffix}"),
        // judge already phrased the failure; no directive message to quote
        (CheckKind::CompileError, false) | (CheckKind::UnexpectedExit, _) => {
            format!(" - {}", check.message)
        }
    };
    if check.passed {
        green(&text)
    } else {
        red(&text)
    }
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub kind: &'static str,
    pub message: String,
    pub passed: bool,
}

#[derive(Debug, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub passed: bool,
    pub checks: Vec<CheckReport>,
}

impl CaseReport {
    pub fn from_outcome(name: String, outcome: &Outcome) -> Self {
        CaseReport {
            name,
            passed: outcome.passed,
            checks: outcome
                .checks
                .iter()
                .map(|c| CheckReport {
                    kind: c.kind.as_str(),
                    message: c.message.clone(),
                    passed: c.passed,
                })
                .collect(),
        }
    }
}

/// Report for the directive-based suites (e2e, integration).
#[derive(Debug, Serialize)]
pub struct SuiteReport {
    pub schema_version: &'static str,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub failing: Vec<String>,
    pub cases: Vec<CaseReport>,
}

pub fn write_json_report<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(report)
        .with_context(|| format!("serialize report: {}", path.display()))?;
    bytes.push(b'\n');
    std::fs::write(path, bytes).with_context(|| format!("write report: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::CheckKind;

    fn check(kind: CheckKind, message: &str, passed: bool) -> Check {
        Check {
            kind,
            message: message.to_string(),
            passed,
        }
    }

    #[test]
    fn check_lines_quote_nonempty_messages() {
        std::env::set_var("NO_COLOR", "1");
        let line = check_line(&check(CheckKind::Pass, "ok", true));
        assert_eq!(line, " - Passed check: \"ok\"");
        let line = check_line(&check(CheckKind::Pass, "", true));
        assert_eq!(line, " - Passed check");
    }

    #[test]
    fn expect_lines_reflect_verdict() {
        std::env::set_var("NO_COLOR", "1");
        let line = check_line(&check(CheckKind::Expect, "should overflow", false));
        assert_eq!(line, " - Failed expect: \"should overflow\"");
    }
}
