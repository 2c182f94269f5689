use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::config::CommonArgs;
use crate::corpus;
use crate::report::{self, CaseReport, CheckReport, SuiteReport};

/// Parse-only smoke suite: every corpus program must get through the parser.
#[derive(Debug, Clone, Args)]
pub struct IntegrationArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Only parse files whose filename contains SUBSTR.
    #[arg(long, value_name = "SUBSTR")]
    pub filter: Option<String>,

    /// Print a line per file instead of just the summary.
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn cmd_integration(args: IntegrationArgs) -> Result<ExitCode> {
    let paths = args.common.resolve()?;

    let mut files = corpus::source_files(&paths.corpus_dir)?;
    if let Some(filter) = &args.filter {
        files.retain(|p| corpus::file_name(p).contains(filter.as_str()));
    }

    let mut cases = Vec::with_capacity(files.len());
    let mut failing = Vec::new();

    for file in &files {
        let name = corpus::file_name(file);
        let result = paths.toolchain.parse_only(file)?;
        let passed = !result.failed();
        if args.verbose {
            println!("{}", report::case_banner(&name, passed));
        }
        if !passed {
            failing.push(name.clone());
        }
        cases.push(CaseReport {
            name,
            passed,
            checks: vec![CheckReport {
                kind: "parse",
                message: format!("exit code {}", result.exit_code),
                passed,
            }],
        });
    }

    let total = files.len();
    let errors = failing.len();
    println!("{}/{} example programs parsed without errors", total - errors, total);
    if !failing.is_empty() {
        println!("Files with parse errors:");
        for name in &failing {
            println!("  - {name}");
        }
    }

    if let Some(path) = &args.common.report_out {
        let suite_report = SuiteReport {
            schema_version: report::INTEGRATION_REPORT_SCHEMA_VERSION,
            total,
            passed: total - errors,
            failed: errors,
            failing: failing.clone(),
            cases,
        };
        report::write_json_report(path, &suite_report)?;
    }

    if errors > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
