use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::config::{CommonArgs, HarnessPaths};
use crate::corpus;
use crate::directive;
use crate::judge::{self, Outcome};
use crate::report::{self, CaseReport, SuiteReport};
use crate::toolchain::{self, ExecResult};

/// Relative path of the shared compiled artifact inside the scratch dir.
/// Compile-mode cases run one at a time because they all target this path.
pub const SHARED_ARTIFACT_NAME: &str = "compiled_exec";

#[derive(Debug, Clone, Args)]
pub struct E2eArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Compile and run each program instead of interpreting it.
    #[arg(long)]
    pub compile: bool,

    /// Only run cases whose filename contains SUBSTR.
    #[arg(long, value_name = "SUBSTR")]
    pub filter: Option<String>,

    /// List discovered cases without running them.
    #[arg(long)]
    pub list: bool,

    /// Print passing checks and dump captured output for failing cases.
    #[arg(short, long)]
    pub verbose: bool,
}

struct CaseExecution {
    compile: Option<ExecResult>,
    run: Option<ExecResult>,
    outcome: Outcome,
}

pub fn cmd_e2e(args: E2eArgs) -> Result<ExitCode> {
    let paths = args.common.resolve()?;
    let suite_dir = paths.corpus_dir.join("e2e");

    let mut files = corpus::source_files(&suite_dir)?;
    if let Some(filter) = &args.filter {
        files.retain(|p| corpus::file_name(p).contains(filter.as_str()));
    }

    if args.list {
        for file in &files {
            println!("{}", corpus::file_name(file));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut cases = Vec::with_capacity(files.len());
    let mut failing = Vec::new();

    for file in &files {
        let name = corpus::file_name(file);
        let case = run_case(&paths, file, args.compile)?;

        println!("{}", report::case_banner(&name, case.outcome.passed));
        for check in &case.outcome.checks {
            if check.passed && !args.verbose {
                continue;
            }
            println!("{}", report::check_line(check));
        }
        if !case.outcome.passed {
            if args.verbose {
                dump_captured_output(&case);
            }
            failing.push(name.clone());
        }

        cases.push(CaseReport::from_outcome(name, &case.outcome));
    }

    let total = cases.len();
    let failed = failing.len();
    println!("{}/{} e2e cases passed", total - failed, total);
    if !failing.is_empty() {
        println!("Failing cases:");
        for name in &failing {
            println!("  - {name}");
        }
    }

    if let Some(path) = &args.common.report_out {
        let suite_report = SuiteReport {
            schema_version: report::E2E_REPORT_SCHEMA_VERSION,
            total,
            passed: total - failed,
            failed,
            failing: failing.clone(),
            cases,
        };
        report::write_json_report(path, &suite_report)?;
    }

    if failed > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_case(paths: &HarnessPaths, file: &Path, compile_mode: bool) -> Result<CaseExecution> {
    let expectation = directive::compile_error_expectation(file)?;

    if compile_mode {
        let artifact = paths.scratch_dir.join(SHARED_ARTIFACT_NAME);
        let compile = paths.toolchain.compile(file, &artifact)?;
        if compile.failed() {
            let outcome = judge::judge(Some(&compile), expectation.as_ref(), None, &[]);
            return Ok(CaseExecution {
                compile: Some(compile),
                run: None,
                outcome,
            });
        }
        let run = toolchain::run_artifact(&artifact, &[])?;
        let directives = directive::extract_directives(&run.stdout_lossy());
        let outcome = judge::judge(Some(&compile), expectation.as_ref(), Some(&run), &directives);
        Ok(CaseExecution {
            compile: Some(compile),
            run: Some(run),
            outcome,
        })
    } else {
        let run = paths.toolchain.interpret(file, None)?;
        let directives = directive::extract_directives(&run.stdout_lossy());
        let outcome = judge::judge(None, expectation.as_ref(), Some(&run), &directives);
        Ok(CaseExecution {
            compile: None,
            run: Some(run),
            outcome,
        })
    }
}

fn dump_captured_output(case: &CaseExecution) {
    if let Some(compile) = &case.compile {
        if compile.failed() {
            dump_streams("compiler", compile);
            return;
        }
    }
    if let Some(run) = &case.run {
        dump_streams("program", run);
    }
}

fn dump_streams(label: &str, result: &ExecResult) {
    let stdout = result.stdout_lossy();
    if !stdout.is_empty() {
        println!("--- {label} stdout ---");
        print!("{stdout}");
        if !stdout.ends_with('\n') {
            println!();
        }
    }
    let stderr = result.stderr_lossy();
    if !stderr.is_empty() {
        println!("--- {label} stderr ---");
        print!("{stderr}");
        if !stderr.ends_with('\n') {
            println!();
        }
    }
}
