use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::compare::{self, CorpusReport};
use crate::config::{CommonArgs, HarnessPaths};
use crate::corpus;
use crate::e2e::SHARED_ARTIFACT_NAME;
use crate::report;
use crate::toolchain;
use crate::util;

/// Differential suite: run the whole corpus through the interpreter and
/// through compile+run, persist both outputs, and compare them byte for
/// byte. Directives are not interpreted here; the verdict is text equality.
#[derive(Debug, Clone, Args)]
pub struct AcceptanceArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Runtime arguments handed to every program under both backends.
    #[arg(long, value_name = "ARGS", default_value = "12 13 14")]
    pub argv: String,

    /// Worker threads for the interpreter pass. Defaults to the number of
    /// available CPUs. The compile+run pass is always sequential.
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,
}

#[derive(Debug, Serialize)]
struct AcceptanceReport {
    schema_version: &'static str,
    total: usize,
    identical: usize,
    different: usize,
    differing: Vec<DifferingCase>,
}

#[derive(Debug, Serialize)]
struct DifferingCase {
    name: String,
    exec_sha256: Option<String>,
    comp_sha256: Option<String>,
}

pub fn cmd_acceptance(args: AcceptanceArgs) -> Result<ExitCode> {
    let paths = args.common.resolve()?;
    let files = corpus::source_files(&paths.corpus_dir)?;

    let exec_dir = paths.scratch_dir.join("exec");
    let comp_dir = paths.scratch_dir.join("comp");
    for dir in [&exec_dir, &comp_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir: {}", dir.display()))?;
    }

    interpret_all(&paths, &files, &exec_dir, &args.argv, args.jobs);
    compile_and_run_all(&paths, &files, &comp_dir, &args.argv);

    let names: Vec<String> = files.iter().map(|p| corpus::file_name(p)).collect();
    let verdict = compare::compare_corpus(&names, &exec_dir, &comp_dir);

    println!(
        "{}",
        report::green(&format!(
            "Identical outputs in: {} / {} files.",
            verdict.identical, verdict.total
        ))
    );
    println!(
        "{}",
        report::red(&format!(
            "Differing outputs in: {} / {} files",
            verdict.different, verdict.total
        ))
    );
    if !verdict.differing.is_empty() {
        println!("Files with differing output:");
        for name in &verdict.differing {
            println!("  - {name}");
        }
    }

    if let Some(path) = &args.common.report_out {
        let suite_report = build_report(&verdict, &exec_dir, &comp_dir);
        report::write_json_report(path, &suite_report)?;
    }

    if verdict.any_different() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Interpreter pass. Safe to fan out: each case writes to its own artifact
/// path and the workers share nothing else. A case whose invocation fails
/// outright gets no artifact and therefore counts as different.
fn interpret_all(
    paths: &HarnessPaths,
    files: &[PathBuf],
    exec_dir: &Path,
    argv: &str,
    jobs: Option<usize>,
) {
    let jobs = jobs
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1)
        })
        .clamp(1, files.len().max(1));

    let interpret_one = |file: &PathBuf| {
        let name = corpus::file_name(file);
        let written = paths
            .toolchain
            .interpret(file, Some(argv))
            .map(|res| compare::artifact_bytes(&res))
            .and_then(|bytes| compare::write_artifact(exec_dir, &name, &bytes));
        if let Err(err) = written {
            eprintln!("{name}: {err:#}");
        }
    };

    if jobs <= 1 {
        for file in files {
            interpret_one(file);
        }
        return;
    }

    let next = AtomicUsize::new(0);
    std::thread::scope(|scope| {
        for _ in 0..jobs {
            scope.spawn(|| loop {
                let idx = next.fetch_add(1, Ordering::Relaxed);
                if idx >= files.len() {
                    return;
                }
                interpret_one(&files[idx]);
            });
        }
    });
}

/// Compile+run pass. Every iteration reuses the single shared artifact path,
/// so this pass must stay sequential; parallelizing it requires per-case
/// artifact names first.
fn compile_and_run_all(paths: &HarnessPaths, files: &[PathBuf], comp_dir: &Path, argv: &str) {
    let shared_artifact = paths.scratch_dir.join(SHARED_ARTIFACT_NAME);
    let run_args: Vec<String> = argv.split_whitespace().map(str::to_string).collect();

    for file in files {
        let name = corpus::file_name(file);
        let written = compile_and_run_one(paths, file, &shared_artifact, &run_args)
            .and_then(|bytes| compare::write_artifact(comp_dir, &name, &bytes));
        if let Err(err) = written {
            eprintln!("{name}: {err:#}");
        }
    }
}

fn compile_and_run_one(
    paths: &HarnessPaths,
    file: &Path,
    artifact: &Path,
    run_args: &[String],
) -> Result<Vec<u8>> {
    let compile = paths.toolchain.compile(file, artifact)?;
    if compile.failed() {
        return Ok(compare::compile_failure_artifact_bytes(&compile));
    }
    let run = toolchain::run_artifact(artifact, run_args)?;
    Ok(compare::artifact_bytes(&run))
}

fn build_report(verdict: &CorpusReport, exec_dir: &Path, comp_dir: &Path) -> AcceptanceReport {
    let differing = verdict
        .differing
        .iter()
        .map(|name| DifferingCase {
            name: name.clone(),
            exec_sha256: artifact_digest(exec_dir, name),
            comp_sha256: artifact_digest(comp_dir, name),
        })
        .collect();
    AcceptanceReport {
        schema_version: report::ACCEPTANCE_REPORT_SCHEMA_VERSION,
        total: verdict.total,
        identical: verdict.identical,
        different: verdict.different,
        differing,
    }
}

fn artifact_digest(dir: &Path, name: &str) -> Option<String> {
    std::fs::read(compare::artifact_path(dir, name))
        .ok()
        .map(|bytes| util::sha256_hex(&bytes))
}
