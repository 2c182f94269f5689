#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

// Stand-in for the l528 toolchain binary. `--exec` replays the source file
// as program output (exit code from an optional `<file>.exit` sidecar),
// `--parse` and `--comp-e2e` fail when `<file>.parse-error` /
// `<file>.compile-error` sidecars exist, and a successful compile produces a
// tiny script that replays the same output as `--exec`.
const FAKE_TOOLCHAIN: &str = r#"#!/bin/sh
mode=""
input=""
output=""
for arg in "$@"; do
  case "$arg" in
    --exec) mode=exec ;;
    --parse) mode=parse ;;
    --comp-e2e) mode=comp ;;
    --input=*) input="${arg#--input=}" ;;
    --output=*) output="${arg#--output=}" ;;
  esac
done
case "$mode" in
  exec)
    cat "$input"
    if [ -f "$input.exit" ]; then exit "$(cat "$input.exit")"; fi
    exit 0
    ;;
  parse)
    if [ -f "$input.parse-error" ]; then echo "syntax error" 1>&2; exit 1; fi
    exit 0
    ;;
  comp)
    if [ -f "$input.compile-error" ]; then echo "compile failed" 1>&2; exit 1; fi
    printf '#!/bin/sh\ncat "%s"\n' "$input" > "$output"
    if [ -f "$input.exit" ]; then printf 'exit %s\n' "$(cat "$input.exit")" >> "$output"; fi
    chmod +x "$output"
    exit 0
    ;;
esac
exit 2
"#;

struct Fixture {
    root: PathBuf,
    toolchain: PathBuf,
    corpus: PathBuf,
    scratch: PathBuf,
}

impl Fixture {
    fn new(prefix: &str) -> Self {
        let base = std::env::temp_dir();
        let pid = std::process::id();
        let mut root = None;
        for n in 0..10_000u32 {
            let p = base.join(format!("l528-harness-cli-{prefix}-{pid}-{n}"));
            if std::fs::create_dir(&p).is_ok() {
                root = Some(p);
                break;
            }
        }
        let root = root.expect("create temp dir");

        let toolchain = root.join("toolchain.sh");
        std::fs::write(&toolchain, FAKE_TOOLCHAIN).unwrap();
        make_executable(&toolchain);

        let corpus = root.join("corpus");
        std::fs::create_dir_all(corpus.join("e2e")).unwrap();
        let scratch = root.join("scratch");

        Fixture {
            root,
            toolchain,
            corpus,
            scratch,
        }
    }

    fn write_case(&self, rel: &str, contents: &str) {
        std::fs::write(self.corpus.join(rel), contents).unwrap();
    }

    fn run(&self, suite: &str, extra: &[&str]) -> Output {
        let report = self.report_path();
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_l528-harness"));
        cmd.arg(suite)
            .arg("--toolchain")
            .arg(&self.toolchain)
            .arg("--corpus")
            .arg(&self.corpus)
            .arg("--scratch")
            .arg(&self.scratch)
            .arg("--report-out")
            .arg(&report)
            .args(extra)
            .env("NO_COLOR", "1");
        cmd.output().expect("run l528-harness")
    }

    fn report_path(&self) -> PathBuf {
        self.root.join("report.json")
    }

    fn report(&self) -> Value {
        let bytes = std::fs::read(self.report_path()).expect("report written");
        serde_json::from_slice(&bytes).expect("report is valid JSON")
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).unwrap();
}

#[test]
fn e2e_suite_judges_directives_and_exits_nonzero_on_failure() {
    let fx = Fixture::new("e2e");
    fx.write_case("e2e/pass.src", "#PASS#ok\n");
    fx.write_case("e2e/fail.src", "#FAIL#bad\n");
    fx.write_case("e2e/expect_ok.src", "#EXPECT#boom\n");
    fx.write_case("e2e/expect_ok.src.exit", "1\n");

    let out = fx.run("e2e", &[]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert_eq!(out.status.code(), Some(1), "stdout:\n{stdout}");
    assert!(stdout.contains("PASS pass.src"), "stdout:\n{stdout}");
    assert!(stdout.contains("FAIL fail.src"), "stdout:\n{stdout}");
    assert!(stdout.contains("PASS expect_ok.src"), "stdout:\n{stdout}");
    assert!(stdout.contains(" - Failed check: \"bad\""), "stdout:\n{stdout}");
    assert!(stdout.contains("2/3 e2e cases passed"), "stdout:\n{stdout}");

    let report = fx.report();
    assert_eq!(report["schema_version"], "l528.harness.e2e@0.1.0");
    assert_eq!(report["failed"], 1);
    assert_eq!(report["failing"][0], "fail.src");
}

#[test]
fn e2e_compile_mode_honors_compile_error_expectations() {
    let fx = Fixture::new("e2e-compile");
    fx.write_case("e2e/cerr.src", "@COMPILE_ERROR@ divide by zero\n");
    fx.write_case("e2e/cerr.src.compile-error", "");
    fx.write_case("e2e/unexpected.src", "#PASS#never printed\n");
    fx.write_case("e2e/unexpected.src.compile-error", "");
    fx.write_case("e2e/plain.src", "#PASS#ok\n");

    let out = fx.run("e2e", &["--compile"]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert_eq!(out.status.code(), Some(1), "stdout:\n{stdout}");
    assert!(stdout.contains("PASS cerr.src"), "stdout:\n{stdout}");
    assert!(stdout.contains("FAIL unexpected.src"), "stdout:\n{stdout}");
    assert!(stdout.contains("PASS plain.src"), "stdout:\n{stdout}");

    let report = fx.report();
    assert_eq!(report["passed"], 2);
    assert_eq!(report["failing"][0], "unexpected.src");
}

#[test]
fn acceptance_reports_identical_corpus_and_exits_zero() {
    let fx = Fixture::new("accept-ok");
    fx.write_case("a.src", "#PASS#ok\n");
    fx.write_case("b.src", "#PASS#ok\n");
    fx.write_case("c.src", "#PASS#ok\n");

    let out = fx.run("acceptance", &[]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert_eq!(out.status.code(), Some(0), "stdout:\n{stdout}");
    assert!(
        stdout.contains("Identical outputs in: 3 / 3 files."),
        "stdout:\n{stdout}"
    );

    let report = fx.report();
    assert_eq!(report["schema_version"], "l528.harness.acceptance@0.1.0");
    assert_eq!(report["identical"], 3);
    assert_eq!(report["different"], 0);
}

#[test]
fn acceptance_flags_divergent_backends() {
    let fx = Fixture::new("accept-diff");
    fx.write_case("same.src", "steady output\n");
    // compiles under neither expectation nor tolerance: the comp artifact
    // becomes a COMPILE ERROR capture while the interpreter side still runs
    fx.write_case("diverge.src", "steady output\n");
    fx.write_case("diverge.src.compile-error", "");

    let out = fx.run("acceptance", &[]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert_eq!(out.status.code(), Some(1), "stdout:\n{stdout}");
    assert!(
        stdout.contains("Differing outputs in: 1 / 2 files"),
        "stdout:\n{stdout}"
    );
    assert!(stdout.contains("  - diverge.src"), "stdout:\n{stdout}");

    let report = fx.report();
    assert_eq!(report["identical"], 1);
    assert_eq!(report["different"], 1);
    assert_eq!(report["differing"][0]["name"], "diverge.src");
    assert!(report["differing"][0]["exec_sha256"].is_string());
    assert!(report["differing"][0]["comp_sha256"].is_string());
}

#[test]
fn integration_counts_parse_errors() {
    let fx = Fixture::new("integration");
    fx.write_case("good.src", "fn main() {}\n");
    fx.write_case("broken.src", "fn main( {\n");
    fx.write_case("broken.src.parse-error", "");

    let out = fx.run("integration", &[]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert_eq!(out.status.code(), Some(1), "stdout:\n{stdout}");
    assert!(
        stdout.contains("1/2 example programs parsed without errors"),
        "stdout:\n{stdout}"
    );
    assert!(stdout.contains("  - broken.src"), "stdout:\n{stdout}");

    let report = fx.report();
    assert_eq!(report["schema_version"], "l528.harness.integration@0.1.0");
    assert_eq!(report["failed"], 1);
}

#[test]
fn e2e_list_prints_cases_without_running() {
    let fx = Fixture::new("e2e-list");
    fx.write_case("e2e/one.src", "#PASS#ok\n");
    fx.write_case("e2e/two.src", "#FAIL#never judged\n");

    let out = fx.run("e2e", &["--list"]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert_eq!(out.status.code(), Some(0), "stdout:\n{stdout}");
    assert_eq!(stdout, "one.src\ntwo.src\n");
}
