use crate::directive::{CompileErrorExpectation, Directive};
use crate::toolchain::ExecResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    Pass,
    Fail,
    Expect,
    CompileError,
    UnexpectedExit,
}

impl CheckKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckKind::Pass => "pass",
            CheckKind::Fail => "fail",
            CheckKind::Expect => "expect",
            CheckKind::CompileError => "compile-error",
            CheckKind::UnexpectedExit => "unexpected-nonzero-exit",
        }
    }
}

/// One judged check within a test case, in order of appearance.
#[derive(Debug, Clone)]
pub struct Check {
    pub kind: CheckKind,
    pub message: String,
    pub passed: bool,
}

impl Check {
    fn passed(kind: CheckKind, message: impl Into<String>) -> Self {
        Check {
            kind,
            message: message.into(),
            passed: true,
        }
    }

    fn failed(kind: CheckKind, message: impl Into<String>) -> Self {
        Check {
            kind,
            message: message.into(),
            passed: false,
        }
    }
}

/// Aggregated verdict for one source file under one backend mode.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub passed: bool,
    pub checks: Vec<Check>,
}

impl Outcome {
    pub fn failed_checks(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// Judge one test case.
///
/// `compile` is the compiler's result when a compile step occurred (compile
/// mode), `run` the interpreted or compiled program's result, `directives`
/// the markers extracted from the run's stdout.
///
/// A failed compile passes iff a compile-error expectation was present; the
/// expectation message is never diffed against the actual diagnostics. An
/// `EXPECT` directive is satisfied by any nonzero exit code, not a specific
/// failure. A nonzero exit that no `EXPECT` announced fails the case.
pub fn judge(
    compile: Option<&ExecResult>,
    expectation: Option<&CompileErrorExpectation>,
    run: Option<&ExecResult>,
    directives: &[Directive],
) -> Outcome {
    let mut checks = Vec::new();

    if let Some(compile) = compile {
        if compile.failed() {
            let check = match expectation {
                Some(exp) => Check::passed(CheckKind::CompileError, exp.message.clone()),
                None => Check::failed(
                    CheckKind::CompileError,
                    format!("Unexpected compile error (exit code {})", compile.exit_code),
                ),
            };
            let passed = check.passed;
            return Outcome {
                passed,
                checks: vec![check],
            };
        }
        if expectation.is_some() {
            checks.push(Check::failed(
                CheckKind::CompileError,
                "Expected a compile error, but compilation succeeded".to_string(),
            ));
        }
    }

    let exit_code = run.map_or(0, |r| r.exit_code);
    let mut failure_expected = false;
    for directive in directives {
        match directive {
            Directive::Pass(msg) => checks.push(Check::passed(CheckKind::Pass, msg.clone())),
            Directive::Fail(msg) => checks.push(Check::failed(CheckKind::Fail, msg.clone())),
            Directive::Expect(msg) => {
                failure_expected = true;
                let check = if exit_code != 0 {
                    Check::passed(CheckKind::Expect, msg.clone())
                } else {
                    Check::failed(CheckKind::Expect, msg.clone())
                };
                checks.push(check);
            }
        }
    }

    if !failure_expected && exit_code != 0 {
        checks.push(Check::failed(
            CheckKind::UnexpectedExit,
            format!("Unexpected nonzero exit code ({exit_code})"),
        ));
    }

    let passed = checks.iter().all(|c| c.passed);
    Outcome { passed, checks }
}
