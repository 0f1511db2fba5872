#![allow(clippy::unwrap_used)]

use super::*;
use pretty_assertions::assert_eq;

const SINGLE_JOB: &str = r#"clang version 17.0.6
Target: x86_64-unknown-linux-gnu
Thread model: posix
InstalledDir: /usr/lib/llvm-17/bin
 (in-process)
 "/usr/lib/llvm-17/bin/clang" "-cc1" "-triple" "x86_64-unknown-linux-gnu" "-fsyntax-only" "-main-file-name" "rtcc_abc.cpp" "-resource-dir" "/usr/lib/llvm-17/lib/clang/17" "-D" "GREETING=\"hi\"" "-x" "c++" "/tmp/rtcc_abc.cpp"
"#;

const TWO_JOBS: &str = r#"clang version 17.0.6
 "/usr/bin/clang" "-cc1" "-fsyntax-only" "a.c"
 "/usr/bin/clang" "-cc1" "-fsyntax-only" "b.c"
"#;

const VERSION_ONLY: &str = "clang version 17.0.6\nTarget: x86_64-unknown-linux-gnu\n";

fn linux() -> TargetTriple {
    TargetTriple::parse("x86_64-unknown-linux-gnu").unwrap()
}

#[test]
fn test_parse_single_job() {
    let jobs = parse_job_list(SINGLE_JOB);
    assert_eq!(jobs.len(), 1);

    let job = &jobs[0];
    assert_eq!(job.program(), "/usr/lib/llvm-17/bin/clang");
    assert!(job.is_frontend());
    assert_eq!(job.args().last().map(String::as_str), Some("/tmp/rtcc_abc.cpp"));
    assert!(job.args().iter().any(|a| a == "GREETING=\"hi\""));
}

#[test]
fn test_parse_skips_banner_lines() {
    assert!(parse_job_list(VERSION_ONLY).is_empty());
    assert!(parse_job_list("").is_empty());
}

#[test]
fn test_select_single_job() {
    let job = CompilePlan::select_job(parse_job_list(SINGLE_JOB)).unwrap();
    assert_eq!(job.args()[0], "-cc1");
}

#[test]
fn test_select_rejects_zero_jobs() {
    let err = CompilePlan::select_job(parse_job_list(VERSION_ONLY)).unwrap_err();
    assert_eq!(
        err,
        FrontendError::JobCount {
            count: 0,
            jobs: String::new()
        }
    );
}

#[test]
fn test_select_rejects_multiple_jobs() {
    let err = CompilePlan::select_job(parse_job_list(TWO_JOBS)).unwrap_err();
    match err {
        FrontendError::JobCount { count, jobs } => {
            assert_eq!(count, 2);
            assert!(jobs.contains("a.c"));
            assert!(jobs.contains("; "));
            assert!(jobs.contains("b.c"));
        }
        other => panic!("expected JobCount, got {other:?}"),
    }
}

#[test]
fn test_select_rejects_non_frontend_job() {
    let listing = " \"/usr/bin/ld\" \"-o\" \"a.out\" \"a.o\"\n";
    let err = CompilePlan::select_job(parse_job_list(listing)).unwrap_err();
    assert_eq!(
        err,
        FrontendError::NotFrontendJob {
            program: "/usr/bin/ld".to_string()
        }
    );
}

#[test]
fn test_codegen_args_swap_action() {
    let job = CompileJob::new(
        "clang",
        ["-cc1", "-fsyntax-only", "-o", "x.o", "-x", "c", "in.c"]
            .map(String::from)
            .to_vec(),
    );
    assert_eq!(
        job.codegen_args(),
        ["-cc1", "-x", "c", "in.c", "-emit-llvm-bc", "-o", "-"]
    );
}

#[test]
fn test_driver_args_order() {
    let plan = CompilePlan::new(
        "/usr/bin/clang",
        linux(),
        "/tmp/src.cpp",
        &["-O2".to_string(), "-std=c++17".to_string()],
    )
    .unwrap();

    let args: Vec<String> = plan
        .driver_args()
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        args,
        [
            "-###",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-O2",
            "-std=c++17",
            "/tmp/src.cpp",
            "-fsyntax-only"
        ]
    );
}

#[test]
fn test_plan_rejects_malformed_options() {
    let nul = CompilePlan::new("clang", linux(), "a.c", &["-D\0X".to_string()]);
    assert!(matches!(nul, Err(FrontendError::InvalidOption { .. })));

    let reserved = CompilePlan::new("clang", linux(), "a.c", &[PLAN_FLAG.to_string()]);
    assert!(matches!(reserved, Err(FrontendError::InvalidOption { .. })));
}

#[test]
fn test_command_line_quotes() {
    let job = CompileJob::new("clang", vec!["-DX=\"y\"".to_string()]);
    assert_eq!(job.command_line(), r#""clang" "-DX=\"y\"""#);
    // The listing format parses back to the same job.
    let reparsed = parse_job_list(&format!(" {}", job.command_line()));
    assert_eq!(reparsed, vec![job]);
}
