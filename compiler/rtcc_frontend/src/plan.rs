//! Driver compilation plans.
//!
//! A [`CompilePlan`] is the argument list handed to the clang driver with
//! `-###`, which makes the driver print the jobs it would run instead of
//! running them. [`parse_job_list`] reads that listing back into
//! [`CompileJob`]s. The request only proceeds when the listing holds exactly
//! one clang front-end job.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::{FrontendError, TargetTriple};

/// Makes the driver print its jobs instead of running them.
pub const PLAN_FLAG: &str = "-###";

/// Forces analysis-only semantics so the plan never contains an assembler
/// or linker job.
pub const ANALYSIS_ONLY_FLAG: &str = "-fsyntax-only";

/// Replaces [`ANALYSIS_ONLY_FLAG`] when the job is re-run for code generation.
pub const EMIT_BITCODE_FLAG: &str = "-emit-llvm-bc";

/// The inputs from which the driver builds its job list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilePlan {
    executable: PathBuf,
    triple: TargetTriple,
    source: PathBuf,
    options: Vec<String>,
}

impl CompilePlan {
    /// Create a plan.
    ///
    /// Fails if an option cannot be forwarded to the driver.
    pub fn new(
        executable: impl Into<PathBuf>,
        triple: TargetTriple,
        source: impl Into<PathBuf>,
        options: &[String],
    ) -> Result<Self, FrontendError> {
        for token in options {
            if token.contains('\0') {
                return Err(FrontendError::InvalidOption {
                    token: token.escape_debug().to_string(),
                    reason: "contains a NUL byte".to_string(),
                });
            }
            if token == PLAN_FLAG {
                return Err(FrontendError::InvalidOption {
                    token: token.clone(),
                    reason: "reserved by the engine".to_string(),
                });
            }
        }

        Ok(Self {
            executable: executable.into(),
            triple,
            source: source.into(),
            options: options.to_vec(),
        })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn triple(&self) -> &TargetTriple {
        &self.triple
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Arguments for the planning invocation (excluding the program).
    pub fn driver_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(self.options.len() + 5);
        args.push(PLAN_FLAG.into());
        args.push("-target".into());
        args.push(self.triple.to_string().into());
        args.extend(self.options.iter().map(OsString::from));
        args.push(self.source.as_os_str().to_owned());
        args.push(ANALYSIS_ONLY_FLAG.into());
        args
    }

    /// Pick the single front-end job out of the driver's listing.
    pub fn select_job(jobs: Vec<CompileJob>) -> Result<CompileJob, FrontendError> {
        if jobs.len() != 1 {
            let listing = jobs
                .iter()
                .map(CompileJob::command_line)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FrontendError::JobCount {
                count: jobs.len(),
                jobs: listing,
            });
        }

        let mut jobs = jobs;
        let job = jobs.remove(0);
        if !job.is_frontend() {
            return Err(FrontendError::NotFrontendJob {
                program: job.program().to_string(),
            });
        }
        Ok(job)
    }
}

/// One job from the driver's listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileJob {
    program: String,
    args: Vec<String>,
}

impl CompileJob {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Whether this is a clang front-end (`-cc1`) job.
    pub fn is_frontend(&self) -> bool {
        self.args.first().is_some_and(|arg| arg == "-cc1")
    }

    /// Arguments for re-running the job so it writes bitcode to stdout.
    ///
    /// The analysis-only action is swapped for bitcode emission and any
    /// output path is replaced with `-`.
    pub fn codegen_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + 3);
        let mut iter = self.args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                ANALYSIS_ONLY_FLAG => {}
                "-o" => {
                    iter.next();
                }
                _ => args.push(arg.clone()),
            }
        }
        args.push(EMIT_BITCODE_FLAG.to_string());
        args.push("-o".to_string());
        args.push("-".to_string());
        args
    }

    /// The job as a single quoted command line, for logs and errors.
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|arg| format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\"")))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Parse the job listing that `clang -###` prints on stderr.
///
/// Job lines start with a space followed by a quoted program path. Every
/// other line (version banner, `(in-process)` markers, warnings) is skipped.
pub fn parse_job_list(output: &str) -> Vec<CompileJob> {
    output
        .lines()
        .filter(|line| line.starts_with(" \""))
        .filter_map(|line| {
            let mut words = split_quoted(line).into_iter();
            let program = words.next()?;
            Some(CompileJob::new(program, words.collect()))
        })
        .collect()
}

/// Split a line of `"`-quoted, backslash-escaped words.
fn split_quoted(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        if c != '"' {
            continue;
        }
        let mut word = String::new();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        word.push(escaped);
                    }
                }
                '"' => break,
                _ => word.push(c),
            }
        }
        words.push(word);
    }

    words
}

#[cfg(test)]
mod tests;
