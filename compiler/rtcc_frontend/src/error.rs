//! Front-end errors.

use std::fmt;
use std::path::PathBuf;

/// Error produced while turning a source unit into bitcode.
///
/// Every variant is fatal to the current request; none are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontendError {
    /// A compiler option cannot be passed to the driver.
    InvalidOption { token: String, reason: String },
    /// A target triple string is malformed.
    InvalidTriple { triple: String, reason: String },
    /// The clang executable could not be started.
    DriverNotFound { program: PathBuf, message: String },
    /// The driver rejected the request while building its plan.
    DriverFailed {
        exit_code: Option<i32>,
        stderr: String,
    },
    /// The plan did not contain exactly one job.
    JobCount { count: usize, jobs: String },
    /// The single job is not a clang front-end (`-cc1`) job.
    NotFrontendJob { program: String },
    /// The front end reported errors in the source.
    Diagnostics { entry_point: String, stderr: String },
    /// The front end succeeded but produced no usable bitcode.
    Codegen { entry_point: String, message: String },
    /// The source text could not be staged for the driver.
    Staging { message: String },
}

impl fmt::Display for FrontendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOption { token, reason } => {
                write!(f, "invalid compiler option '{token}': {reason}")
            }
            Self::InvalidTriple { triple, reason } => {
                write!(f, "invalid target triple '{triple}': {reason}")
            }
            Self::DriverNotFound { program, message } => {
                write!(f, "clang driver '{}' not found: {message}", program.display())
            }
            Self::DriverFailed { exit_code, stderr } => {
                match exit_code {
                    Some(code) => write!(f, "clang driver failed (exit code {code})")?,
                    None => write!(f, "clang driver terminated by signal")?,
                }
                if !stderr.is_empty() {
                    write!(f, ":\n{stderr}")?;
                }
                Ok(())
            }
            Self::JobCount { count, jobs } => {
                write!(
                    f,
                    "expected exactly one compiler job, found {count}"
                )?;
                if !jobs.is_empty() {
                    write!(f, ": {jobs}")?;
                }
                Ok(())
            }
            Self::NotFrontendJob { program } => {
                write!(f, "expected a clang front-end job, found '{program}'")
            }
            Self::Diagnostics {
                entry_point,
                stderr,
            } => {
                write!(f, "compilation of '{entry_point}' failed:\n{stderr}")
            }
            Self::Codegen {
                entry_point,
                message,
            } => {
                write!(f, "code generation for '{entry_point}' failed: {message}")
            }
            Self::Staging { message } => {
                write!(f, "failed to stage source text: {message}")
            }
        }
    }
}

impl std::error::Error for FrontendError {}
