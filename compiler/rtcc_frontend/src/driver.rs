//! Clang driver invocation.
//!
//! The driver runs twice per request. The first run only prints the plan
//! (`-###`), which yields the exact `-cc1` command line clang would use for
//! the host target. The second run executes that command line with the
//! action switched to bitcode emission and the output sent to stdout.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::plan::{parse_job_list, CompileJob, CompilePlan};
use crate::{diag, diagnostics, FrontendError, SourceUnit, TargetTriple};

const RAW_BITCODE_MAGIC: [u8; 4] = [b'B', b'C', 0xC0, 0xDE];
const WRAPPED_BITCODE_MAGIC: [u8; 4] = 0x0B17_C0DE_u32.to_le_bytes();

/// An in-memory LLVM bitcode module produced for one entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitcode {
    entry_point: String,
    bytes: Vec<u8>,
}

impl Bitcode {
    /// Wrap raw bytes, checking the bitcode magic.
    pub fn new(entry_point: impl Into<String>, bytes: Vec<u8>) -> Result<Self, FrontendError> {
        let entry_point = entry_point.into();
        if bytes.is_empty() {
            return Err(FrontendError::Codegen {
                entry_point,
                message: "no bitcode emitted".to_string(),
            });
        }
        if !Self::has_magic(&bytes) {
            return Err(FrontendError::Codegen {
                entry_point,
                message: "output is not LLVM bitcode".to_string(),
            });
        }
        Ok(Self { entry_point, bytes })
    }

    /// Whether `bytes` starts with a raw or wrapped bitcode header.
    pub fn has_magic(bytes: &[u8]) -> bool {
        bytes.starts_with(&RAW_BITCODE_MAGIC) || bytes.starts_with(&WRAPPED_BITCODE_MAGIC)
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Handle to an installed clang driver.
#[derive(Debug, Clone)]
pub struct ClangDriver {
    program: PathBuf,
    triple: TargetTriple,
}

impl ClangDriver {
    /// Name the driver reports itself under.
    pub const TITLE: &'static str = "rtcc JIT compiler";

    /// Create a driver for the host triple.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            triple: TargetTriple::host().for_jit(),
        }
    }

    /// Override the target triple (builder pattern).
    #[must_use]
    pub fn with_triple(mut self, triple: TargetTriple) -> Self {
        self.triple = triple.for_jit();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn triple(&self) -> &TargetTriple {
        &self.triple
    }

    /// Check that the driver can be started, returning its version banner.
    pub fn detect(&self) -> Result<String, FrontendError> {
        let output = self.run(Command::new(&self.program).arg("--version"))?;
        if !output.status.success() {
            return Err(FrontendError::DriverFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().to_string())
    }

    /// Ask the driver for its plan and extract the single front-end job.
    pub fn plan(&self, unit: &SourceUnit, source: &Path) -> Result<CompileJob, FrontendError> {
        let plan = CompilePlan::new(
            &self.program,
            self.triple.clone(),
            source,
            unit.compiler_options(),
        )?;

        let output = self.run(Command::new(plan.executable()).args(plan.driver_args()))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(FrontendError::DriverFailed {
                exit_code: output.status.code(),
                stderr: stderr.into_owned(),
            });
        }

        let jobs = parse_job_list(&stderr);
        tracing::debug!(
            entry_point = %unit.entry_point(),
            jobs = jobs.len(),
            "driver plan"
        );
        CompilePlan::select_job(jobs)
    }

    /// Compile a staged source file to bitcode.
    ///
    /// `source` must hold `unit`'s text; see [`SourceFile`](crate::SourceFile).
    pub fn compile(&self, unit: &SourceUnit, source: &Path) -> Result<Bitcode, FrontendError> {
        diag!(
            entry_point = %unit.entry_point(),
            driver = Self::TITLE,
            program = %self.program.display(),
            triple = %self.triple,
            "compiling"
        );

        let job = self.plan(unit, source)?;
        if diagnostics::enabled() {
            diag!(command = %job.command_line(), "front-end job");
        }

        let output = self.run(Command::new(job.program()).args(job.codegen_args()))?;
        if !output.status.success() {
            return Err(FrontendError::Diagnostics {
                entry_point: unit.entry_point().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        if !output.stderr.is_empty() {
            tracing::warn!(
                entry_point = %unit.entry_point(),
                "{}",
                String::from_utf8_lossy(&output.stderr).trim_end()
            );
        }

        let bitcode = Bitcode::new(unit.entry_point(), output.stdout)?;
        tracing::debug!(
            entry_point = %unit.entry_point(),
            bytes = bitcode.as_bytes().len(),
            "emitted bitcode"
        );
        Ok(bitcode)
    }

    fn run(&self, command: &mut Command) -> Result<Output, FrontendError> {
        command.output().map_err(|e| FrontendError::DriverNotFound {
            program: self.program.clone(),
            message: e.to_string(),
        })
    }
}
