//! Clang Front End for rtcc
//!
//! Turns a [`SourceUnit`] into an in-memory LLVM bitcode module by driving an
//! installed clang. The driver is asked for its compilation plan first
//! (`-###` with analysis-only semantics); the plan must contain exactly one
//! clang `-cc1` job, which is then re-run to emit bitcode on stdout. Nothing
//! is written to disk for output.
//!
//! # Pipeline
//!
//! ```text
//! SourceUnit ──▶ SourceFile (staged) ──▶ CompilePlan ──▶ CompileJob ──▶ Bitcode
//!                                         clang -###      clang -cc1
//!                                                         -emit-llvm-bc
//! ```
//!
//! # Debugging
//!
//! - `RUST_LOG=rtcc_frontend=debug`: log driver plans and job command lines.
//! - Passing `-v` in the compiler options turns on process-wide verbose
//!   diagnostics (see [`diagnostics`]) and is forwarded to clang.

pub mod diagnostics;
mod driver;
mod error;
mod plan;
mod source;
mod staging;
mod target;

pub use driver::{Bitcode, ClangDriver};
pub use error::FrontendError;
pub use plan::{
    parse_job_list, CompileJob, CompilePlan, ANALYSIS_ONLY_FLAG, EMIT_BITCODE_FLAG, PLAN_FLAG,
};
pub use source::{tokenize, SourceUnit};
pub use staging::SourceFile;
pub use target::{ObjectFormat, TargetTriple};

#[doc(hidden)]
pub use tracing as __tracing;
