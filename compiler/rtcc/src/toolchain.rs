//! Toolchain seam.
//!
//! A toolchain turns a [`SourceUnit`] into a module for its backend and
//! creates that backend when the engine first needs a session.

use rtcc_frontend::SourceUnit;
use rtcc_jit::{JitBackend, SessionError};

use crate::EngineError;

/// Module type produced by a toolchain.
pub type ModuleOf<T> = <<T as Toolchain>::Backend as JitBackend>::Module;

pub trait Toolchain {
    type Backend: JitBackend;

    /// Compile one unit. Must not touch any session.
    fn compile(&self, unit: &SourceUnit) -> Result<ModuleOf<Self>, EngineError>;

    /// Create a backend for a new session.
    fn create_backend(&self) -> Result<Self::Backend, SessionError>;
}

#[cfg(feature = "llvm")]
pub use self::clang::ClangOrcToolchain;

#[cfg(feature = "llvm")]
mod clang {
    use std::path::PathBuf;

    use rtcc_frontend::{ClangDriver, SourceFile, SourceUnit};
    use rtcc_jit::orc::{OrcBackend, OrcModule};
    use rtcc_jit::SessionError;

    use super::Toolchain;
    use crate::{EngineConfig, EngineError};

    /// Installed clang driver feeding an LLVM ORC LLJIT.
    #[derive(Debug, Clone)]
    pub struct ClangOrcToolchain {
        driver: ClangDriver,
        staging_dir: Option<PathBuf>,
        source_extension: String,
    }

    impl ClangOrcToolchain {
        pub fn new(config: &EngineConfig) -> Self {
            Self {
                driver: ClangDriver::new(config.clang()),
                staging_dir: config.staging_dir().map(PathBuf::from),
                source_extension: config.source_extension().to_string(),
            }
        }

        pub fn driver(&self) -> &ClangDriver {
            &self.driver
        }
    }

    impl Toolchain for ClangOrcToolchain {
        type Backend = OrcBackend;

        fn compile(&self, unit: &SourceUnit) -> Result<OrcModule, EngineError> {
            let staged = SourceFile::stage(
                unit.source_text(),
                self.staging_dir.as_deref(),
                &self.source_extension,
            )?;
            let bitcode = self.driver.compile(unit, staged.path())?;
            Ok(OrcModule::from_bitcode(
                bitcode.entry_point(),
                bitcode.as_bytes(),
            )?)
        }

        fn create_backend(&self) -> Result<OrcBackend, SessionError> {
            OrcBackend::create()
        }
    }
}
