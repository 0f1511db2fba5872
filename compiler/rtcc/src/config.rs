//! Engine configuration.
//!
//! Everything has a default; environment variables override:
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `RTCC_CLANG` | clang driver | `clang` on `PATH` |
//! | `RTCC_TMPDIR`, then `TMPDIR` | staging directory | OS temp dir |
//! | `RTCC_SOURCE_EXT` | staged source extension | `cpp` |
//! | `RTCC_LIBRARY_POLICY` | `warn` or `strict` | `warn` |

use std::path::{Path, PathBuf};

use rtcc_jit::LibraryPolicy;

use crate::EngineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    clang: PathBuf,
    staging_dir: Option<PathBuf>,
    source_extension: String,
    library_policy: LibraryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clang: PathBuf::from("clang"),
            staging_dir: None,
            source_extension: "cpp".to_string(),
            library_policy: LibraryPolicy::Warn,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, EngineError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let mut config = Self::default();

        if let Some(clang) = get("RTCC_CLANG") {
            config.clang = PathBuf::from(clang);
        }
        config.staging_dir = get("RTCC_TMPDIR").or_else(|| get("TMPDIR")).map(PathBuf::from);
        if let Some(ext) = get("RTCC_SOURCE_EXT") {
            config.source_extension = ext.trim_start_matches('.').to_string();
        }
        if let Some(policy) = get("RTCC_LIBRARY_POLICY") {
            config.library_policy =
                LibraryPolicy::from_name(&policy).ok_or_else(|| EngineError::Config {
                    variable: "RTCC_LIBRARY_POLICY",
                    value: policy.clone(),
                    reason: "expected 'warn' or 'strict'".to_string(),
                })?;
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_clang(mut self, clang: impl Into<PathBuf>) -> Self {
        self.clang = clang.into();
        self
    }

    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_source_extension(mut self, extension: impl Into<String>) -> Self {
        self.source_extension = extension.into();
        self
    }

    #[must_use]
    pub fn with_library_policy(mut self, policy: LibraryPolicy) -> Self {
        self.library_policy = policy;
        self
    }

    pub fn clang(&self) -> &Path {
        &self.clang
    }

    pub fn staging_dir(&self) -> Option<&Path> {
        self.staging_dir.as_deref()
    }

    pub fn source_extension(&self) -> &str {
        &self.source_extension
    }

    pub fn library_policy(&self) -> LibraryPolicy {
        self.library_policy
    }
}
