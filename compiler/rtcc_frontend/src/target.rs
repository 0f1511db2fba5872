//! Target triples for the JIT pipeline.
//!
//! Triples follow the format `<arch>-<vendor>-<os>[-<env>][-<objformat>]`.
//! The host triple is inferred from the process's own build configuration,
//! so the driver generates code for exactly the process that will run it.

use std::fmt;

use crate::FrontendError;

/// Object file format requested from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectFormat {
    Elf,
    Coff,
    MachO,
}

impl ObjectFormat {
    /// The triple suffix LLVM recognizes for this format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Elf => "elf",
            Self::Coff => "coff",
            Self::MachO => "macho",
        }
    }

    fn from_component(component: &str) -> Option<Self> {
        match component {
            "elf" => Some(Self::Elf),
            "coff" => Some(Self::Coff),
            "macho" => Some(Self::MachO),
            _ => None,
        }
    }
}

/// A parsed target triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTriple {
    /// CPU architecture (e.g., `x86_64`, `aarch64`)
    pub arch: String,
    /// Hardware vendor (e.g., `unknown`, `apple`, `pc`)
    pub vendor: String,
    /// Operating system (e.g., `linux`, `darwin`, `windows`)
    pub os: String,
    /// Environment/ABI (e.g., `gnu`, `musl`, `msvc`)
    pub env: Option<String>,
    /// Explicit object format override.
    pub object_format: Option<ObjectFormat>,
}

impl TargetTriple {
    /// Parse a target triple string.
    pub fn parse(triple: &str) -> Result<Self, FrontendError> {
        let parts: Vec<&str> = triple.split('-').collect();

        if parts.len() < 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(FrontendError::InvalidTriple {
                triple: triple.to_string(),
                reason: "expected at least 3 components: <arch>-<vendor>-<os>".to_string(),
            });
        }

        let mut env = None;
        let mut object_format = None;
        for extra in &parts[3..] {
            if let Some(format) = ObjectFormat::from_component(extra) {
                object_format = Some(format);
            } else if env.is_none() && object_format.is_none() {
                env = Some((*extra).to_string());
            } else {
                return Err(FrontendError::InvalidTriple {
                    triple: triple.to_string(),
                    reason: format!("unexpected component '{extra}'"),
                });
            }
        }

        Ok(Self {
            arch: parts[0].to_string(),
            vendor: parts[1].to_string(),
            os: parts[2].to_string(),
            env,
            object_format,
        })
    }

    /// The triple of the running process.
    #[must_use]
    pub fn host() -> Self {
        let arch = match std::env::consts::ARCH {
            "x86" => "i686",
            "powerpc64" if cfg!(target_endian = "little") => "powerpc64le",
            other => other,
        };

        let (vendor, os) = if cfg!(target_os = "macos") {
            ("apple", "darwin")
        } else if cfg!(target_os = "windows") {
            ("pc", "windows")
        } else {
            ("unknown", std::env::consts::OS)
        };

        let env = if cfg!(target_env = "gnu") {
            Some("gnu")
        } else if cfg!(target_env = "musl") {
            Some("musl")
        } else if cfg!(target_env = "msvc") {
            Some("msvc")
        } else {
            None
        };

        Self {
            arch: arch.to_string(),
            vendor: vendor.to_string(),
            os: os.to_string(),
            env: env.map(str::to_string),
            object_format: None,
        }
    }

    /// The object format the platform uses natively.
    #[must_use]
    pub fn native_object_format(&self) -> ObjectFormat {
        if self.is_windows() {
            ObjectFormat::Coff
        } else if self.is_macos() {
            ObjectFormat::MachO
        } else {
            ObjectFormat::Elf
        }
    }

    /// The object format the driver will actually produce.
    #[must_use]
    pub fn effective_object_format(&self) -> ObjectFormat {
        self.object_format
            .unwrap_or_else(|| self.native_object_format())
    }

    /// Override the object format (builder pattern).
    #[must_use]
    pub fn with_object_format(mut self, format: ObjectFormat) -> Self {
        self.object_format = Some(format);
        self
    }

    /// Adjust the triple for the in-process JIT linker.
    ///
    /// COFF output is rewritten to ELF unless the `coff` feature is enabled.
    #[must_use]
    pub fn for_jit(self) -> Self {
        if !cfg!(feature = "coff") && self.effective_object_format() == ObjectFormat::Coff {
            self.with_object_format(ObjectFormat::Elf)
        } else {
            self
        }
    }

    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == "windows" || self.os.starts_with("win32")
    }

    #[must_use]
    pub fn is_macos(&self) -> bool {
        self.os == "darwin" || self.os.starts_with("macos")
    }
}

impl fmt::Display for TargetTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.arch, self.vendor, self.os)?;
        if let Some(env) = &self.env {
            write!(f, "-{env}")?;
        }
        if let Some(format) = self.object_format {
            write!(f, "-{}", format.as_str())?;
        }
        Ok(())
    }
}
