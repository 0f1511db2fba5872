//! Auxiliary library loading.
//!
//! Libraries are loaded into the process's global symbol namespace, which is
//! where the JIT looks up anything a compiled module doesn't define itself.
//! Loads are permanent: there is no unload, because compiled code may hold
//! addresses into a library for the rest of the process. Libraries loaded
//! earlier shadow later ones when they export the same name, following the
//! platform dynamic linker.

use std::fmt;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// What to do when a library cannot be loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LibraryPolicy {
    /// Log a warning and continue. Code that needs the library fails later
    /// when its symbols cannot be resolved.
    #[default]
    Warn,
    /// Fail the request at load time.
    Strict,
}

impl LibraryPolicy {
    /// Parse a policy name (`warn` or `strict`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "warn" => Some(Self::Warn),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// Errors that can occur while loading a library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The library could not be found or loaded.
    NotFound { path: PathBuf, message: String },
    /// The path cannot be passed to the platform loader.
    InvalidPath { path: PathBuf },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path, message } => {
                write!(f, "cannot load library '{}': {message}", path.display())
            }
            Self::InvalidPath { path } => {
                write!(f, "invalid library path '{}'", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Process-wide, append-only table of loaded libraries.
#[derive(Debug, Default)]
pub struct LibraryLoader {
    libraries: Mutex<Vec<PathBuf>>,
}

impl LibraryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one library permanently.
    ///
    /// Loading a path that is already in the table does nothing.
    pub fn load(&self, path: &Path) -> Result<(), LoadError> {
        let mut libraries = self.libraries.lock();
        if libraries.iter().any(|loaded| loaded == path) {
            tracing::trace!(path = %path.display(), "library already loaded");
            return Ok(());
        }

        platform::open(path)?;
        tracing::debug!(path = %path.display(), "loaded library");
        libraries.push(path.to_path_buf());
        Ok(())
    }

    /// Load libraries in order.
    ///
    /// Under [`LibraryPolicy::Warn`] failures are logged and skipped; under
    /// [`LibraryPolicy::Strict`] the first failure is returned and later
    /// libraries are not attempted.
    pub fn load_all<'a, I>(&self, paths: I, policy: LibraryPolicy) -> Result<usize, LoadError>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut loaded = 0;
        for path in paths {
            match self.load(path) {
                Ok(()) => loaded += 1,
                Err(e) if policy == LibraryPolicy::Warn => {
                    tracing::warn!("{e}; symbols from it will not resolve");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(loaded)
    }

    /// Paths of every library loaded so far, in load order.
    pub fn loaded(&self) -> Vec<PathBuf> {
        self.libraries.lock().clone()
    }

    pub fn is_loaded(&self, path: &Path) -> bool {
        self.libraries.lock().iter().any(|loaded| loaded == path)
    }
}

#[cfg(unix)]
mod platform {
    use std::ffi::{CStr, CString};
    use std::path::Path;

    use super::LoadError;

    /// Open a library into the global namespace. The handle is never closed.
    pub(super) fn open(path: &Path) -> Result<(), LoadError> {
        let name = path
            .to_str()
            .and_then(|s| CString::new(s).ok())
            .ok_or_else(|| LoadError::InvalidPath {
                path: path.to_path_buf(),
            })?;
        // RTLD_GLOBAL: exported symbols join the process namespace the JIT
        // searches.
        let handle = unsafe { libc::dlopen(name.as_ptr(), libc::RTLD_LAZY | libc::RTLD_GLOBAL) };
        if handle.is_null() {
            return Err(LoadError::NotFound {
                path: path.to_path_buf(),
                message: last_error(),
            });
        }
        Ok(())
    }

    fn last_error() -> String {
        let err = unsafe { libc::dlerror() };
        if err.is_null() {
            "unknown error".to_string()
        } else {
            unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned()
        }
    }
}

#[cfg(windows)]
mod platform {
    use std::ffi::{c_void, OsStr};
    use std::os::windows::ffi::OsStrExt;
    use std::path::Path;

    use super::LoadError;

    extern "system" {
        fn LoadLibraryW(filename: *const u16) -> *mut c_void;
        fn GetLastError() -> u32;
    }

    /// Load a library into the process. The module is never freed.
    pub(super) fn open(path: &Path) -> Result<(), LoadError> {
        let wide: Vec<u16> = OsStr::new(path)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();
        let handle = unsafe { LoadLibraryW(wide.as_ptr()) };
        if handle.is_null() {
            let code = unsafe { GetLastError() };
            return Err(LoadError::NotFound {
                path: path.to_path_buf(),
                message: format!("error code {code}"),
            });
        }
        Ok(())
    }
}
