//! Engine errors.

use std::fmt;

use rtcc_frontend::FrontendError;
use rtcc_invoke::{LifecycleError, Status, NOTOK};
use rtcc_jit::{LoadError, SessionError};

/// Coarse error category reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid request parameters: mode, options, compile job count.
    Configuration,
    /// Source diagnostics or code generation failure.
    Frontend,
    /// Session creation, linking, symbol resolution and library loading.
    Session,
    /// Invocable object misuse.
    Lifecycle,
}

/// Error from a compile or invoke request.
///
/// Every error is fatal to its request. None are retried, and nothing done
/// before the failure is rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An environment variable holds an unusable value.
    Config {
        variable: &'static str,
        value: String,
        reason: String,
    },
    Frontend(FrontendError),
    Library(LoadError),
    Session(SessionError),
    Lifecycle(LifecycleError),
    /// The engine was shut down; no further requests are accepted.
    ShutDown,
    /// A factory returned no object.
    NullInstance { factory: String },
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. }
            | Self::Frontend(
                FrontendError::InvalidOption { .. }
                | FrontendError::InvalidTriple { .. }
                | FrontendError::JobCount { .. }
                | FrontendError::NotFrontendJob { .. },
            )
            | Self::Lifecycle(LifecycleError::InvalidMode(_)) => ErrorKind::Configuration,
            Self::Frontend(_) => ErrorKind::Frontend,
            Self::Library(_) | Self::Session(_) | Self::ShutDown => ErrorKind::Session,
            Self::Lifecycle(_) | Self::NullInstance { .. } => ErrorKind::Lifecycle,
        }
    }

    /// The status reported to the host for this error.
    pub fn status(&self) -> Status {
        NOTOK
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config {
                variable,
                value,
                reason,
            } => write!(f, "invalid {variable}='{value}': {reason}"),
            Self::Frontend(e) => write!(f, "{e}"),
            Self::Library(e) => write!(f, "{e}"),
            Self::Session(e) => write!(f, "{e}"),
            Self::Lifecycle(e) => write!(f, "{e}"),
            Self::ShutDown => write!(f, "engine has been shut down"),
            Self::NullInstance { factory } => {
                write!(f, "factory '{factory}' returned no object")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Frontend(e) => Some(e),
            Self::Library(e) => Some(e),
            Self::Session(e) => Some(e),
            Self::Lifecycle(e) => Some(e),
            Self::Config { .. } | Self::ShutDown | Self::NullInstance { .. } => None,
        }
    }
}

impl From<FrontendError> for EngineError {
    fn from(e: FrontendError) -> Self {
        Self::Frontend(e)
    }
}

impl From<LoadError> for EngineError {
    fn from(e: LoadError) -> Self {
        Self::Library(e)
    }
}

impl From<SessionError> for EngineError {
    fn from(e: SessionError) -> Self {
        Self::Session(e)
    }
}

impl From<LifecycleError> for EngineError {
    fn from(e: LifecycleError) -> Self {
        Self::Lifecycle(e)
    }
}
