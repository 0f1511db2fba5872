//! Session errors.

use std::fmt;

/// Error from the JIT session or its backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The host architecture could not be detected.
    TargetDetection(String),
    /// A target machine or execution context could not be built.
    TargetMachine(String),
    /// A module defines a symbol that another module already defines.
    DuplicateSymbol {
        symbol: String,
        module: String,
        existing: String,
    },
    /// The backend rejected a module.
    Link { module: String, message: String },
    /// No module in the session defines the symbol.
    SymbolNotFound { symbol: String },
    /// The backend failed to resolve a symbol its module declared.
    Lookup { symbol: String, message: String },
    /// The session has ended; no modules can be added or resolved.
    Ended { session: String },
    /// Tearing down the execution context failed.
    Teardown(String),
    /// The module could not be read.
    InvalidModule { module: String, message: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetDetection(msg) => write!(f, "failed to detect host target: {msg}"),
            Self::TargetMachine(msg) => write!(f, "failed to create JIT target machine: {msg}"),
            Self::DuplicateSymbol {
                symbol,
                module,
                existing,
            } => write!(
                f,
                "duplicate symbol '{symbol}' in module '{module}' (already defined by '{existing}')"
            ),
            Self::Link { module, message } => {
                write!(f, "failed to add module '{module}': {message}")
            }
            Self::SymbolNotFound { symbol } => write!(f, "symbol '{symbol}' not found"),
            Self::Lookup { symbol, message } => {
                write!(f, "failed to resolve '{symbol}': {message}")
            }
            Self::Ended { session } => write!(f, "JIT session {session} has ended"),
            Self::Teardown(msg) => write!(f, "failed to end JIT session: {msg}"),
            Self::InvalidModule { module, message } => {
                write!(f, "invalid module '{module}': {message}")
            }
        }
    }
}

impl std::error::Error for SessionError {}
