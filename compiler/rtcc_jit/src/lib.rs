//! JIT Session for rtcc
//!
//! Owns everything that outlives a single compile request: the execution
//! session that compiled modules are added to, and the table of auxiliary
//! libraries loaded into the process.
//!
//! # Architecture
//!
//! ```text
//! JitSession<B: JitBackend>
//!   ├── backend: B            (ORC LLJIT, or a symbol table in tests)
//!   ├── modules               (name + Pending/Compiled status)
//!   ├── owners                (symbol -> defining module)
//!   └── resolved              (symbol -> cached address)
//!
//! LibraryLoader               (append-only, never unloaded)
//! ```
//!
//! A session has a single logical namespace: every module added to it can
//! call symbols defined by modules added earlier. Code generation is lazy;
//! a module stays `Pending` until the first lookup of one of its symbols.
//!
//! # Features
//!
//! - `llvm`: the [`orc`] backend built on the LLVM 17 ORC LLJIT C API.
//! - `testing`: the [`table`] backend, which maps names to host functions.

mod backend;
mod error;
mod library;
mod session;

#[cfg(feature = "llvm")]
pub mod orc;

#[cfg(any(test, feature = "testing"))]
pub mod table;

pub use backend::{CompiledModule, JitBackend, SymbolAddress};
pub use error::SessionError;
pub use library::{LibraryLoader, LibraryPolicy, LoadError};
pub use session::{JitSession, ModuleStatus};
