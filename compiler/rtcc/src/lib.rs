//! rtcc: Runtime C/C++ Compiler
//!
//! Compiles C and C++ source text while the host process is running, links
//! it into a single in-process JIT session, and calls into it. Two kinds of
//! requests are supported:
//!
//! - **Compile**: compile a unit, then call its entry point once with the
//!   host context ([`Engine::compile`], [`Engine::compile_request`]).
//! - **Invoke**: look up a factory symbol defined by earlier compiled code,
//!   create an object from it, and drive the object through setup, updates
//!   and teardown ([`Engine::invoke`]).
//!
//! All compiled units share one namespace, so later units can call functions
//! defined by earlier ones.
//!
//! # Example
//!
//! ```ignore
//! use rtcc::{Engine, EngineConfig, CompileRequest, HostContext};
//!
//! rtcc::init_tracing();
//! let engine = Engine::with_clang(EngineConfig::from_env()?);
//! let request = CompileRequest::new(
//!     "main_a",
//!     r#"extern "C" int main_a(void *host) { return 42; }"#,
//! );
//! assert_eq!(engine.compile_request(&request, HostContext::null()), 42);
//! ```
//!
//! # Debugging
//!
//! - `RUST_LOG=rtcc=debug,rtcc_jit=debug`: engine and session events.
//! - `-v` in a compile request's options: verbose diagnostics on target
//!   `rtcc::diagnostics` for that request and every later invoke request.
//! - `RTCC_DEBUG_IR=1`: print each module's IR before it is added
//!   (requires the `llvm` feature).

mod config;
mod engine;
mod error;
mod request;
mod toolchain;

use std::sync::Once;

pub use config::EngineConfig;
pub use engine::{Engine, EntryPoint, Invocation, SessionSlot};
pub use error::{EngineError, ErrorKind};
pub use request::CompileRequest;
#[cfg(feature = "llvm")]
pub use toolchain::ClangOrcToolchain;
pub use toolchain::{ModuleOf, Toolchain};

pub use rtcc_frontend::{diagnostics, SourceUnit};
pub use rtcc_invoke::{
    ExecutionMode, HostContext, Invocable, InvocableLifecycle, LifecycleState, Status, NOTOK, OK,
};
pub use rtcc_jit::{LibraryPolicy, ModuleStatus};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing from `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call repeatedly.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            // Another subscriber may already be installed by the host.
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
