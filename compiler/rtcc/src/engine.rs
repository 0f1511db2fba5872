//! The compile-and-invoke engine.

use std::ffi::{c_int, c_void};
use std::sync::Arc;

use parking_lot::Mutex;
use rtcc_frontend::{diag, diagnostics, SourceUnit};
use rtcc_invoke::{
    ExecutionMode, HostContext, InvocableFactory, InvocableLifecycle, NativeInvocable, Status,
};
use rtcc_jit::{JitSession, LibraryLoader, SessionError};

use crate::{CompileRequest, EngineConfig, EngineError, Toolchain};

/// Signature of a compiled entry point: takes the host context, returns a
/// status.
pub type EntryPoint = unsafe extern "C" fn(host: *mut c_void) -> c_int;

/// The engine's session, created on first use.
#[derive(Debug)]
pub enum SessionSlot<S> {
    Vacant,
    Live(Arc<S>),
    /// Shut down; never refilled.
    Ended,
}

/// An invocable object created by a factory, after its setup call.
#[derive(Debug)]
pub struct Invocation {
    pub lifecycle: InvocableLifecycle,
    /// Status returned by setup (`OK` when setup was skipped).
    pub setup_status: Status,
}

/// Compiles source units into one shared JIT session and runs what they
/// define.
///
/// Every request runs synchronously on the calling thread. Requests from
/// different threads may overlap; the session serializes module adds and
/// symbol lookups.
pub struct Engine<T: Toolchain> {
    toolchain: T,
    config: EngineConfig,
    loader: LibraryLoader,
    slot: Mutex<SessionSlot<JitSession<T::Backend>>>,
}

impl<T: Toolchain> Engine<T> {
    pub fn new(toolchain: T, config: EngineConfig) -> Self {
        Self {
            toolchain,
            config,
            loader: LibraryLoader::new(),
            slot: Mutex::new(SessionSlot::Vacant),
        }
    }

    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn libraries(&self) -> &LibraryLoader {
        &self.loader
    }

    /// The live session, if one has been created and not shut down.
    pub fn current_session(&self) -> Option<Arc<JitSession<T::Backend>>> {
        match &*self.slot.lock() {
            SessionSlot::Live(session) => Some(Arc::clone(session)),
            SessionSlot::Vacant | SessionSlot::Ended => None,
        }
    }

    pub fn is_shut_down(&self) -> bool {
        matches!(*self.slot.lock(), SessionSlot::Ended)
    }

    /// The live session, creating it on first use.
    pub fn session(&self) -> Result<Arc<JitSession<T::Backend>>, EngineError> {
        let mut slot = self.slot.lock();
        match &*slot {
            SessionSlot::Live(session) => return Ok(Arc::clone(session)),
            SessionSlot::Ended => return Err(EngineError::ShutDown),
            SessionSlot::Vacant => {}
        }

        let session = Arc::new(JitSession::create(|| self.toolchain.create_backend())?);
        diag!(session = %session.name(), "created JIT session");
        *slot = SessionSlot::Live(Arc::clone(&session));
        Ok(session)
    }

    /// Compile a unit, add it to the session and call its entry point once.
    ///
    /// Returns the entry point's return value. The diagnostics toggle is
    /// set from the unit's options before anything else happens.
    pub fn compile(&self, unit: &SourceUnit, host: HostContext) -> Result<i32, EngineError> {
        diagnostics::apply_options(unit.compiler_options());
        diag!(entry_point = %unit.entry_point(), "compile request");

        if self.is_shut_down() {
            return Err(EngineError::ShutDown);
        }

        let module = self.toolchain.compile(unit)?;
        self.loader
            .load_all(unit.library_paths(), self.config.library_policy())?;

        let session = self.session()?;
        session.add_module(module)?;

        let address = session.resolve(unit.entry_point())?;
        diag!(entry_point = %unit.entry_point(), address = %address, "resolved entry point");

        // SAFETY: compiled entry points follow the `EntryPoint` signature.
        let result = unsafe {
            let entry: EntryPoint = address.cast();
            entry(host.as_ptr())
        };
        diag!(entry_point = %unit.entry_point(), result, "entry point returned");
        Ok(result)
    }

    /// [`compile`](Self::compile) for a host request, flattened to a status.
    pub fn compile_request(&self, request: &CompileRequest, host: HostContext) -> Status {
        match self.compile(&request.to_unit(), host) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(entry_point = %request.entry_point, "{e}");
                e.status()
            }
        }
    }

    /// Create an invocable object from a factory symbol and run its setup.
    ///
    /// The mode is checked before anything is looked up; an invalid mode
    /// creates nothing. Factories come from compiled units, so before the
    /// first compile there is no session and every factory is missing.
    pub fn invoke(
        &self,
        factory: &str,
        mode: i32,
        host: HostContext,
        outputs: &mut [f64],
        inputs: &[f64],
    ) -> Result<Invocation, EngineError> {
        let mode = ExecutionMode::from_raw(mode)?;
        diag!(factory, mode = mode.as_raw(), "invoke request");

        let session = match &*self.slot.lock() {
            SessionSlot::Live(session) => Arc::clone(session),
            SessionSlot::Ended => return Err(EngineError::ShutDown),
            SessionSlot::Vacant => {
                return Err(SessionError::SymbolNotFound {
                    symbol: factory.to_string(),
                }
                .into())
            }
        };
        let address = session.resolve(factory)?;
        diag!(factory, address = %address, "resolved factory");

        // SAFETY: factory symbols follow the `InvocableFactory` signature.
        let object = unsafe {
            let make: InvocableFactory = address.cast();
            NativeInvocable::from_factory(make)
        }
        .ok_or_else(|| EngineError::NullInstance {
            factory: factory.to_string(),
        })?;
        diag!(factory, instance = ?object.as_ptr(), "created instance");

        let mut lifecycle = InvocableLifecycle::new(mode, Box::new(object), factory);
        let setup_status = lifecycle.setup(host, outputs, inputs)?;
        diag!(factory, status = setup_status, "setup returned");

        Ok(Invocation {
            lifecycle,
            setup_status,
        })
    }

    /// End the session and refuse further requests.
    ///
    /// Safe to call more than once; only the first call ends the session.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        let previous = std::mem::replace(&mut *self.slot.lock(), SessionSlot::Ended);
        match previous {
            SessionSlot::Live(session) => {
                tracing::debug!(session = %session.name(), "shutting down");
                session.end()?;
                Ok(())
            }
            SessionSlot::Vacant | SessionSlot::Ended => Ok(()),
        }
    }
}

#[cfg(feature = "llvm")]
impl Engine<crate::ClangOrcToolchain> {
    /// Engine over the installed clang and LLVM ORC.
    pub fn with_clang(config: EngineConfig) -> Self {
        Self::new(crate::ClangOrcToolchain::new(&config), config)
    }
}

impl<T: Toolchain> Drop for Engine<T> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!("{e}");
        }
    }
}

impl<T: Toolchain> std::fmt::Debug for Engine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("session", &self.current_session().map(|s| s.name().to_string()))
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}
