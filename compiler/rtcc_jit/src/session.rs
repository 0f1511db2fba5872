//! The long-lived JIT session.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::backend::CompiledModule;
use crate::{JitBackend, SessionError, SymbolAddress};

/// Session numbers start at 1.
static NEXT_SESSION: AtomicUsize = AtomicUsize::new(1);

/// Code generation status of a module added to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    /// Added, no code generated yet.
    Pending,
    /// Code generated by a lookup of one of its symbols.
    Compiled,
}

#[derive(Debug)]
struct ModuleRecord {
    name: String,
    status: ModuleStatus,
}

struct SessionState<B> {
    /// `None` once the session has ended.
    backend: Option<B>,
    modules: Vec<ModuleRecord>,
    /// Symbol name to index into `modules`.
    owners: FxHashMap<String, usize>,
    resolved: FxHashMap<String, SymbolAddress>,
}

/// Sole gateway for adding modules and resolving symbols.
///
/// All modules share one namespace, so a module can call symbols defined by
/// any module added before it. Every operation takes the session lock, so at
/// most one `add_module`, `resolve` or `end` runs at a time.
///
/// Addresses returned by [`resolve`](Self::resolve) stay valid until
/// [`end`](Self::end).
pub struct JitSession<B: JitBackend> {
    name: String,
    state: Mutex<SessionState<B>>,
}

impl<B: JitBackend> JitSession<B> {
    /// Create a session around a freshly created backend.
    pub fn new(backend: B) -> Self {
        let id = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
        let name = format!("<main-{id}>");
        tracing::debug!(session = %name, backend = backend.name(), "created JIT session");

        Self {
            name,
            state: Mutex::new(SessionState {
                backend: Some(backend),
                modules: Vec::new(),
                owners: FxHashMap::default(),
                resolved: FxHashMap::default(),
            }),
        }
    }

    /// Create a session, building the backend first.
    ///
    /// Nothing is created if the backend fails.
    pub fn create<F>(make_backend: F) -> Result<Self, SessionError>
    where
        F: FnOnce() -> Result<B, SessionError>,
    {
        make_backend().map(Self::new)
    }

    /// Unique session name (`<main-N>`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transfer a module into the session namespace.
    ///
    /// Fails without registering anything if one of the module's symbols is
    /// already defined, or if the backend rejects the module.
    pub fn add_module(&self, module: B::Module) -> Result<(), SessionError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let backend = state.backend.as_mut().ok_or_else(|| SessionError::Ended {
            session: self.name.clone(),
        })?;

        let module_name = module.name().to_string();
        let symbols = module.defined_symbols().to_vec();
        for symbol in &symbols {
            if let Some(&index) = state.owners.get(symbol) {
                return Err(SessionError::DuplicateSymbol {
                    symbol: symbol.clone(),
                    module: module_name,
                    existing: state.modules[index].name.clone(),
                });
            }
        }

        backend.add_module(module)?;

        let index = state.modules.len();
        state.modules.push(ModuleRecord {
            name: module_name,
            status: ModuleStatus::Pending,
        });
        for symbol in symbols {
            state.owners.insert(symbol, index);
        }

        tracing::debug!(
            session = %self.name,
            module = %state.modules[index].name,
            "added module"
        );
        Ok(())
    }

    /// Resolve a symbol to its address.
    ///
    /// The first lookup of a symbol generates code for its module. Symbols
    /// no module defines are still looked up in the backend, which may find
    /// them among the process's own symbols.
    pub fn resolve(&self, symbol: &str) -> Result<SymbolAddress, SessionError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let backend = state.backend.as_mut().ok_or_else(|| SessionError::Ended {
            session: self.name.clone(),
        })?;

        if let Some(&address) = state.resolved.get(symbol) {
            return Ok(address);
        }

        let owner = state.owners.get(symbol).copied();
        let address = match backend.lookup(symbol) {
            Ok(address) => address,
            Err(SessionError::Lookup { .. } | SessionError::SymbolNotFound { .. })
                if owner.is_none() =>
            {
                return Err(SessionError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        if let Some(index) = owner {
            let record = &mut state.modules[index];
            if record.status == ModuleStatus::Pending {
                tracing::debug!(session = %self.name, module = %record.name, "compiled module");
                record.status = ModuleStatus::Compiled;
            }
        }
        state.resolved.insert(symbol.to_string(), address);

        tracing::debug!(
            session = %self.name,
            symbol,
            mangled = %backend.mangle(symbol),
            address = %address,
            "resolved symbol"
        );
        Ok(address)
    }

    /// Tear down the execution context, releasing all generated code.
    ///
    /// Only the first call has an effect; later calls return `Ok(())`.
    pub fn end(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        let Some(mut backend) = state.backend.take() else {
            return Ok(());
        };
        state.resolved.clear();

        tracing::debug!(session = %self.name, modules = state.modules.len(), "ending JIT session");
        backend.end()
    }

    pub fn is_ended(&self) -> bool {
        self.state.lock().backend.is_none()
    }

    /// Status of the module that defines `symbol`.
    pub fn status_of(&self, symbol: &str) -> Option<ModuleStatus> {
        let state = self.state.lock();
        state
            .owners
            .get(symbol)
            .map(|&index| state.modules[index].status)
    }

    /// Whether a module in the session defines `symbol`.
    pub fn contains(&self, symbol: &str) -> bool {
        self.state.lock().owners.contains_key(symbol)
    }

    pub fn module_count(&self) -> usize {
        self.state.lock().modules.len()
    }
}

impl<B: JitBackend> std::fmt::Debug for JitSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JitSession")
            .field("name", &self.name)
            .field("modules", &self.module_count())
            .field("ended", &self.is_ended())
            .finish()
    }
}
