//! Symbol-table backend.
//!
//! Maps names to functions that already exist in the process. Modules are
//! just name/address lists, so session, engine and lifecycle behavior can be
//! exercised without LLVM.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{CompiledModule, JitBackend, SessionError, SymbolAddress};

/// A module whose symbols are host functions.
#[derive(Debug, Clone)]
pub struct SymbolTableModule {
    name: String,
    symbols: Vec<String>,
    addresses: Vec<SymbolAddress>,
}

impl SymbolTableModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: Vec::new(),
            addresses: Vec::new(),
        }
    }

    /// Define a symbol (builder pattern).
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>, address: SymbolAddress) -> Self {
        self.symbols.push(symbol.into());
        self.addresses.push(address);
        self
    }
}

impl CompiledModule for SymbolTableModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn defined_symbols(&self) -> &[String] {
        &self.symbols
    }
}

/// Backend resolving names from the modules added to it.
#[derive(Debug, Default)]
pub struct SymbolTableBackend {
    symbols: FxHashMap<String, SymbolAddress>,
    rejected: Vec<String>,
    lookups: Arc<AtomicUsize>,
    ended: bool,
}

impl SymbolTableBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `add_module` fail for a module name, as a link error would.
    #[must_use]
    pub fn rejecting(mut self, module: impl Into<String>) -> Self {
        self.rejected.push(module.into());
        self
    }

    /// Counter of lookups that reached the backend.
    pub fn lookup_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.lookups)
    }
}

impl JitBackend for SymbolTableBackend {
    type Module = SymbolTableModule;

    fn name(&self) -> &str {
        "symbol-table"
    }

    fn add_module(&mut self, module: SymbolTableModule) -> Result<(), SessionError> {
        if self.rejected.contains(&module.name) {
            return Err(SessionError::Link {
                module: module.name,
                message: "rejected by backend".to_string(),
            });
        }
        self.symbols
            .extend(module.symbols.into_iter().zip(module.addresses));
        Ok(())
    }

    fn lookup(&mut self, symbol: &str) -> Result<SymbolAddress, SessionError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.symbols
            .get(symbol)
            .copied()
            .ok_or_else(|| SessionError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }

    fn mangle(&self, symbol: &str) -> String {
        symbol.to_string()
    }

    fn end(&mut self) -> Result<(), SessionError> {
        if self.ended {
            return Err(SessionError::Teardown("backend already ended".to_string()));
        }
        self.ended = true;
        self.symbols.clear();
        Ok(())
    }
}
