//! Backend seam for the JIT session.
//!
//! [`JitSession`](crate::JitSession) keeps the bookkeeping (namespace,
//! duplicate detection, per-module status, address cache) and delegates the
//! actual linking and code generation to a [`JitBackend`].

use std::fmt;

use crate::SessionError;

/// Address of a resolved symbol inside the current process.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolAddress(usize);

impl SymbolAddress {
    /// Wrap a raw address. Returns `None` for null.
    pub fn new(address: usize) -> Option<Self> {
        (address != 0).then_some(Self(address))
    }

    /// Address of a host function, for backends that map names to existing
    /// code.
    pub fn of_fn(ptr: *const ()) -> Option<Self> {
        Self::new(ptr as usize)
    }

    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Reinterpret the address as a function pointer or raw pointer.
    ///
    /// # Safety
    ///
    /// `F` must be pointer-sized and match the real signature of the code at
    /// this address, and the owning session must not have ended.
    pub unsafe fn cast<F: Copy>(self) -> F {
        debug_assert_eq!(std::mem::size_of::<F>(), std::mem::size_of::<usize>());
        std::mem::transmute_copy(&self.0)
    }
}

impl fmt::Debug for SymbolAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolAddress({:#x})", self.0)
    }
}

impl fmt::Display for SymbolAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A module ready to be handed to a backend.
pub trait CompiledModule: Send {
    /// Module identifier, used in errors and logs.
    fn name(&self) -> &str;

    /// Externally visible symbols the module defines.
    fn defined_symbols(&self) -> &[String];
}

/// Linker and code generator behind a [`JitSession`](crate::JitSession).
///
/// The session serializes every call, so implementations need no locking of
/// their own.
pub trait JitBackend: Send {
    type Module: CompiledModule;

    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Take ownership of a module. Must not generate code yet.
    fn add_module(&mut self, module: Self::Module) -> Result<(), SessionError>;

    /// Resolve an unmangled symbol, generating code for its module if needed.
    fn lookup(&mut self, symbol: &str) -> Result<SymbolAddress, SessionError>;

    /// The symbol name as the target ABI spells it.
    fn mangle(&self, symbol: &str) -> String;

    /// Release all generated code. Called at most once.
    fn end(&mut self) -> Result<(), SessionError>;
}
