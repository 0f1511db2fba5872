//! LLVM ORC LLJIT backend.
//!
//! Built on the LLVM 17 ORC C API through `llvm-sys`; target initialization
//! goes through `inkwell`. Every module is added to the LLJIT's main
//! `JITDylib`, so modules see each other's symbols by name. The JITDylib
//! also carries a generator over the running process, which makes host
//! functions and every permanently loaded library visible to compiled code.
//!
//! # Debugging
//!
//! - `RTCC_DEBUG_IR=1`: print each module's IR to stderr before it is added.
//! - `RUST_LOG=rtcc_jit=debug`: log target triple, data layout and lookups.

mod error;
mod module;
mod target;

use std::ffi::{CStr, CString};

use llvm_sys::orc2::lljit::{
    LLVMOrcCreateLLJIT, LLVMOrcCreateLLJITBuilder, LLVMOrcDisposeLLJIT,
    LLVMOrcLLJITAddLLVMIRModule, LLVMOrcLLJITBuilderSetJITTargetMachineBuilder,
    LLVMOrcLLJITGetDataLayoutStr, LLVMOrcLLJITGetGlobalPrefix, LLVMOrcLLJITGetMainJITDylib,
    LLVMOrcLLJITLookup, LLVMOrcLLJITMangleAndIntern, LLVMOrcLLJITRef,
};
use llvm_sys::orc2::{
    LLVMOrcCreateDynamicLibrarySearchGeneratorForProcess, LLVMOrcExecutorAddress,
    LLVMOrcJITDylibAddGenerator, LLVMOrcReleaseSymbolStringPoolEntry,
    LLVMOrcSymbolStringPoolEntryStr,
};
use llvm_sys::support::LLVMLoadLibraryPermanently;

pub use module::OrcModule;

use self::error::check;
use self::target::HostTargetMachine;
use crate::{CompiledModule, JitBackend, SessionError, SymbolAddress};

/// An LLJIT instance bound to the current process.
pub struct OrcBackend {
    jit: LLVMOrcLLJITRef,
    triple: String,
}

// SAFETY: LLJIT is internally synchronized; the session additionally
// serializes every call.
unsafe impl Send for OrcBackend {}

impl OrcBackend {
    /// Detect the host, build an LLJIT for it and expose the process's own
    /// symbols to compiled code.
    pub fn create() -> Result<Self, SessionError> {
        let host = HostTargetMachine::detect()?;
        let triple = host.triple().to_string();

        let jit = unsafe {
            let builder = LLVMOrcCreateLLJITBuilder();
            // The builder takes the target machine builder, and LLJIT creation
            // consumes the builder.
            LLVMOrcLLJITBuilderSetJITTargetMachineBuilder(builder, host.into_raw());
            let mut jit: LLVMOrcLLJITRef = std::ptr::null_mut();
            check(LLVMOrcCreateLLJIT(&mut jit, builder)).map_err(SessionError::TargetMachine)?;
            jit
        };
        let backend = Self { jit, triple };
        backend.expose_process_symbols()?;

        let data_layout = unsafe { CStr::from_ptr(LLVMOrcLLJITGetDataLayoutStr(backend.jit)) };
        tracing::debug!(
            triple = %backend.triple,
            data_layout = %data_layout.to_string_lossy(),
            "created LLJIT"
        );
        Ok(backend)
    }

    pub fn triple(&self) -> &str {
        &self.triple
    }

    fn expose_process_symbols(&self) -> Result<(), SessionError> {
        unsafe {
            // A null filename makes the running executable itself permanent.
            if LLVMLoadLibraryPermanently(std::ptr::null()) != 0 {
                return Err(SessionError::TargetMachine(
                    "cannot load process symbols".to_string(),
                ));
            }

            let prefix = LLVMOrcLLJITGetGlobalPrefix(self.jit);
            let mut generator = std::ptr::null_mut();
            check(LLVMOrcCreateDynamicLibrarySearchGeneratorForProcess(
                &mut generator,
                prefix,
                None,
                std::ptr::null_mut(),
            ))
            .map_err(SessionError::TargetMachine)?;

            LLVMOrcJITDylibAddGenerator(LLVMOrcLLJITGetMainJITDylib(self.jit), generator);
        }
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), SessionError> {
        if self.jit.is_null() {
            return Ok(());
        }
        let jit = std::mem::replace(&mut self.jit, std::ptr::null_mut());
        unsafe { check(LLVMOrcDisposeLLJIT(jit)) }.map_err(SessionError::Teardown)
    }
}

impl JitBackend for OrcBackend {
    type Module = OrcModule;

    fn name(&self) -> &str {
        "orc-lljit"
    }

    fn add_module(&mut self, module: OrcModule) -> Result<(), SessionError> {
        let name = module.name().to_string();
        if let Some(ir) = module.ir() {
            eprintln!("=== IR for {name} ===\n{ir}");
        }

        // The LLJIT takes ownership of the module even when adding fails.
        unsafe {
            let dylib = LLVMOrcLLJITGetMainJITDylib(self.jit);
            check(LLVMOrcLLJITAddLLVMIRModule(self.jit, dylib, module.into_raw()))
        }
        .map_err(|message| SessionError::Link {
            module: name,
            message,
        })
    }

    fn lookup(&mut self, symbol: &str) -> Result<SymbolAddress, SessionError> {
        let name = CString::new(symbol).map_err(|_| SessionError::SymbolNotFound {
            symbol: symbol.to_string(),
        })?;

        let mut address: LLVMOrcExecutorAddress = 0;
        unsafe { check(LLVMOrcLLJITLookup(self.jit, &mut address, name.as_ptr())) }.map_err(
            |message| SessionError::Lookup {
                symbol: symbol.to_string(),
                message,
            },
        )?;

        usize::try_from(address)
            .ok()
            .and_then(SymbolAddress::new)
            .ok_or_else(|| SessionError::Lookup {
                symbol: symbol.to_string(),
                message: format!("invalid address {address:#x}"),
            })
    }

    fn mangle(&self, symbol: &str) -> String {
        let Ok(name) = CString::new(symbol) else {
            return symbol.to_string();
        };
        unsafe {
            let entry = LLVMOrcLLJITMangleAndIntern(self.jit, name.as_ptr());
            let mangled = CStr::from_ptr(LLVMOrcSymbolStringPoolEntryStr(entry))
                .to_string_lossy()
                .into_owned();
            LLVMOrcReleaseSymbolStringPoolEntry(entry);
            mangled
        }
    }

    fn end(&mut self) -> Result<(), SessionError> {
        self.dispose()
    }
}

impl Drop for OrcBackend {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            tracing::warn!("{e}");
        }
    }
}

#[cfg(test)]
mod tests;
