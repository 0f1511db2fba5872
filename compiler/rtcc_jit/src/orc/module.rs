//! Bitcode modules packaged for ORC.

use std::ffi::CString;

use llvm_sys::bit_reader::LLVMParseBitcodeInContext2;
use llvm_sys::core::{
    LLVMCreateMemoryBufferWithMemoryRangeCopy, LLVMDisposeMemoryBuffer,
    LLVMGetFirstFunction, LLVMGetFirstGlobal, LLVMGetLinkage, LLVMGetNextFunction,
    LLVMGetNextGlobal, LLVMGetValueName2, LLVMIsDeclaration, LLVMPrintModuleToString,
    LLVMSetModuleIdentifier,
};
use llvm_sys::orc2::{
    LLVMOrcCreateNewThreadSafeContext, LLVMOrcCreateNewThreadSafeModule,
    LLVMOrcDisposeThreadSafeContext, LLVMOrcDisposeThreadSafeModule,
    LLVMOrcThreadSafeContextGetContext, LLVMOrcThreadSafeModuleRef,
};
use llvm_sys::prelude::{LLVMModuleRef, LLVMValueRef};
use llvm_sys::LLVMLinkage;

use super::error::LlvmMessage;
use crate::{CompiledModule, SessionError};

/// A parsed bitcode module together with its own thread-safe context.
///
/// Ownership of the underlying `ThreadSafeModule` moves to the LLJIT when
/// the module is added; until then it is disposed on drop.
pub struct OrcModule {
    name: String,
    symbols: Vec<String>,
    ir: Option<String>,
    raw: LLVMOrcThreadSafeModuleRef,
}

// SAFETY: the module owns its context exclusively; nothing else references
// either until ownership moves to the LLJIT.
unsafe impl Send for OrcModule {}

impl OrcModule {
    /// Parse bitcode into a fresh context.
    ///
    /// With `RTCC_DEBUG_IR` set, the textual IR is kept for printing when the
    /// module is added.
    pub fn from_bitcode(name: &str, bytes: &[u8]) -> Result<Self, SessionError> {
        let invalid = |message: &str| SessionError::InvalidModule {
            module: name.to_string(),
            message: message.to_string(),
        };
        let c_name = CString::new(name).map_err(|_| invalid("name contains a NUL byte"))?;

        unsafe {
            let ts_context = LLVMOrcCreateNewThreadSafeContext();
            let context = LLVMOrcThreadSafeContextGetContext(ts_context);

            let buffer = LLVMCreateMemoryBufferWithMemoryRangeCopy(
                bytes.as_ptr().cast(),
                bytes.len(),
                c_name.as_ptr(),
            );
            let mut module: LLVMModuleRef = std::ptr::null_mut();
            let failed = LLVMParseBitcodeInContext2(context, buffer, &mut module);
            LLVMDisposeMemoryBuffer(buffer);

            if failed != 0 || module.is_null() {
                LLVMOrcDisposeThreadSafeContext(ts_context);
                return Err(invalid("malformed bitcode"));
            }

            LLVMSetModuleIdentifier(module, c_name.as_ptr(), name.len());
            let symbols = defined_symbols(module);
            let ir = debug_ir_enabled()
                .then(|| LlvmMessage::new(LLVMPrintModuleToString(module)).to_string_lossy());

            let raw = LLVMOrcCreateNewThreadSafeModule(module, ts_context);
            // The module keeps its own reference to the context.
            LLVMOrcDisposeThreadSafeContext(ts_context);
            if raw.is_null() {
                return Err(invalid("cannot create thread-safe module"));
            }

            tracing::debug!(module = name, symbols = symbols.len(), "parsed bitcode");
            Ok(Self {
                name: name.to_string(),
                symbols,
                ir,
                raw,
            })
        }
    }

    /// Textual IR, captured when `RTCC_DEBUG_IR` is set.
    pub fn ir(&self) -> Option<&str> {
        self.ir.as_deref()
    }

    /// Give up ownership of the raw module.
    pub(super) fn into_raw(mut self) -> LLVMOrcThreadSafeModuleRef {
        std::mem::replace(&mut self.raw, std::ptr::null_mut())
    }
}

impl CompiledModule for OrcModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn defined_symbols(&self) -> &[String] {
        &self.symbols
    }
}

impl Drop for OrcModule {
    fn drop(&mut self) {
        if !self.raw.is_null() {
            unsafe { LLVMOrcDisposeThreadSafeModule(self.raw) };
        }
    }
}

impl std::fmt::Debug for OrcModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrcModule")
            .field("name", &self.name)
            .field("symbols", &self.symbols)
            .finish_non_exhaustive()
    }
}

pub(super) fn debug_ir_enabled() -> bool {
    std::env::var_os("RTCC_DEBUG_IR").is_some_and(|v| !v.is_empty())
}

/// Strong external definitions (functions and globals with a body or
/// initializer).
unsafe fn defined_symbols(module: LLVMModuleRef) -> Vec<String> {
    let mut symbols = Vec::new();

    let mut function = LLVMGetFirstFunction(module);
    while !function.is_null() {
        push_if_exported(&mut symbols, function);
        function = LLVMGetNextFunction(function);
    }

    let mut global = LLVMGetFirstGlobal(module);
    while !global.is_null() {
        push_if_exported(&mut symbols, global);
        global = LLVMGetNextGlobal(global);
    }

    symbols
}

unsafe fn push_if_exported(symbols: &mut Vec<String>, value: LLVMValueRef) {
    if LLVMIsDeclaration(value) != 0 {
        return;
    }
    // Weak and linkonce definitions may legitimately repeat across modules.
    if LLVMGetLinkage(value) != LLVMLinkage::LLVMExternalLinkage {
        return;
    }

    let mut len = 0;
    let ptr = LLVMGetValueName2(value, &mut len);
    if ptr.is_null() || len == 0 {
        return;
    }
    let bytes = std::slice::from_raw_parts(ptr.cast::<u8>(), len);
    symbols.push(String::from_utf8_lossy(bytes).into_owned());
}
