//! Host target detection for the JIT.

use std::sync::OnceLock;

use inkwell::targets::{InitializationConfig, Target};
use llvm_sys::orc2::{
    LLVMOrcDisposeJITTargetMachineBuilder, LLVMOrcJITTargetMachineBuilderDetectHost,
    LLVMOrcJITTargetMachineBuilderGetTargetTriple, LLVMOrcJITTargetMachineBuilderRef,
};

use super::error::{check, LlvmMessage};
use crate::SessionError;

static NATIVE_TARGET_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Initialize the native LLVM target, its asm printer and parser.
///
/// Safe to call multiple times; initialization happens once.
pub(super) fn initialize_native_target() -> Result<(), SessionError> {
    NATIVE_TARGET_INIT
        .get_or_init(|| Target::initialize_native(&InitializationConfig::default()))
        .clone()
        .map_err(SessionError::TargetDetection)
}

/// Target machine builder for the host, owned until handed to an LLJIT
/// builder.
pub(super) struct HostTargetMachine {
    raw: LLVMOrcJITTargetMachineBuilderRef,
    triple: String,
}

impl HostTargetMachine {
    pub(super) fn detect() -> Result<Self, SessionError> {
        initialize_native_target()?;

        let mut raw = std::ptr::null_mut();
        unsafe { check(LLVMOrcJITTargetMachineBuilderDetectHost(&mut raw)) }
            .map_err(SessionError::TargetDetection)?;
        if raw.is_null() {
            return Err(SessionError::TargetDetection(
                "no target machine builder returned".to_string(),
            ));
        }

        let triple = unsafe { LlvmMessage::new(LLVMOrcJITTargetMachineBuilderGetTargetTriple(raw)) }
            .to_string_lossy();
        Ok(Self { raw, triple })
    }

    pub(super) fn triple(&self) -> &str {
        &self.triple
    }

    /// Release ownership of the raw builder.
    pub(super) fn into_raw(mut self) -> LLVMOrcJITTargetMachineBuilderRef {
        std::mem::replace(&mut self.raw, std::ptr::null_mut())
    }
}

impl Drop for HostTargetMachine {
    fn drop(&mut self) {
        if !self.raw.is_null() {
            unsafe { LLVMOrcDisposeJITTargetMachineBuilder(self.raw) };
        }
    }
}
