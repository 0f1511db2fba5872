//! LLVM error and message handling.

use std::ffi::{c_char, CStr};

use llvm_sys::error::{LLVMDisposeErrorMessage, LLVMErrorRef, LLVMGetErrorMessage};

/// Extract the message from an LLVM error, disposing the error.
///
/// # Safety
/// `error` must be a valid, unconsumed error reference.
pub(super) unsafe fn extract_llvm_error_message(error: LLVMErrorRef) -> String {
    let msg_ptr = LLVMGetErrorMessage(error);
    if msg_ptr.is_null() {
        "unknown error".to_string()
    } else {
        let msg = CStr::from_ptr(msg_ptr).to_string_lossy().into_owned();
        LLVMDisposeErrorMessage(msg_ptr);
        msg
    }
}

/// Convert an `LLVMErrorRef` result into `Result<(), String>`.
///
/// # Safety
/// `error` must be null or a valid, unconsumed error reference.
pub(super) unsafe fn check(error: LLVMErrorRef) -> Result<(), String> {
    if error.is_null() {
        Ok(())
    } else {
        Err(extract_llvm_error_message(error))
    }
}

/// Owned string allocated by LLVM, released with `LLVMDisposeMessage`.
pub(super) struct LlvmMessage(*mut c_char);

impl LlvmMessage {
    /// # Safety
    /// `ptr` must be null or a string LLVM expects to be freed with
    /// `LLVMDisposeMessage`.
    pub(super) unsafe fn new(ptr: *mut c_char) -> Self {
        Self(ptr)
    }

    pub(super) fn to_string_lossy(&self) -> String {
        if self.0.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(self.0) }
                .to_string_lossy()
                .into_owned()
        }
    }
}

impl Drop for LlvmMessage {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { llvm_sys::core::LLVMDisposeMessage(self.0) };
        }
    }
}
