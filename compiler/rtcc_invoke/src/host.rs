//! Host boundary types.

use std::ffi::c_void;

/// Integer status returned across the host boundary.
pub type Status = i32;

/// Success.
pub const OK: Status = 0;

/// Failure.
pub const NOTOK: Status = -1;

/// Opaque pointer to the host's per-request context.
///
/// Passed through to compiled code unchanged; never dereferenced here.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostContext(*mut c_void);

impl HostContext {
    pub fn new(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub fn null() -> Self {
        Self(std::ptr::null_mut())
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self::null()
    }
}

/// An object driven through setup, per-cycle updates and teardown.
///
/// `outputs` and `inputs` are the host's buffers for the current call.
pub trait Invocable {
    fn setup(&mut self, host: HostContext, outputs: &mut [f64], inputs: &[f64]) -> Status;

    fn update(&mut self, host: HostContext, outputs: &mut [f64], inputs: &[f64]) -> Status;

    fn teardown(&mut self, host: HostContext) -> Status;
}
