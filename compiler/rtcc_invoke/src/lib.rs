//! Invocable Objects for rtcc
//!
//! Compiled code can hand the host long-lived objects that follow a
//! setup/update/teardown protocol. A factory function, found by name in the
//! JIT session, returns an owned object; [`InvocableLifecycle`] then drives
//! it through its states according to an [`ExecutionMode`].
//!
//! # States
//!
//! ```text
//! Created ──setup──▶ Initialized ──teardown──▶ Retired
//!    │                  ▲    │update
//!    │                  └────┘
//!    └──────────────teardown──────────────────▶ Retired
//! ```
//!
//! `UpdateOnly` objects are updated straight from `Created`; setup is never
//! called for them. `SetupOnly` objects ignore updates.
//!
//! # C ABI
//!
//! Objects written in C or C++ expose a [`RawInvocable`] whose first field
//! points to an [`InvocableVTable`]. The matching header ships in
//! `include/rtcc/invocable.h`. [`NativeInvocable`] adapts such an object to
//! the [`Invocable`] trait.

mod host;
mod lifecycle;
mod native;

pub use host::{HostContext, Invocable, Status, NOTOK, OK};
pub use lifecycle::{ExecutionMode, InvocableLifecycle, LifecycleError, LifecycleState};
pub use native::{InvocableFactory, InvocableVTable, NativeInvocable, RawInvocable};

/// Directory holding the C header for invocable objects.
///
/// Pass it to the compiler with `-I` so sources can include
/// `<rtcc/invocable.h>`.
pub fn include_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("include")
}
