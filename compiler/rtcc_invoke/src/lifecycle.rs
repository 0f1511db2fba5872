//! Invocable lifecycle state machine.

use std::fmt;

use crate::{HostContext, Invocable, Status, NOTOK, OK};

/// Which phases of the host cycle drive the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Setup only; updates are ignored.
    SetupOnly,
    /// Updates only; setup is never called.
    UpdateOnly,
    /// Setup, then updates.
    SetupAndUpdate,
}

impl ExecutionMode {
    /// Decode the host's integer mode (1, 2 or 3).
    pub fn from_raw(raw: i32) -> Result<Self, LifecycleError> {
        match raw {
            1 => Ok(Self::SetupOnly),
            2 => Ok(Self::UpdateOnly),
            3 => Ok(Self::SetupAndUpdate),
            other => Err(LifecycleError::InvalidMode(other)),
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            Self::SetupOnly => 1,
            Self::UpdateOnly => 2,
            Self::SetupAndUpdate => 3,
        }
    }

    pub fn runs_setup(self) -> bool {
        matches!(self, Self::SetupOnly | Self::SetupAndUpdate)
    }

    pub fn runs_update(self) -> bool {
        matches!(self, Self::UpdateOnly | Self::SetupAndUpdate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Initialized,
    Retired,
}

/// Misuse of an invocable lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The host passed a mode outside 1..=3.
    InvalidMode(i32),
    /// Setup was called twice.
    AlreadyInitialized { label: String },
    /// Update was called before setup in a mode that requires it.
    NotInitialized { label: String },
    /// The object has already been torn down.
    Retired { label: String },
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMode(mode) => {
                write!(f, "invalid execution mode {mode} (expected 1, 2 or 3)")
            }
            Self::AlreadyInitialized { label } => write!(f, "'{label}' is already initialized"),
            Self::NotInitialized { label } => {
                write!(f, "'{label}' was updated before setup")
            }
            Self::Retired { label } => write!(f, "'{label}' has been retired"),
        }
    }
}

impl std::error::Error for LifecycleError {}

/// Drives one invocable object from creation to retirement.
///
/// The object is released when the lifecycle retires, or when the lifecycle
/// is dropped without retiring (teardown is not called in that case).
pub struct InvocableLifecycle {
    mode: ExecutionMode,
    state: LifecycleState,
    object: Option<Box<dyn Invocable>>,
    label: String,
}

impl InvocableLifecycle {
    /// Wrap a freshly created object. `label` names it in logs and errors,
    /// usually the factory symbol.
    pub fn new(mode: ExecutionMode, object: Box<dyn Invocable>, label: impl Into<String>) -> Self {
        Self {
            mode,
            state: LifecycleState::Created,
            object: Some(object),
            label: label.into(),
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the underlying object is still owned.
    pub fn is_live(&self) -> bool {
        self.object.is_some()
    }

    /// Run setup. In `UpdateOnly` mode this does nothing and returns `OK`.
    pub fn setup(
        &mut self,
        host: HostContext,
        outputs: &mut [f64],
        inputs: &[f64],
    ) -> Result<Status, LifecycleError> {
        match self.state {
            LifecycleState::Retired => return Err(self.retired()),
            LifecycleState::Initialized => {
                return Err(LifecycleError::AlreadyInitialized {
                    label: self.label.clone(),
                })
            }
            LifecycleState::Created => {}
        }
        if !self.mode.runs_setup() {
            tracing::trace!(label = %self.label, "setup skipped");
            return Ok(OK);
        }

        let Some(object) = self.object.as_mut() else {
            return Err(self.retired());
        };
        let status = object.setup(host, outputs, inputs);
        self.state = LifecycleState::Initialized;
        tracing::debug!(label = %self.label, status, "setup");
        Ok(status)
    }

    /// Run one update. In `SetupOnly` mode this does nothing and returns
    /// `OK`.
    pub fn update(
        &mut self,
        host: HostContext,
        outputs: &mut [f64],
        inputs: &[f64],
    ) -> Result<Status, LifecycleError> {
        if self.state == LifecycleState::Retired {
            return Err(self.retired());
        }
        if !self.mode.runs_update() {
            return Ok(OK);
        }
        if self.mode.runs_setup() && self.state == LifecycleState::Created {
            return Err(LifecycleError::NotInitialized {
                label: self.label.clone(),
            });
        }

        let Some(object) = self.object.as_mut() else {
            return Err(self.retired());
        };
        Ok(object.update(host, outputs, inputs))
    }

    /// Tear the object down and release it, whatever status teardown
    /// returns.
    pub fn teardown(&mut self, host: HostContext) -> Result<Status, LifecycleError> {
        let Some(mut object) = self.object.take() else {
            return Err(self.retired());
        };
        let status = object.teardown(host);
        drop(object);
        self.state = LifecycleState::Retired;
        tracing::debug!(label = %self.label, status, "teardown");
        Ok(status)
    }

    /// [`update`](Self::update) flattened to a host status.
    pub fn update_status(&mut self, host: HostContext, outputs: &mut [f64], inputs: &[f64]) -> Status {
        self.update(host, outputs, inputs).unwrap_or_else(|e| {
            tracing::error!("{e}");
            NOTOK
        })
    }

    /// [`teardown`](Self::teardown) flattened to a host status.
    pub fn teardown_status(&mut self, host: HostContext) -> Status {
        self.teardown(host).unwrap_or_else(|e| {
            tracing::error!("{e}");
            NOTOK
        })
    }

    fn retired(&self) -> LifecycleError {
        LifecycleError::Retired {
            label: self.label.clone(),
        }
    }
}

impl fmt::Debug for InvocableLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocableLifecycle")
            .field("label", &self.label)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("live", &self.is_live())
            .finish()
    }
}

impl Drop for InvocableLifecycle {
    fn drop(&mut self) {
        if self.object.is_some() {
            tracing::debug!(label = %self.label, "released without teardown");
        }
    }
}

#[cfg(test)]
mod tests;
