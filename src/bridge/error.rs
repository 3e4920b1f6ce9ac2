use std::fmt;
use std::path::PathBuf;

use pyo3::prelude::*;
use pyo3::types::PyTracebackMethods;
use thiserror::Error;

/// Lifecycle of the process-wide interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Never started in this process
    Idle,
    /// Owned by a scoped embedded session; finalized when the scope ends
    Embedded,
    /// Shared with the rest of the process and never finalized
    Shared,
    /// Finalized; cannot be restarted
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Embedded => "running (embedded)",
            LifecycleState::Shared => "running (shared)",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Errors raised while crossing the native/Python boundary
#[derive(Debug, Error, PartialEq)]
pub enum BridgeError {
    #[error("failed to start Python runtime: {0}")]
    RuntimeInit(String),

    #[error("Python runtime is {state}; cannot {operation}")]
    RuntimeState {
        state: LifecycleState,
        operation: &'static str,
    },

    #[error("cannot add {} to the module search path: {reason}", .path.display())]
    SearchPath { path: PathBuf, reason: String },

    #[error("module '{module}' could not be imported: {reason}")]
    ModuleNotFound { module: String, reason: String },

    #[error("'{module}.{name}' not found")]
    AttributeNotFound { module: String, name: String },

    #[error("'{module}.{name}' is not callable")]
    NotCallable { module: String, name: String },

    #[error("{function}() failed: {message}")]
    CallFailed { function: String, message: String },

    #[error("{function}() returned a malformed result: {reason}")]
    MalformedResult { function: String, reason: String },
}

impl BridgeError {
    /// True for failures that happen while resolving the module or its functions
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            BridgeError::ModuleNotFound { .. }
                | BridgeError::AttributeNotFound { .. }
                | BridgeError::NotCallable { .. }
        )
    }
}

/// Render a pending Python exception with its traceback.
pub(crate) fn describe(py: Python<'_>, err: &PyErr) -> String {
    let mut message = err.to_string();
    if let Some(traceback) = err.traceback_bound(py) {
        if let Ok(text) = traceback.format() {
            message.push('\n');
            message.push_str(text.trim_end());
        }
    }
    message
}
