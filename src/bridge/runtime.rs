use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};

use pyo3::prelude::*;
use pyo3::types::{PyList, PyListMethods, PyModule};
use tracing::debug;

use super::error::{describe, BridgeError, LifecycleState};
use super::handle::ModuleHandle;

const IDLE: u8 = 0;
const EMBEDDED: u8 = 1;
const SHARED: u8 = 2;
const STOPPED: u8 = 3;

static STATE: AtomicU8 = AtomicU8::new(IDLE);

fn decode(state: u8) -> LifecycleState {
    match state {
        IDLE => LifecycleState::Idle,
        EMBEDDED => LifecycleState::Embedded,
        SHARED => LifecycleState::Shared,
        _ => LifecycleState::Stopped,
    }
}

/// Entry point to the process-wide Python interpreter.
///
/// The interpreter is started at most once per process. Work happens inside a
/// closure that receives a [`Runtime`]; every handle created from it borrows
/// the interpreter for the closure's lifetime, so nothing obtained through the
/// bridge can outlive the interpreter.
pub struct Interpreter;

impl Interpreter {
    /// Current lifecycle state of the interpreter.
    pub fn state() -> LifecycleState {
        decode(STATE.load(Ordering::SeqCst))
    }

    /// Start the interpreter, run `f`, then finalize the interpreter.
    ///
    /// Fails if the interpreter was already started in this process, whether by
    /// an earlier session or by the host.
    pub fn embedded<F, R>(f: F) -> Result<R, BridgeError>
    where
        F: for<'py> FnOnce(Runtime<'py>) -> R,
    {
        if let Err(current) =
            STATE.compare_exchange(IDLE, EMBEDDED, Ordering::SeqCst, Ordering::SeqCst)
        {
            return Err(BridgeError::RuntimeState {
                state: decode(current),
                operation: "start an embedded session",
            });
        }

        // SAFETY: plain query of the interpreter's global flag.
        if unsafe { pyo3::ffi::Py_IsInitialized() } != 0 {
            STATE.store(IDLE, Ordering::SeqCst);
            return Err(BridgeError::RuntimeInit(
                "interpreter was already initialized by the host process".to_string(),
            ));
        }

        debug!("starting embedded Python interpreter");
        // SAFETY: the interpreter is not initialized (checked above) and STATE
        // forbids any later initialization. Handles borrow `'py`, so none can
        // escape the closure and be touched after finalization.
        let result = unsafe { pyo3::with_embedded_python_interpreter(|py| f(Runtime { py })) };
        STATE.store(STOPPED, Ordering::SeqCst);
        debug!("Python interpreter finalized");

        Ok(result)
    }

    /// Run `f` against an interpreter that lives for the rest of the process.
    ///
    /// Repeated calls attach to the same interpreter; it is never finalized.
    pub fn shared<F, R>(f: F) -> Result<R, BridgeError>
    where
        F: for<'py> FnOnce(Runtime<'py>) -> R,
    {
        match STATE.compare_exchange(IDLE, SHARED, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) | Err(SHARED) => {}
            Err(current) => {
                return Err(BridgeError::RuntimeState {
                    state: decode(current),
                    operation: "attach to a shared interpreter",
                });
            }
        }

        pyo3::prepare_freethreaded_python();
        Ok(Python::with_gil(|py| f(Runtime { py })))
    }
}

/// Live interpreter context passed to every bridge call
#[derive(Clone, Copy)]
pub struct Runtime<'py> {
    py: Python<'py>,
}

impl<'py> Runtime<'py> {
    pub fn python(&self) -> Python<'py> {
        self.py
    }

    /// Append `dir` to `sys.path` unless it is already present.
    pub fn add_search_path(&self, dir: &Path) -> Result<(), BridgeError> {
        let failure = |reason: String| BridgeError::SearchPath {
            path: dir.to_path_buf(),
            reason,
        };

        let sys = PyModule::import_bound(self.py, "sys").map_err(|e| failure(describe(self.py, &e)))?;
        let path = sys
            .getattr("path")
            .map_err(|e| failure(describe(self.py, &e)))?;
        let path = path
            .downcast::<PyList>()
            .map_err(|_| failure("sys.path is not a list".to_string()))?;

        if path.contains(dir).unwrap_or(false) {
            return Ok(());
        }
        path.append(dir).map_err(|e| failure(describe(self.py, &e)))?;

        debug!(dir = %dir.display(), "added module search path");
        Ok(())
    }

    /// Import the named module.
    pub fn import(&self, name: &str) -> Result<ModuleHandle<'py>, BridgeError> {
        debug!(module = name, "importing module");
        let module = PyModule::import_bound(self.py, name).map_err(|e| BridgeError::ModuleNotFound {
            module: name.to_string(),
            reason: describe(self.py, &e),
        })?;
        Ok(ModuleHandle::new(name, module))
    }

    /// Current value of `sys.path`, mostly useful for diagnostics.
    pub fn search_path(&self) -> Result<Vec<PathBuf>, BridgeError> {
        let failure = |e: PyErr| BridgeError::SearchPath {
            path: Default::default(),
            reason: describe(self.py, &e),
        };
        let sys = PyModule::import_bound(self.py, "sys").map_err(failure)?;
        sys.getattr("path")
            .and_then(|path| path.extract::<Vec<PathBuf>>())
            .map_err(failure)
    }
}
