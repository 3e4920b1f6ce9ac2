//! Embedding bridge to the Python runtime.
//!
//! [`Interpreter`] owns the interpreter lifecycle and hands out a [`Runtime`]
//! context. Modules, callables and values obtained through it are lifetime
//! bound to that context:
//!
//! - [`ModuleHandle`] and [`CallableHandle`] own their references.
//! - [`ForeignValue`] owns one strong reference and releases it on drop.
//! - [`BorrowedValue`] is a view into a containing object and is never
//!   released independently.

mod error;
mod handle;
mod runtime;

pub use error::{BridgeError, LifecycleState};
pub use handle::{BorrowedValue, CallableHandle, ForeignValue, ModuleHandle};
pub use runtime::{Interpreter, Runtime};
