use pyo3::prelude::*;
use pyo3::types::{PyModule, PyTuple, PyTupleMethods};
use tracing::debug;

use super::error::{describe, BridgeError};

/// An imported module. The reference is released when the handle is dropped.
pub struct ModuleHandle<'py> {
    name: String,
    module: Bound<'py, PyModule>,
}

impl<'py> ModuleHandle<'py> {
    pub(crate) fn new(name: &str, module: Bound<'py, PyModule>) -> Self {
        Self {
            name: name.to_string(),
            module,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up `name` on the module and check that it can be called.
    pub fn resolve(&self, name: &str) -> Result<CallableHandle<'py>, BridgeError> {
        let attr = self
            .module
            .getattr(name)
            .map_err(|_| BridgeError::AttributeNotFound {
                module: self.name.clone(),
                name: name.to_string(),
            })?;

        if !attr.is_callable() {
            return Err(BridgeError::NotCallable {
                module: self.name.clone(),
                name: name.to_string(),
            });
        }

        debug!(module = %self.name, function = name, "resolved callable");
        Ok(CallableHandle {
            name: format!("{}.{}", self.name, name),
            func: attr,
        })
    }
}

/// A function resolved from a [`ModuleHandle`] and known to be callable
pub struct CallableHandle<'py> {
    name: String,
    func: Bound<'py, PyAny>,
}

impl<'py> CallableHandle<'py> {
    /// Fully qualified name, `module.function`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn python(&self) -> Python<'py> {
        self.func.py()
    }

    /// Call the function with a positional argument tuple.
    ///
    /// The tuple is consumed and released after the call; the result is a new
    /// reference owned by the caller.
    pub fn invoke(&self, args: Bound<'py, PyTuple>) -> Result<ForeignValue<'py>, BridgeError> {
        debug!(function = %self.name, arity = args.len(), "calling");
        self.func
            .call1(args)
            .map(ForeignValue::from_bound)
            .map_err(|e| BridgeError::CallFailed {
                function: self.name.clone(),
                message: describe(self.python(), &e),
            })
    }
}

/// An owned reference to a Python object; released exactly once on drop.
pub struct ForeignValue<'py> {
    inner: Bound<'py, PyAny>,
}

impl<'py> ForeignValue<'py> {
    pub fn from_bound(inner: Bound<'py, PyAny>) -> Self {
        Self { inner }
    }

    pub fn as_bound(&self) -> &Bound<'py, PyAny> {
        &self.inner
    }

    /// A new strong reference for placing into an argument tuple.
    pub fn to_arg(&self) -> PyObject {
        self.inner.clone().unbind()
    }

    pub fn is_none(&self) -> bool {
        self.inner.is_none()
    }

    pub fn ref_count(&self) -> isize {
        self.inner.get_refcnt()
    }

    pub fn type_name(&self) -> String {
        type_name(&self.inner)
    }

    /// View this value as a tuple of exactly `len` items.
    pub fn as_tuple(&self, len: usize) -> Option<&Bound<'py, PyTuple>> {
        let tuple = self.inner.downcast::<PyTuple>().ok()?;
        (tuple.len() == len).then_some(tuple)
    }
}

/// A reference borrowed from a containing object; never released on its own
pub struct BorrowedValue<'a, 'py> {
    inner: Borrowed<'a, 'py, PyAny>,
}

impl<'a, 'py> BorrowedValue<'a, 'py> {
    /// Borrow item `index` of `tuple`.
    pub fn tuple_item(tuple: &'a Bound<'py, PyTuple>, index: usize) -> Option<Self> {
        tuple
            .get_borrowed_item(index)
            .ok()
            .map(|inner| Self { inner })
    }

    /// View this value as a tuple of exactly `len` items.
    pub fn as_tuple(&self, len: usize) -> Option<&Bound<'py, PyTuple>> {
        let tuple = self.inner.downcast::<PyTuple>().ok()?;
        (tuple.len() == len).then_some(tuple)
    }

    pub fn extract<T>(&self) -> PyResult<T>
    where
        T: FromPyObject<'py>,
    {
        self.inner.extract()
    }

    pub fn type_name(&self) -> String {
        type_name(&self.inner)
    }
}

fn type_name(value: &Bound<'_, PyAny>) -> String {
    value
        .get_type()
        .name()
        .map(|name| name.to_string())
        .unwrap_or_else(|_| "<unknown>".to_string())
}
