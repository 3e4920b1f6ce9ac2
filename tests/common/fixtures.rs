#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{ImageBuffer, Rgb};
use pyo3::prelude::*;
use pyo3::types::PyModule;
use tempfile::TempDir;

use maskrect::bridge::{Interpreter, Runtime};

/// Stand-in for the Mask R-CNN helper module. Records every call in `calls`
/// without keeping references to the objects it was given.
pub const FAKE_LIBRARY: &str = r#"
import os

calls = []
CORNERS = ((10, 200), (20, 300))
FAIL_CORNERS = False
NOT_CALLABLE = 42


class Model:
    pass


def LoadImage(image_path):
    calls.append(("LoadImage", os.path.basename(image_path)))
    if not os.path.exists(image_path):
        raise FileNotFoundError(image_path)
    return {"path": image_path}


def LoadReadyWeights(weight_path):
    calls.append(("LoadReadyWeights", weight_path))
    return Model()


def GetCornersFromGeneratedMask(image, test_model, tolerance=10, per_corner=21, scale_factor=(0.95, 0.95)):
    calls.append(("GetCornersFromGeneratedMask", tolerance, per_corner,
                  tuple(round(s, 2) for s in scale_factor)))
    if FAIL_CORNERS:
        raise RuntimeError("no object detected")
    return CORNERS


def SaveImage(image, coords, path):
    calls.append(("SaveImage", os.path.basename(path)))
    with open(path, "wb") as f:
        f.write(b"annotated")
"#;

/// Same module without `SaveImage`
pub const INCOMPLETE_LIBRARY: &str = r#"
def LoadImage(image_path):
    return image_path

def LoadReadyWeights(weight_path):
    return weight_path

def GetCornersFromGeneratedMask(image, test_model, tolerance, per_corner, scale_factor):
    return ((0, 1), (0, 1))
"#;

static NEXT_MODULE: AtomicUsize = AtomicUsize::new(0);

/// A fake library written to its own temp directory under a unique module
/// name, so tests sharing one interpreter never see each other's state.
pub struct FakeLibrary {
    pub dir: TempDir,
    pub module: String,
}

impl FakeLibrary {
    pub fn new() -> Self {
        Self::with_source(FAKE_LIBRARY)
    }

    pub fn with_source(source: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let module = format!(
            "fake_m_rcnn_{}",
            NEXT_MODULE.fetch_add(1, Ordering::SeqCst)
        );
        std::fs::write(dir.path().join(format!("{}.py", module)), source)
            .expect("Failed to write fake module");
        Self { dir, module }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Make the module importable in `runtime`.
    pub fn install(&self, runtime: Runtime<'_>) {
        runtime
            .add_search_path(self.path())
            .expect("Failed to extend sys.path");
    }

    /// Set a module-level global, `value` being a Python expression.
    pub fn set(&self, py: Python<'_>, name: &str, value: &str) {
        let module = PyModule::import_bound(py, self.module.as_str()).expect("module not imported");
        let value = py.eval_bound(value, None, None).expect("bad expression");
        module.setattr(name, value).expect("setattr failed");
    }

    /// `str()` of every entry the fake recorded in `calls`.
    pub fn calls(&self, py: Python<'_>) -> Vec<String> {
        let module = PyModule::import_bound(py, self.module.as_str()).expect("module not imported");
        let calls = module.getattr("calls").expect("calls missing");
        calls
            .iter()
            .expect("calls is not iterable")
            .map(|item| item.expect("iteration failed").to_string())
            .collect()
    }
}

/// Run `f` on the interpreter shared by every test in this binary.
pub fn with_runtime<F, R>(f: F) -> R
where
    F: for<'py> FnOnce(Runtime<'py>) -> R,
{
    Interpreter::shared(f).expect("Failed to attach to the interpreter")
}

/// Run a full garbage collection so reference counts settle.
pub fn collect(py: Python<'_>) {
    PyModule::import_bound(py, "gc")
        .and_then(|gc| gc.call_method0("collect"))
        .expect("gc.collect failed");
}

/// Creates a 100x100 red test image in `dir` and returns its path.
pub fn create_test_image(dir: &Path, name: &str) -> PathBuf {
    let img = ImageBuffer::from_fn(100, 100, |_, _| Rgb([255u8, 0u8, 0u8]));
    let path = dir.join(name);
    img.save_with_format(&path, image::ImageFormat::Png)
        .expect("Failed to save test image");
    path
}
