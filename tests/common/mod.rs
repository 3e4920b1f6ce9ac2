#![allow(unused_imports)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from maskrect for tests
pub use maskrect::bridge::{BridgeError, ForeignValue, Interpreter, ModuleHandle, Runtime};
pub use maskrect::{CornerLayout, CornerParams, MaskRcnn, Rectangle, Segmenter};
