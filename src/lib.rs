pub mod bridge;
pub mod config;
pub mod geometry;
pub mod harness;
pub mod models;
pub mod paths;
pub mod prompt;
pub mod segmenter;
pub mod session;

pub use bridge::{BridgeError, ForeignValue, Interpreter, Runtime};
pub use config::{Mode, RunConfig, SessionConfig};
pub use harness::{run, run_with};
pub use models::{Coordinate, CornerLayout, CornerParams, Rectangle, ScaleFactor};
pub use segmenter::{MaskRcnn, Segmenter};
pub use session::{Phase, Report, Session};
