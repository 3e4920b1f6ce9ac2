use std::path::PathBuf;

use crate::models::{CornerLayout, CornerParams};

pub const DEFAULT_MODULE_DIR: &str = "Python/mask_rcnn";
pub const DEFAULT_MODULE: &str = "m_rcnn";
pub const DEFAULT_WEIGHTS: &str = "Data/mask_rcnn_object_0005.h5";

/// How the session gets its decisions
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    /// Prompt for paths and confirmations, loop until the user stops
    #[default]
    Interactive,
    /// Process `--input` once and always save
    Unattended {
        /// Explicit output path; derived from the input when `None`
        save_to: Option<PathBuf>,
    },
}

impl Mode {
    pub fn is_interactive(&self) -> bool {
        matches!(self, Mode::Interactive)
    }
}

/// Settings for one orchestration run
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub mode: Mode,
    /// Image to process first; required in unattended mode
    pub input: Option<PathBuf>,
    pub weights: PathBuf,
    pub params: CornerParams,
    pub quiet: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            input: None,
            weights: PathBuf::from(DEFAULT_WEIGHTS),
            params: CornerParams::default(),
            quiet: false,
        }
    }
}

/// Full configuration: where the Python library lives plus the session settings
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Directory appended to `sys.path` before importing `module`
    pub module_dir: PathBuf,
    pub module: String,
    pub layout: CornerLayout,
    pub session: SessionConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            module_dir: PathBuf::from(DEFAULT_MODULE_DIR),
            module: DEFAULT_MODULE.to_string(),
            layout: CornerLayout::default(),
            session: SessionConfig::default(),
        }
    }
}
