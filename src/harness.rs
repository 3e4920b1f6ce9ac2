use std::io::{self, Write};

use anyhow::Result;
use tracing::debug;

use crate::bridge::{Interpreter, Runtime};
use crate::config::{Mode, RunConfig};
use crate::prompt::{LinePrompt, Prompt, Unattended};
use crate::segmenter::MaskRcnn;
use crate::session::{Report, Session};

/// Start the interpreter, run one session against the configured library and
/// finalize the interpreter. Can only be called once per process.
pub fn run(config: &RunConfig) -> Result<Report> {
    Interpreter::embedded(|runtime| match config.session.mode {
        Mode::Interactive => run_with(runtime, config, LinePrompt::stdio(), io::stdout()),
        Mode::Unattended { .. } => run_with(runtime, config, Unattended, io::stdout()),
    })?
}

/// Run one session on an already started runtime.
pub fn run_with<P: Prompt, W: Write>(
    runtime: Runtime<'_>,
    config: &RunConfig,
    prompt: P,
    out: W,
) -> Result<Report> {
    runtime.add_search_path(&config.module_dir)?;
    debug!(module = %config.module, dir = %config.module_dir.display(), "resolving library");

    Session::start(
        || MaskRcnn::resolve(runtime, &config.module, config.layout),
        prompt,
        out,
        config.session.clone(),
    )
}
