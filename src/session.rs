use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::bridge::BridgeError;
use crate::config::{Mode, SessionConfig};
use crate::models::Rectangle;
use crate::paths;
use crate::prompt::Prompt;
use crate::segmenter::Segmenter;

/// States of the orchestration loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    WeightsLoaded,
    AwaitingInput,
    Inferred,
    SaveDecision,
    RepeatDecision,
    Terminated,
}

/// What a finished session did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    /// Completed load → infer cycles
    pub cycles: usize,
    pub rectangles: Vec<Rectangle>,
    pub saved: Vec<PathBuf>,
}

/// Image currently being processed, with the foreign values tied to it
struct Cycle<S: Segmenter> {
    input: PathBuf,
    image: S::Image,
    corners: Option<S::Corners>,
}

/// Deferred construction of the segmenter, run in the `Init` phase
type Init<'a, S> = Box<dyn FnOnce() -> Result<S, BridgeError> + 'a>;

/// Drives a [`Segmenter`] through the load → infer → save → repeat loop
pub struct Session<'a, S: Segmenter, P: Prompt, W: Write> {
    init: Option<Init<'a, S>>,
    segmenter: Option<S>,
    prompt: P,
    out: W,
    config: SessionConfig,
    model: Option<S::Model>,
    pending_input: Option<PathBuf>,
    current: Option<Cycle<S>>,
    report: Report,
}

impl<'a, S: Segmenter, P: Prompt, W: Write> Session<'a, S, P, W> {
    /// Build the segmenter with `init` in the `Init` phase, then run the loop.
    ///
    /// Resolution failures from `init` end the session before any weights or
    /// images are loaded.
    pub fn start<F>(init: F, prompt: P, out: W, config: SessionConfig) -> Result<Report>
    where
        F: FnOnce() -> Result<S, BridgeError> + 'a,
    {
        let mut session = Self::with_parts(None, prompt, out, config);
        session.init = Some(Box::new(init));
        session.run()
    }

    /// Session over an already constructed segmenter.
    pub fn new(segmenter: S, prompt: P, out: W, config: SessionConfig) -> Self {
        Self::with_parts(Some(segmenter), prompt, out, config)
    }

    fn with_parts(segmenter: Option<S>, prompt: P, out: W, config: SessionConfig) -> Self {
        let pending_input = config.input.clone();
        Self {
            init: None,
            segmenter,
            prompt,
            out,
            config,
            model: None,
            pending_input,
            current: None,
            report: Report::default(),
        }
    }

    /// Run from `Init` until the loop terminates.
    pub fn run(mut self) -> Result<Report> {
        let mut phase = Phase::Init;
        while phase != Phase::Terminated {
            debug!(?phase, "entering");
            phase = self.step(phase)?;
        }
        debug!(phase = ?Phase::Terminated, "entering");

        // Release image and model references before handing back the report.
        self.current = None;
        self.model = None;
        Ok(self.report)
    }

    fn step(&mut self, phase: Phase) -> Result<Phase> {
        match phase {
            Phase::Init => self.initialize(),
            Phase::WeightsLoaded => self.load_weights(),
            Phase::AwaitingInput => self.await_input(),
            Phase::Inferred => self.infer(),
            Phase::SaveDecision => self.save_decision(),
            Phase::RepeatDecision => self.repeat_decision(),
            Phase::Terminated => Ok(Phase::Terminated),
        }
    }

    fn initialize(&mut self) -> Result<Phase> {
        if let Some(init) = self.init.take() {
            let segmenter = init().context("failed to initialize the segmentation library")?;
            self.segmenter = Some(segmenter);
        }
        if self.segmenter.is_none() {
            anyhow::bail!("session has no segmentation library");
        }
        Ok(Phase::WeightsLoaded)
    }

    fn segmenter(&self) -> Result<&S> {
        self.segmenter
            .as_ref()
            .context("segmentation library is not initialized")
    }

    fn load_weights(&mut self) -> Result<Phase> {
        let weights = &self.config.weights;
        info!(path = %weights.display(), "loading model weights");
        let model = self
            .segmenter()?
            .load_weights(weights)
            .with_context(|| format!("failed to load weights from {}", weights.display()))?;
        self.model = Some(model);
        Ok(Phase::AwaitingInput)
    }

    fn await_input(&mut self) -> Result<Phase> {
        let interactive = self.config.mode.is_interactive();

        let path = match self.pending_input.take() {
            Some(path) => path,
            None if interactive => match self.prompt.image_path()? {
                Some(path) => path,
                None => return Ok(Phase::Terminated),
            },
            None => anyhow::bail!("an input image is required in non-interactive mode"),
        };

        match paths::check_input(&path) {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(path = %path.display(), "extension is not a recognized image format");
                if !self.config.quiet {
                    self.prompt.notify(&format!(
                        "{} does not look like an image, trying anyway",
                        path.display()
                    ))?;
                }
            }
            Err(err) if interactive => {
                warn!(path = %path.display(), "input rejected");
                self.prompt.notify(&format!("{}, try again", err))?;
                return Ok(Phase::AwaitingInput);
            }
            Err(err) => return Err(err),
        }

        let image = self
            .segmenter()?
            .load_image(&path)
            .with_context(|| format!("failed to load image {}", path.display()))?;
        self.current = Some(Cycle {
            input: path,
            image,
            corners: None,
        });
        Ok(Phase::Inferred)
    }

    fn infer(&mut self) -> Result<Phase> {
        let segmenter = self
            .segmenter
            .as_ref()
            .context("segmentation library is not initialized")?;
        let model = self
            .model
            .as_ref()
            .context("weights must be loaded before inference")?;
        let cycle = self
            .current
            .as_mut()
            .context("an image must be loaded before inference")?;

        let corners = segmenter
            .find_corners(&cycle.image, model, &self.config.params)
            .with_context(|| format!("inference failed for {}", cycle.input.display()))?;
        let rect = segmenter.rectangle(&corners)?;
        cycle.corners = Some(corners);

        info!(
            path = %cycle.input.display(),
            %rect,
            width = rect.width(),
            height = rect.height(),
            "rectangle found"
        );
        writeln!(self.out, "{}", rect)?;

        self.report.cycles += 1;
        self.report.rectangles.push(rect);
        Ok(Phase::SaveDecision)
    }

    fn save_decision(&mut self) -> Result<Phase> {
        let target = match &self.config.mode {
            Mode::Unattended { save_to } => Some(save_to.clone()),
            Mode::Interactive => {
                if self.prompt.confirm("Save the annotated image?")? {
                    Some(None)
                } else {
                    None
                }
            }
        };

        if let Some(explicit) = target {
            let cycle = self
                .current
                .as_ref()
                .context("no image to save")?;
            let output = explicit.unwrap_or_else(|| paths::output_path(&cycle.input));
            self.save(cycle, &output)?;
            if !self.config.quiet {
                self.prompt.notify(&format!("Saved {}", output.display()))?;
            }
            self.report.saved.push(output);
        }

        Ok(Phase::RepeatDecision)
    }

    fn save(&self, cycle: &Cycle<S>, output: &Path) -> Result<()> {
        let corners = cycle
            .corners
            .as_ref()
            .context("corners must be computed before saving")?;
        self.segmenter()?
            .save_image(&cycle.image, corners, output)
            .with_context(|| format!("failed to save {}", output.display()))?;
        info!(path = %output.display(), "annotated image saved");
        Ok(())
    }

    fn repeat_decision(&mut self) -> Result<Phase> {
        self.current = None;

        if !self.config.mode.is_interactive() {
            return Ok(Phase::Terminated);
        }
        if self.prompt.confirm("Process another image?")? {
            Ok(Phase::AwaitingInput)
        } else {
            Ok(Phase::Terminated)
        }
    }
}
