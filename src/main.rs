use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use maskrect::config::{DEFAULT_MODULE, DEFAULT_MODULE_DIR, DEFAULT_WEIGHTS};
use maskrect::{paths, CornerLayout, CornerParams, Mode, RunConfig, ScaleFactor, SessionConfig};

#[derive(Parser, Debug)]
#[command(name = "maskrect", version)]
#[command(about = "Find the bounding rectangle of a segmented object with a Mask R-CNN model")]
struct Cli {
    /// Path to input image file
    #[arg(short, long, value_name = "IMAGE")]
    input: Option<PathBuf>,

    /// Skip prompts: process --input once and save the annotated image
    #[arg(short = 'n', long, requires = "input")]
    no_interaction: bool,

    /// Write the annotated image here instead of output.<ext> next to the input
    #[arg(
        short,
        long,
        value_name = "PATH",
        num_args = 0..=1,
        requires = "no_interaction"
    )]
    save_file: Option<Option<PathBuf>>,

    /// Only print the rectangle
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding the Python segmentation library
    #[arg(long, value_name = "DIR", env = "MASKRECT_MODULE_DIR", default_value = DEFAULT_MODULE_DIR)]
    module_dir: PathBuf,

    /// Python module to import from the library directory
    #[arg(long, value_name = "NAME", env = "MASKRECT_MODULE", default_value = DEFAULT_MODULE)]
    module: String,

    /// Trained Mask R-CNN weights
    #[arg(long, value_name = "PATH", env = "MASKRECT_WEIGHTS", default_value = DEFAULT_WEIGHTS)]
    weights: PathBuf,

    /// Angle tolerance in degrees when merging contour points
    #[arg(long, default_value_t = 10)]
    tolerance: i32,

    /// Sample every n-th contour point
    #[arg(long, default_value_t = 21, value_parser = clap::value_parser!(i32).range(1..))]
    per_corner: i32,

    /// Shrink factor applied to the box, as X,Y
    #[arg(long, value_name = "X,Y", default_value = "0.95,0.95")]
    scale: ScaleFactor,

    /// Layout of the corner tuple returned by the library
    #[arg(long, value_enum, default_value_t = CornerLayout::Axes)]
    corner_layout: CornerLayout,
}

impl Cli {
    fn log_filter(&self) -> EnvFilter {
        let level = if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        };
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("maskrect={}", level)))
    }

    fn into_config(self) -> RunConfig {
        let mode = if self.no_interaction {
            Mode::Unattended {
                save_to: self.save_file.flatten(),
            }
        } else {
            Mode::Interactive
        };

        RunConfig {
            module_dir: self.module_dir,
            module: self.module,
            layout: self.corner_layout,
            session: SessionConfig {
                mode,
                input: self.input,
                weights: self.weights,
                params: CornerParams {
                    tolerance: self.tolerance,
                    per_corner: self.per_corner,
                    scale: self.scale,
                },
                quiet: self.quiet,
            },
        }
    }
}

fn run(config: RunConfig) -> anyhow::Result<()> {
    // Fail before starting the interpreter when there is nothing to do.
    if let (Mode::Unattended { .. }, Some(input)) = (&config.session.mode, &config.session.input) {
        paths::check_input(input)?;
    }

    let report = maskrect::run(&config)?;
    tracing::debug!(cycles = report.cycles, saved = report.saved.len(), "done");
    Ok(())
}

fn main() -> ExitCode {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(args.log_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(args.into_config()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("maskrect").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_match_library_defaults() {
        let config = parse(&[]).unwrap().into_config();
        assert_eq!(config.module, DEFAULT_MODULE);
        assert_eq!(config.module_dir, PathBuf::from(DEFAULT_MODULE_DIR));
        assert_eq!(config.session.mode, Mode::Interactive);
        assert_eq!(config.session.params, CornerParams::default());
        assert_eq!(config.layout, CornerLayout::Axes);
    }

    #[test]
    fn no_interaction_requires_input() {
        assert!(parse(&["-n"]).is_err());
        let config = parse(&["-n", "-i", "Images/image.jpg"]).unwrap().into_config();
        assert_eq!(config.session.mode, Mode::Unattended { save_to: None });
        assert_eq!(config.session.input, Some(PathBuf::from("Images/image.jpg")));
    }

    #[test]
    fn save_file_only_with_no_interaction() {
        assert!(parse(&["-s", "-i", "a.jpg"]).is_err());

        let bare = parse(&["-n", "-s", "-i", "a.jpg"]).unwrap().into_config();
        assert_eq!(bare.session.mode, Mode::Unattended { save_to: None });

        let explicit = parse(&["-n", "-i", "a.jpg", "--save-file", "out/b.jpg"])
            .unwrap()
            .into_config();
        assert_eq!(
            explicit.session.mode,
            Mode::Unattended {
                save_to: Some(PathBuf::from("out/b.jpg"))
            }
        );
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(parse(&["-q", "-v"]).is_err());
        assert!(parse(&["-q"]).unwrap().into_config().session.quiet);
    }

    #[test]
    fn inference_parameters_are_forwarded() {
        let config = parse(&[
            "--tolerance",
            "5",
            "--per-corner",
            "7",
            "--scale",
            "0.9,0.8",
            "--corner-layout",
            "points",
        ])
        .unwrap()
        .into_config();
        assert_eq!(config.session.params.tolerance, 5);
        assert_eq!(config.session.params.per_corner, 7);
        assert_eq!(config.session.params.scale, ScaleFactor { x: 0.9, y: 0.8 });
        assert_eq!(config.layout, CornerLayout::Points);
        assert!(parse(&["--per-corner", "0"]).is_err());
    }

    #[test]
    fn help_and_version_are_not_failures() {
        let help = parse(&["--help"]).unwrap_err();
        assert!(!help.use_stderr());
        let version = parse(&["-V"]).unwrap_err();
        assert!(!version.use_stderr());
    }
}
