use clap::ArgAction;
use clap::CommandFactory;
use clap::Parser;
use qre_path::Settings;
use std::io::Read;
use std::path::PathBuf;

pub const BANNER: &str = "\
Compute a branch of the logit quantal response equilibrium correspondence
Traces from the centroid at lambda = 0 toward increasing precision";

/// Flags of the `logit` command. Help goes to stderr through `-h`.
#[derive(Debug, Parser)]
#[command(name = "logit", disable_help_flag = true, about = BANNER)]
pub struct Config {
    /// Decimal places in emitted numbers
    #[arg(short = 'd', value_name = "N", default_value_t = qre_core::DECIMALS)]
    pub decimals: usize,
    /// Initial step size
    #[arg(short = 's', value_name = "H", default_value_t = qre_core::STEP_START)]
    pub step: f64,
    /// Maximum deceleration ratio between steps, above 1
    #[arg(short = 'a', value_name = "A", default_value_t = qre_core::MAX_DECEL)]
    pub decel: f64,
    /// Upper bound on lambda
    #[arg(short = 'm', value_name = "M", default_value_t = qre_core::MAX_LAMBDA)]
    pub lambda: f64,
    /// Emit only the terminal point
    #[arg(short = 'e')]
    pub terminal: bool,
    /// Trace the strategic form of an extensive game
    #[arg(short = 'S')]
    pub strategic: bool,
    /// Find likelihood maxima for the frequencies in FILE
    #[arg(short = 'L', value_name = "FILE")]
    pub observed: Option<PathBuf>,
    /// Suppress the banner
    #[arg(short = 'q')]
    pub quiet: bool,
    /// Print this help and exit
    #[arg(short = 'h')]
    pub help: bool,
    /// More log output, repeatable
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
    /// Game file in .nfg or .efg format, standard input when absent
    pub game: Option<PathBuf>,
}

impl Config {
    pub fn settings(&self) -> Settings {
        Settings {
            step_start: self.step,
            step_min: qre_core::STEP_MIN.min(self.step),
            step_max: qre_core::STEP_MAX.max(self.step),
            max_decel: self.decel,
            max_lambda: self.lambda,
            full_graph: !self.terminal,
            ..Settings::default()
        }
    }

    /// The game text, from the named file or from standard input.
    pub fn input(&self) -> std::io::Result<String> {
        match &self.game {
            Some(path) => std::fs::read_to_string(path),
            None => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
        }
    }

    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }
}
