//! Command-line parsing for the curve fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::data::NoiseMode;
use crate::domain::{DEFAULT_NUM_POINTS, ModelSpec};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "curvefit",
    version,
    about = "Least-squares curve fitting and model comparison"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a model (or every model), print diagnostics, and optionally plot/export.
    Fit(FitArgs),
    /// Print the R² ranking of every model only (useful for scripting).
    Compare(CompareArgs),
    /// Print densely sampled fitted curve points.
    Curve(CurveArgs),
    /// List the selectable model kinds.
    Kinds,
    /// Generate synthetic samples from a known model plus Gaussian noise.
    Generate(GenerateArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// Without input flags the TUI fits a seeded synthetic data set.
    Tui(TuiArgs),
}

/// Where the `(x, y)` samples come from.
#[derive(Debug, Args, Clone, Default)]
pub struct InputArgs {
    /// CSV file with `x` and `y` columns.
    #[arg(short, long, value_name = "CSV", conflicts_with_all = ["x", "y"])]
    pub file: Option<PathBuf>,

    /// Inline x values, comma separated (e.g. `--x 1,2,3`).
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, requires = "y")]
    pub x: Vec<f64>,

    /// Inline y values, comma separated.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, requires = "x")]
    pub y: Vec<f64>,
}

impl InputArgs {
    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.x.is_empty() && self.y.is_empty()
    }
}

/// Curve sampling options shared by `fit` and `curve`.
#[derive(Debug, Args, Clone)]
pub struct SamplingArgs {
    /// Number of sampled curve points (>= 2).
    #[arg(long, default_value_t = DEFAULT_NUM_POINTS)]
    pub points: usize,

    /// Lower bound of the sampled x range (defaults to the data minimum).
    #[arg(long, allow_negative_numbers = true, requires = "x_max")]
    pub x_min: Option<f64>,

    /// Upper bound of the sampled x range (defaults to the data maximum).
    #[arg(long, allow_negative_numbers = true, requires = "x_min")]
    pub x_max: Option<f64>,
}

impl SamplingArgs {
    pub fn x_range(&self) -> Option<(f64, f64)> {
        self.x_min.zip(self.x_max)
    }
}

/// Options for `curvefit fit`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Which model(s) to fit.
    #[arg(short, long, value_enum, default_value_t = ModelSpec::All)]
    pub model: ModelSpec,

    #[command(flatten)]
    pub sampling: SamplingArgs,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Print the per-point residual table of the chosen model.
    #[arg(long)]
    pub residuals: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export per-point residuals of the chosen model to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the ranked comparison to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export the sampled curve(s) to JSON.
    #[arg(long = "export-curve", value_name = "JSON")]
    pub export_curve: Option<PathBuf>,
}

/// Options for `curvefit compare`.
#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print the comparison as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Options for `curvefit curve`.
#[derive(Debug, Args, Clone)]
pub struct CurveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Which model(s) to sample.
    #[arg(short, long, value_enum, default_value_t = ModelSpec::All)]
    pub model: ModelSpec,

    #[command(flatten)]
    pub sampling: SamplingArgs,

    /// Print the curve(s) as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Options for `curvefit generate`.
#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Model kind to sample from (`all` is not accepted).
    #[arg(short, long, value_enum)]
    pub model: ModelSpec,

    /// Model coefficients, comma separated, in `a,b` (or `a0,a1,a2`) order.
    #[arg(long = "coef", value_delimiter = ',', allow_negative_numbers = true, required = true)]
    pub coefficients: Vec<f64>,

    /// Number of samples.
    #[arg(short = 'n', long, default_value_t = 30)]
    pub count: usize,

    /// Lower bound of the x range.
    #[arg(long, allow_negative_numbers = true, default_value_t = 1.0)]
    pub x_min: f64,

    /// Upper bound of the x range.
    #[arg(long, allow_negative_numbers = true, default_value_t = 10.0)]
    pub x_max: f64,

    /// Noise standard deviation (absolute, or a fraction in relative mode).
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// How noise is applied.
    #[arg(long, value_enum, default_value_t = NoiseMode::Absolute)]
    pub noise_mode: NoiseMode,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Write the CSV here instead of stdout.
    #[arg(short, long, value_name = "CSV")]
    pub output: Option<PathBuf>,
}

/// Options for plotting a saved curve.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Curve JSON file produced by `curvefit fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for the TUI.
#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Initially displayed model.
    #[arg(short, long, value_enum, default_value_t = ModelSpec::All)]
    pub model: ModelSpec,

    /// Seed for the synthetic demo data set.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn fit_parses_inline_values_and_aliases() {
        let cli = parse(&["curvefit", "fit", "--x", "1,2,-3", "--y", "2,4,6", "-m", "parabolic"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.input.x, vec![1.0, 2.0, -3.0]);
        assert_eq!(args.model, ModelSpec::Quadratic);
        assert_eq!(args.sampling.points, DEFAULT_NUM_POINTS);
        assert_eq!(args.sampling.x_range(), None);
    }

    #[test]
    fn file_conflicts_with_inline_values() {
        let res = Cli::try_parse_from(["curvefit", "fit", "--file", "a.csv", "--x", "1", "--y", "2"]);
        assert!(res.is_err());
    }

    #[test]
    fn x_range_requires_both_bounds() {
        assert!(Cli::try_parse_from(["curvefit", "curve", "--file", "a.csv", "--x-min", "0"]).is_err());
        let cli = parse(&["curvefit", "curve", "-f", "a.csv", "--x-min", "-1", "--x-max", "2"]);
        let Command::Curve(args) = cli.command else {
            panic!("expected curve");
        };
        assert_eq!(args.sampling.x_range(), Some((-1.0, 2.0)));
    }

    #[test]
    fn verbose_is_global() {
        let cli = parse(&["curvefit", "kinds", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }
}
