//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs the logger
//! - loads samples (CSV, inline values, or the synthetic generator)
//! - runs curve fitting + model comparison
//! - prints reports/plots
//! - writes optional exports

use std::io;

use clap::Parser;
use log::{info, warn};

use crate::cli::{Command, CompareArgs, CurveArgs, FitArgs, GenerateArgs, InputArgs, PlotArgs};
use crate::data::GeneratorConfig;
use crate::domain::{FitConfig, SampleSet};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `curvefit` binary.
pub fn run() -> Result<(), AppError> {
    // `curvefit` and `curvefit --file data.csv` behave like `curvefit tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_logging(cli.verbose, matches!(cli.command, Command::Tui(_)));

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Compare(args) => handle_compare(args),
        Command::Curve(args) => handle_curve(args),
        Command::Kinds => handle_kinds(),
        Command::Generate(args) => handle_generate(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

/// Install `env_logger` on stderr.
///
/// Default level is `warn` (`-v` info, `-vv` debug). The TUI owns the terminal,
/// so it logs nothing unless `RUST_LOG` asks for it.
fn init_logging(verbose: u8, tui: bool) {
    let default_level = match (tui, verbose) {
        (true, _) => "off",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let samples = load_input(&args.input)?;
    let run = pipeline::run_fit(samples, &config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));
    if config.show_residuals && !run.residuals.is_empty() {
        println!("{}", crate::report::format_residuals(&run.residuals));
    }

    if config.plot {
        let chosen_curve = run
            .chosen
            .as_ref()
            .and_then(|fit| run.curves.curves().iter().find(|c| c.kind == fit.kind));
        if let Some(curve) = chosen_curve {
            let plot = crate::plot::render_ascii_plot(&run.samples, curve, config.plot_width, config.plot_height);
            println!("{plot}");
        }
    }

    if let Some(path) = &config.export_results {
        match &run.chosen {
            Some(fit) => crate::io::write_results_csv(path, &run.residuals, fit)?,
            None => warn!("no model was fitted; skipping residual export to {}", path.display()),
        }
    }
    if let Some(path) = &config.export_json {
        crate::io::write_results_json(path, &run.comparison, run.samples.len())?;
    }
    if let Some(path) = &config.export_curve {
        crate::io::write_curve_json(path, config.model_spec, &run.curves)?;
    }

    Ok(())
}

fn handle_compare(args: CompareArgs) -> Result<(), AppError> {
    let samples = load_input(&args.input)?;
    let comparison = pipeline::fit_all(samples.x(), samples.y())?;

    if args.json {
        let results = crate::io::ResultsFile::from_comparison(&comparison, samples.len());
        print_json(&results)?;
    } else {
        print!("{}", crate::report::format_comparison(&comparison));
    }
    Ok(())
}

fn handle_curve(args: CurveArgs) -> Result<(), AppError> {
    let samples = load_input(&args.input)?;
    let curves = pipeline::sample_curve(
        samples.x(),
        samples.y(),
        args.model,
        args.sampling.points,
        args.sampling.x_range(),
    )?;

    if args.json {
        print_json(&curves)?;
    } else {
        print!("{}", crate::report::format_curves(&curves));
    }
    Ok(())
}

fn handle_kinds() -> Result<(), AppError> {
    print!("{}", crate::report::format_model_kinds(&pipeline::list_model_kinds()));
    Ok(())
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let kind = args
        .model
        .kind()
        .ok_or_else(|| AppError::new(2, "`generate` needs a concrete model kind, not `all`."))?;

    let config = GeneratorConfig {
        kind,
        coefficients: args.coefficients,
        count: args.count,
        x_min: args.x_min,
        x_max: args.x_max,
        noise: args.noise,
        noise_mode: args.noise_mode,
        seed: args.seed,
    };
    let samples = crate::data::generate_samples(&config)?;

    match &args.output {
        Some(path) => {
            crate::data::write_samples_csv(path, &samples)?;
            info!("wrote {} samples to {}", samples.len(), path.display());
        }
        None => crate::data::write_samples(io::stdout().lock(), &samples)?,
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_curve_json(&args.curve)?;
    if file.curves.is_empty() {
        return Err(AppError::new(2, "Curve JSON contains no curves."));
    }

    for curve in &file.curves {
        println!("{} (r2={})", curve.kind.display_name(), crate::report::fmt_r2(curve.r2));
        println!(
            "{}",
            crate::plot::render_ascii_plot_curve_only(curve, args.width, args.height)
        );
    }
    Ok(())
}

/// Resolve the sample source. Pairing and finiteness are validated here.
pub fn load_input(input: &InputArgs) -> Result<SampleSet, AppError> {
    if let Some(path) = &input.file {
        let data = crate::io::load_samples_csv(path)?;
        if !data.row_errors.is_empty() {
            warn!(
                "{} of {} CSV rows were skipped",
                data.row_errors.len(),
                data.rows_read
            );
        }
        return Ok(data.samples);
    }

    if input.x.is_empty() && input.y.is_empty() {
        return Err(AppError::new(2, "No input: pass --file <CSV> or --x/--y values."));
    }
    Ok(SampleSet::with_min_points(input.x.clone(), input.y.clone(), 1)?)
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        model_spec: args.model,
        num_points: args.sampling.points,
        x_range: args.sampling.x_range(),
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        show_residuals: args.residuals,
        export_results: args.export.clone(),
        export_json: args.export_json.clone(),
        export_curve: args.export_curve.clone(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::new(4, format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Rewrite argv so `curvefit` defaults to `curvefit tui`.
///
/// Rules:
/// - `curvefit`                          -> `curvefit tui`
/// - `curvefit --file data.csv ...`      -> `curvefit tui --file data.csv ...`
/// - `curvefit --help/--version/-h`      -> unchanged (show top-level help/version)
/// - any argv naming a subcommand        -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    const SUBCOMMANDS: [&str; 7] = ["fit", "compare", "curve", "kinds", "generate", "plot", "tui"];
    let names_subcommand = argv[1..]
        .iter()
        .any(|a| SUBCOMMANDS.contains(&a.as_str()));
    if names_subcommand {
        return argv;
    }

    // A leading flag without a subcommand means "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }

    argv
}
