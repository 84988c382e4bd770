//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - merges a TOML run file with command-line overrides
//! - runs the fit pipeline
//! - prints reports
//! - writes optional exports

use clap::Parser;
use tracing::{debug, warn};

use crate::cli::{BatchArgs, Command, FitArgs, SimulateArgs};
use crate::data::{SimulationSpec, generate_sample};
use crate::domain::FitConfig;
use crate::error::AppError;
use crate::io::{JsonBundleRenderer, Renderer, write_dataset, write_residuals_csv};

pub mod pipeline;

/// Entry point for the `curvefit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Batch(args) => handle_batch(args),
        Command::Simulate(args) => handle_simulate(args),
        Command::Models => {
            print!("{}", crate::report::format_model_catalog(crate::models::all()));
            Ok(())
        }
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args)?;
    debug!(?config, "resolved run configuration");
    let run = pipeline::run_fit(&config)?;

    print!(
        "{}",
        crate::report::format_fit_report(&run.fit, &run.residuals, config.transform)
    );

    // Optional exports.
    if let Some(path) = &config.export_residuals {
        write_residuals_csv(path, &run.data, &run.residuals)?;
    }
    if let Some(path) = &config.output_artifact_path {
        match &run.curve {
            Ok(curve) => {
                let renderer = JsonBundleRenderer {
                    path: path.clone(),
                    transform: config.transform,
                };
                renderer.render(&run.fit, &run.data, curve, &run.residuals)?;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "plot bundle skipped"),
        }
    }

    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let mut config = FitConfig::new("", args.model);
    config.initial_guess = args.guess;
    config.transform = args.transform;
    config.x_scale = args.x_scale;
    config.y_scale = args.y_scale;
    config.max_evaluations = args.max_evaluations;
    config.absolute_sigma = args.absolute_sigma;

    let rows = pipeline::run_batch(&config, &args.inputs)?;
    print!("{}", crate::report::format_batch_table(&rows));

    let failed = rows.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        warn!(failed, total = rows.len(), "some batch inputs failed");
    }
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let spec = SimulationSpec {
        model: crate::models::lookup(&args.model)?,
        params: args.params,
        x_min: args.x_min,
        x_max: args.x_max,
        points: args.points,
        sigma_x: args.sigma_x,
        sigma_y: args.sigma_y,
        seed: args.seed,
    };
    let data = generate_sample(&spec)?;
    write_dataset(&args.output, &data)?;
    eprintln!("Wrote {} points to {}", data.len(), args.output.display());
    Ok(())
}

/// Build a run configuration: the `--config` file first (if any), then every
/// flag given on the command line on top of it.
pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    let mut config = match &args.config {
        Some(path) => FitConfig::from_toml_file(path)?,
        None => {
            let input = args
                .input
                .clone()
                .ok_or_else(|| AppError::new(2, "Missing --input (or --config)"))?;
            let model = args
                .model
                .clone()
                .ok_or_else(|| AppError::new(2, "Missing --model (or --config)"))?;
            FitConfig::new(input, model)
        }
    };

    if let Some(input) = &args.input {
        config.input_path = input.clone();
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(guess) = &args.guess {
        config.initial_guess = Some(guess.clone());
    }
    if let Some(transform) = args.transform {
        config.transform = transform;
    }
    if let Some(scale) = args.x_scale {
        config.x_scale = scale;
    }
    if let Some(scale) = args.y_scale {
        config.y_scale = scale;
    }
    if let Some(max) = args.max_evaluations {
        config.max_evaluations = max;
    }
    if let Some(points) = args.curve_points {
        config.curve_points = points;
    }
    if args.absolute_sigma {
        config.absolute_sigma = true;
    }
    if let Some(path) = &args.export_residuals {
        config.export_residuals = Some(path.clone());
    }
    if let Some(path) = &args.artifact {
        config.output_artifact_path = Some(path.clone());
    }

    config.validate()?;
    Ok(config)
}
