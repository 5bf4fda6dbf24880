//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads or generates points
//! - runs the fit / demo / sweep / TUI front-ends
//! - prints reports and plots

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, CommonArgs, DemoArgs, FitArgs, OutputFormat, SweepArgs};
use crate::domain::{DemoConfig, FitConfig, PointSource};
use crate::error::AppError;
use crate::fit::Decision;

pub mod demo;
pub mod pipeline;
pub mod sweep;

/// Entry point for the `rfit` binary.
pub fn run() -> Result<(), AppError> {
    // `rfit` and `rfit --model parabola` behave like `rfit tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    // The TUI owns the terminal; log lines on stderr would tear its screen.
    if !matches!(cli.command, Command::Tui(_)) {
        init_tracing(cli.verbose);
    }

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Demo(args) => handle_demo(args),
        Command::Sweep(args) => handle_sweep(args),
        Command::Tui(args) => handle_tui(args),
    }
}

/// Install the stderr subscriber. `-v` flags win over `RUST_LOG`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ransac_fit=warn")),
        1 => EnvFilter::new("ransac_fit=info"),
        2 => EnvFilter::new("ransac_fit=debug"),
        _ => EnvFilter::new("ransac_fit=trace"),
    };

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = DemoConfig {
        plot: !args.no_plot && args.format == OutputFormat::Text,
        plot_width: args.width,
        plot_height: args.height,
        ..demo_config_from_args(&args.common)
    };
    let run = pipeline::run_fit(&config)?;

    match args.format {
        OutputFormat::Json => println!("{}", crate::report::to_json(&run.summary)?),
        OutputFormat::Text => {
            println!("{}", crate::report::format_fit_summary(&run.summary));
            if run.data.skipped_rows > 0 {
                println!("({} CSV rows skipped; run with -v for details)\n", run.data.skipped_rows);
            }
        }
    }

    if config.plot {
        let plot = crate::plot::render_fit(
            &run.result,
            &run.data.points,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = DemoConfig {
        max_rounds: args.max_rounds,
        output_dir: args.output_dir.clone(),
        chart_size: args.chart_size,
        ..demo_config_from_args(&args.common)
    };
    let data = pipeline::load_points(&config.source, config.model)?;

    let out = demo::run_demo(&config, &data, |round, outcome, decision, min_inliers| {
        println!("{}", crate::report::format_round_line(round, outcome, min_inliers));
        if decision == Decision::Accepted {
            println!("Accepted after {round} rounds.");
        }
    })?;

    if out.accepted_round.is_none() {
        println!("No acceptable model within {} rounds.", out.rounds);
    }
    println!(
        "Wrote {} chart(s) to {}",
        out.charts.len(),
        config.output_dir.display()
    );
    Ok(())
}

fn handle_sweep(args: SweepArgs) -> Result<(), AppError> {
    let config = demo_config_from_args(&args.common);
    let summary = sweep::run_sweep(&config, args.runs, args.threads)?;

    match args.format {
        OutputFormat::Json => println!("{}", crate::report::to_json(&summary)?),
        OutputFormat::Text => print!("{}", crate::report::format_sweep_summary(&summary)),
    }
    Ok(())
}

fn handle_tui(args: CommonArgs) -> Result<(), AppError> {
    crate::tui::run(demo_config_from_args(&args))
}

/// Map the shared flags onto a [`DemoConfig`] (front-end extras get defaults).
pub fn demo_config_from_args(args: &CommonArgs) -> DemoConfig {
    let source = match &args.input {
        Some(path) => PointSource::Csv(path.clone()),
        None => PointSource::Synthetic {
            count: args.count,
            outlier_ratio: args.outlier_ratio,
            seed: args.seed,
        },
    };

    let mut fit = FitConfig::default()
        .with_max_distance(
            args.max_distance
                .unwrap_or_else(|| args.model.default_max_distance()),
        )
        .with_ratio(args.ratio)
        .with_max_iterations(args.max_iterations);
    if args.unbounded {
        fit = fit.unbounded();
    }

    DemoConfig {
        model: args.model,
        source,
        fit,
        fit_seed: args.fit_seed.unwrap_or(args.seed),
        plot: true,
        plot_width: 100,
        plot_height: 25,
        max_rounds: 10,
        output_dir: PathBuf::from("output"),
        chart_size: 900,
    }
}

/// Rewrite argv so `rfit` defaults to `rfit tui`.
///
/// Rules:
/// - `rfit`                      -> `rfit tui`
/// - `rfit --model parabola ...` -> `rfit tui --model parabola ...`
/// - `rfit --help/--version/-h`  -> unchanged (show top-level help/version)
///
/// Leading `-v` flags are global and are skipped when looking for the
/// subcommand.
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(idx) = argv.iter().skip(1).position(|a| !is_verbosity(a)).map(|i| i + 1) else {
        argv.push("tui".to_string());
        return argv;
    };
    let arg = argv[idx].as_str();

    let is_top_level_help_or_version =
        matches!(arg, "-h" | "--help" | "-V" | "--version" | "help");
    let is_subcommand = matches!(arg, "fit" | "demo" | "sweep" | "tui");
    if is_top_level_help_or_version || is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg.starts_with('-') {
        argv.insert(idx, "tui".to_string());
    }
    argv
}

fn is_verbosity(arg: &str) -> bool {
    arg == "--verbose" || (arg.len() > 1 && arg.starts_with('-') && arg[1..].chars().all(|c| c == 'v'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_the_tui() {
        assert_eq!(rewrite_args(argv(&["rfit"])), argv(&["rfit", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["rfit", "--model", "parabola"])),
            argv(&["rfit", "tui", "--model", "parabola"])
        );
        assert_eq!(rewrite_args(argv(&["rfit", "fit", "-n", "5"])), argv(&["rfit", "fit", "-n", "5"]));
        assert_eq!(rewrite_args(argv(&["rfit", "--help"])), argv(&["rfit", "--help"]));
    }

    #[test]
    fn leading_verbosity_is_kept_in_front() {
        assert_eq!(rewrite_args(argv(&["rfit", "-vv"])), argv(&["rfit", "-vv", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["rfit", "-v", "demo"])),
            argv(&["rfit", "-v", "demo"])
        );
    }

    #[test]
    fn flags_map_onto_the_demo_config() {
        let cli = Cli::try_parse_from(argv(&[
            "rfit", "fit", "--model", "parabola", "--seed", "5", "--count", "50",
            "--outlier-ratio", "0.1", "--ratio", "0.7", "--max-iterations", "20",
        ]))
        .unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        let cfg = demo_config_from_args(&args.common);

        assert_eq!(cfg.model, ModelKind::Parabola);
        assert_eq!(cfg.fit, FitConfig::new(2.0, Some(20), 0.7));
        assert_eq!(cfg.fit_seed, 5);
        assert_eq!(
            cfg.source,
            PointSource::Synthetic {
                count: 50,
                outlier_ratio: 0.1,
                seed: 5
            }
        );
    }

    #[test]
    fn unbounded_and_csv_flags() {
        let cli = Cli::try_parse_from(argv(&[
            "rfit", "sweep", "--unbounded", "--input", "pts.csv", "-d", "0.25", "--fit-seed", "9",
        ]))
        .unwrap();
        let Command::Sweep(args) = cli.command else {
            panic!("expected sweep");
        };
        let cfg = demo_config_from_args(&args.common);

        assert_eq!(cfg.fit.max_iterations, None);
        assert_eq!(cfg.fit.max_distance, 0.25);
        assert_eq!(cfg.fit_seed, 9);
        assert_eq!(cfg.source, PointSource::Csv(PathBuf::from("pts.csv")));
    }
}
