//! FitMatch - personality-aware team formation
//!
//! Entry point for the `fitmatch` binary. Parses the command line, layers
//! CLI flags over the loaded configuration, and dispatches to the formation
//! engine, the sample generator, or the personality classifier.

use std::io;
use std::path::Path;

use clap::Parser;
use tracing::{debug, error, info};

use fitmatch::cli::{Cli, Commands, ConfigSubcommand, FormArgs};
use fitmatch::config::{self, FitmatchConfig};
use fitmatch::dataset;
use fitmatch::error::{Error, Result};
use fitmatch::logging::{self, LogGuards};
use fitmatch::{classifier, report, TeamFormationEngine};

fn main() -> Result<()> {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    // Commands that need no configuration get minimal logging
    let args = match cli.command {
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand);
        }
        Commands::Classify { score, responses } => {
            logging::init_simple(tracing::Level::WARN)?;
            return exit_on_error(run_classify(score, responses.as_deref()));
        }
        Commands::Sample { output, force } => {
            logging::init_simple(if cli.quiet {
                tracing::Level::ERROR
            } else {
                tracing::Level::INFO
            })?;
            return exit_on_error(run_sample(&output, force));
        }
        Commands::Form(args) => args,
    };

    let config = match load_form_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprint!("{}", e.format_for_terminal());
            std::process::exit(e.exit_code());
        }
    };

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = init_logging_from_config(&config, cli.verbose, cli.quiet)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting FitMatch");

    exit_on_error(run_form(config, cli.quiet))
}

/// Print a failed command's error for the terminal and exit with its code
fn exit_on_error(result: Result<()>) -> Result<()> {
    if let Err(e) = result {
        error!(error = %e.format_for_log(), "Command failed");
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
    Ok(())
}

/// Initialize logging from configuration
fn init_logging_from_config(config: &FitmatchConfig, verbose: u8, quiet: bool) -> Result<LogGuards> {
    logging::init_logging(&config.logging, verbose, quiet)
}

/// Load configuration for `form`, then apply CLI flags on top
fn load_form_config(args: &FormArgs) -> Result<FitmatchConfig> {
    let mut config = FitmatchConfig::load(args.config.as_deref())?;
    apply_form_args(&mut config, args);
    config.validate()?;
    Ok(config)
}

fn apply_form_args(config: &mut FitmatchConfig, args: &FormArgs) {
    if let Some(ref input) = args.input {
        config.data.input = Some(config::expand_path(input));
    }
    if let Some(ref output) = args.output {
        config.data.output = Some(config::expand_path(output));
    }
    if let Some(format) = args.format {
        config.data.format = format;
    }
    if let Some(team_size) = args.team_size {
        config.formation.team_size = team_size;
    }
    if let Some(threads) = args.threads {
        config.formation.worker_threads = threads;
    }
    if let Some(scope) = args.lock_scope {
        config.formation.lock_scope = scope;
    }
    if args.sequential {
        config.formation.sequential = true;
    }
}

/// Load participants, form teams, report, and write the result
fn run_form(config: FitmatchConfig, quiet: bool) -> Result<()> {
    let input = config.data.input.clone().ok_or_else(|| {
        Error::config_field_invalid("data.input", "no participant file given (use --input or FITMATCH_INPUT)")
    })?;

    let participants = dataset::read_participants(&input)?;
    info!(path = %input, participants = participants.len(), "Participants loaded");

    let team_size = config.formation.team_size;
    let engine = TeamFormationEngine::new(config.formation.clone())?;
    debug!(
        worker_threads = engine.worker_threads(),
        sequential = engine.settings().sequential,
        "Engine configured"
    );

    let result = engine.form(&participants, team_size);
    engine.shutdown();
    let teams = result?;

    let statistics = TeamFormationEngine::statistics(&teams);
    info!(
        teams = statistics.total_teams,
        placed = statistics.total_participants,
        unassigned = participants.len() - statistics.total_participants,
        "Team formation finished"
    );

    if !quiet {
        let mut stdout = io::stdout().lock();
        report::write_formation_report(&mut stdout, &teams, &statistics, &participants)
            .map_err(|e| Error::Internal(format!("{:#}", e)))?;
    }

    if let Some(ref output) = config.data.output {
        dataset::write_teams(&teams, output, config.data.format)?;
        info!(path = %output, format = %config.data.format, "Teams written");
    }

    Ok(())
}

/// Write the sample participant CSV
fn run_sample(output: &str, force: bool) -> Result<()> {
    let path = config::expand_path(output);
    if Path::new(&path).exists() && !force {
        return Err(Error::Config(format!(
            "File already exists: {}. Use --force to overwrite.",
            path
        )));
    }

    let rows = dataset::write_sample(&path)?;
    println!("Wrote {} sample participants to {}", rows, path);
    Ok(())
}

/// Classify a score directly or from survey answers
fn run_classify(score: Option<i32>, responses: Option<&[i32]>) -> Result<()> {
    let score = match (score, responses) {
        (Some(score), _) => score,
        (None, Some(responses)) => {
            let score = classifier::score_from_responses(responses)?;
            println!("Survey score: {}", score);
            score as i32
        }
        (None, None) => {
            return Err(Error::InvalidInput(
                "provide a score or --responses".to_string(),
            ))
        }
    };

    let mut stdout = io::stdout().lock();
    report::write_classification(&mut stdout, score)
}

/// Handle config subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = FitmatchConfig::load(config.as_deref())?;
            println!("{}", cfg.to_toml()?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to {}", written.display());
        }
        ConfigSubcommand::Validate { config } => {
            let path = config.as_deref();
            match FitmatchConfig::load(path) {
                Ok(_) => {
                    println!("Configuration is valid.");
                }
                Err(e) => {
                    eprint!("{}", e.format_for_terminal());
                    std::process::exit(e.exit_code());
                }
            }
        }
    }

    Ok(())
}
