//! Wavrec CLI - Audio Recorder
//!
//! Command-line interface for the Wavrec recorder core.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, error};

use wavrec::cli::{commands, Cli, Commands};
use wavrec::RecorderConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    debug!("Wavrec v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => RecorderConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => RecorderConfig::default(),
    };

    match cli.command {
        Some(cmd) => handle_command(cmd, config),
        None => {
            println!("Wavrec v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands, mut config: RecorderConfig) -> anyhow::Result<()> {
    let result = match cmd {
        Commands::Record {
            source,
            label,
            out_dir,
            json,
        } => {
            if let Some(dir) = out_dir {
                config.output_dir = dir;
            }
            commands::record(&config, &source, &label)
                .and_then(|report| commands::print_report(&report, json))
        }
        Commands::Encode {
            input,
            output,
            sample_rate,
        } => commands::encode_file(&input, &output, sample_rate),
        Commands::Inspect { path, json } => commands::inspect(&path, json),
        Commands::Tone {
            output,
            frequency,
            duration,
            channels,
            sample_rate,
        } => commands::tone(&output, frequency, duration, channels, sample_rate),
        Commands::List { dir } => commands::list(&dir),
        Commands::PrintConfig => commands::print_config(&config),
    };

    if let Err(e) = &result {
        error!("[{}] {}", e.error_code(), e);
        for suggestion in e.recovery_suggestions() {
            eprintln!("  - {}", suggestion);
        }
    }

    Ok(result?)
}
