pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use reko_core::config::{AppConfig, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "reko",
    about = "Reko recommendation CLI",
    long_about = "Serve recommendations from the seeded reference stack and inspect effective configuration.",
    after_help = "Examples:\n  reko recommend ava --type hybrid --query \"trail shoes\"\n  reko recommend cora --type collaborative --explain\n  reko config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run one recommendation request against the seeded reference stack")]
    Recommend(commands::recommend::RecommendArgs),
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("config validation failed: {error}");
            return ExitCode::from(2);
        }
    };
    init_logging(&config);

    let result = match cli.command {
        Command::Recommend(args) => commands::recommend::run(args, &config).await,
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&config) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn init_logging(config: &AppConfig) {
    use reko_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}
