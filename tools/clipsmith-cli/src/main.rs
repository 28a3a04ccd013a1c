//! Clipsmith CLI: batch-edit short-form videos from generated editing rules.
//!
//! Usage:
//!   clipsmith run --input_dir <DIR> --output_dir <DIR> --prompt <TEXT>
//!   clipsmith parse <RULES_FILE>   Show the edits a saved rules file produces
//!   clipsmith check                Check ffmpeg and API key availability

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clipsmith_common::config::{resolve_config_path, AppConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "clipsmith",
    about = "Batch short-form video editing driven by generated rules",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/clipsmith/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every video in a directory
    Run {
        /// Directory containing the source videos
        #[arg(long = "input_dir", visible_alias = "input-dir")]
        input_dir: PathBuf,

        /// Directory receiving every artifact and the batch report
        #[arg(long = "output_dir", visible_alias = "output-dir")]
        output_dir: PathBuf,

        /// Prompt sent to the rule generator
        #[arg(long)]
        prompt: String,

        /// Files per chunk; files in a chunk run concurrently
        #[arg(long = "batch_size", visible_alias = "batch-size")]
        batch_size: Option<usize>,

        /// Upper bound on any single stage, in seconds
        #[arg(long = "stage_timeout_secs", visible_alias = "stage-timeout-secs")]
        stage_timeout_secs: Option<u64>,

        /// Upper bound on in-flight rule generation requests
        #[arg(
            long = "max_concurrent_rule_requests",
            visible_alias = "max-concurrent-rule-requests"
        )]
        max_concurrent_rule_requests: Option<usize>,
    },

    /// Interpret a saved rules file and print the resulting edits
    Parse {
        /// Path to a rules_<name>.txt file
        rules_file: PathBuf,

        /// Print the operations as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check system capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.as_deref());
    let app_config = AppConfig::load_from(&config_path);

    let mut logging = app_config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    clipsmith_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Run {
            input_dir,
            output_dir,
            prompt,
            batch_size,
            stage_timeout_secs,
            max_concurrent_rule_requests,
        } => {
            commands::run::run(
                &app_config,
                commands::run::RunArgs {
                    input_dir,
                    output_dir,
                    prompt,
                    batch_size,
                    stage_timeout_secs,
                    max_concurrent_rule_requests,
                },
            )
            .await
        }
        Commands::Parse { rules_file, json } => commands::parse::run(rules_file, json),
        Commands::Check => commands::check::run(&app_config, &config_path),
    }
}
