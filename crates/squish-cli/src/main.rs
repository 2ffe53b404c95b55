//! Squish CLI
//!
//! Optimizes a directory of build output in place.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod workspace;

/// Squish - shrink build assets without ever growing them
#[derive(Parser)]
#[command(name = "squish")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./squish.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter squish.yaml
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Validate configuration without touching any asset
    Validate,

    /// Optimize every matching file under a directory
    Optimize {
        /// Build output directory
        dir: String,

        /// Asset pattern (glob); repeat to add more. Replaces `test` from the config
        #[arg(short, long = "test")]
        tests: Vec<String>,

        /// Maximum number of transforms in flight
        #[arg(short = 'j', long)]
        max_concurrency: Option<usize>,

        /// Run transforms but don't write results
        #[arg(long)]
        dry_run: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Init { path } => {
            commands::init::run(&path).await?;
        }
        Commands::Validate => {
            commands::validate::run(cli.config.as_deref()).await?;
        }
        Commands::Optimize {
            dir,
            tests,
            max_concurrency,
            dry_run,
            json,
        } => {
            let options = commands::optimize::OptimizeOptions {
                tests,
                max_concurrency,
                dry_run,
                json,
            };
            commands::optimize::run(cli.config.as_deref(), &dir, options).await?;
        }
    }

    Ok(())
}
