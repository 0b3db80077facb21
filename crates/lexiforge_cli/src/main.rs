//! LEXIFORGE CLI
//!
//! Validate, analyze, and generate constructed languages.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod commands;
mod config;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use config::{ForgeConfig, load_definition};
use lexiforge_runtime::PipelineRequest;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lexiforge")]
#[command(about = "LEXIFORGE - validated constructed-language generation", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a language definition
    Validate {
        /// Path to definition file
        file: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyze word forms against a definition's phonology
    Analyze {
        /// Path to definition file
        #[arg(short, long)]
        definition: PathBuf,
        /// Forms to analyze, e.g. /pas.ta/
        #[arg(required = true)]
        forms: Vec<String>,
    },
    /// Generate a language from recorded model responses
    Generate {
        /// Language name
        #[arg(short, long)]
        name: String,
        /// Design brief
        #[arg(short = 'b', long, default_value = "")]
        description: String,
        /// JSON array of model responses, served in order
        #[arg(short, long)]
        responses: PathBuf,
        /// Where to write the resulting definition
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Explain a feature of a language from recorded model responses
    Explain {
        /// Path to definition file
        #[arg(short, long)]
        definition: PathBuf,
        /// Feature to explain
        #[arg(short, long)]
        topic: String,
        /// JSON array of model responses, served in order
        #[arg(short, long)]
        responses: PathBuf,
    },
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lexiforge=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = ForgeConfig::load(cli.config.as_deref())?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Validate { file, json } => {
            let def = load_definition(&file)?;
            if !commands::validate(&def, &config, json, &mut out)? {
                out.flush()?;
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Analyze { definition, forms } => {
            let def = load_definition(&definition)?;
            commands::analyze(&def, &forms, &mut out)
        }
        Commands::Generate {
            name,
            description,
            responses,
            output,
        } => {
            let request = PipelineRequest::new(name, description);
            commands::generate(request, &responses, output.as_deref(), &config, &mut out).await
        }
        Commands::Explain {
            definition,
            topic,
            responses,
        } => {
            let def = load_definition(&definition)?;
            commands::explain(&def, &topic, &responses, &config, &mut out).await
        }
    }
}
