//! dmv-tutor - California driver's license exam tutor
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dmv_tutor::{Config, Repl};

/// California driver's license exam tutor
#[derive(Parser, Debug)]
#[command(name = "dmv-tutor")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to ~/.config/dmv-tutor/config.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Gemini model name
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Directory holding root_prompt.txt and rag_prompt.txt
    #[arg(long)]
    prompts_dir: Option<PathBuf>,

    /// Print the whole reply at once instead of streaming it
    #[arg(long)]
    no_stream: bool,

    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,
}

fn init_logging(verbose: u8, debug: bool) {
    let log_level = match (verbose, debug) {
        (_, true) | (2.., _) => "debug",
        (1, _) => "info",
        _ => "warn",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("dmv_tutor={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // .env has to be read before the debug flag is looked at
    let _ = dotenvy::dotenv();
    let env_debug = matches!(
        std::env::var("DMV_TUTOR_DEBUG").as_deref(),
        Ok("1") | Ok("true")
    );
    init_logging(args.verbose, args.debug || env_debug);

    let mut config = match Config::load_from(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Initialization failed: {}", e);
            std::process::exit(1);
        }
    };

    // Apply CLI overrides
    if let Some(model) = args.model {
        config.model.name = model;
    }
    if let Some(dir) = args.prompts_dir {
        config.agent.prompts_dir = dir;
    }
    if args.no_stream {
        config.streaming.enabled = false;
    }

    let mut repl = Repl::from_config(&config)?;

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let reply = repl.run_once(&prompt).await?;
        println!("{}", reply);
        return Ok(());
    }

    // Interactive mode
    repl.run().await?;
    Ok(())
}
