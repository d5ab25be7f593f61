mod config;
mod core;
mod error;
mod memory;
mod models;
mod providers;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::core::{
    agent::{Agent, LanguageModel},
    analyzer::ContextAnalyzer,
    dispatcher::{print_mentions, preview_replies, Dispatcher, DEFAULT_MENTION_COUNT},
    replier::ReplyComposer,
    retry::RetryPolicy,
};
use crate::memory::MemoryStore;
use crate::providers::twitter::Twitter;

/// Replies to Twitter mentions with short, calm, reasoned answers.
#[derive(Debug, Parser)]
#[command(name = "reasonbot", version)]
struct Cli {
    /// File holding the IDs of mentions that already got a reply.
    #[arg(
        long,
        global = true,
        env = "REASONBOT_PROCESSED_FILE",
        default_value = "processed_ids.txt"
    )]
    processed_file: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reply to new mentions (the default).
    Dispatch {
        #[arg(long, default_value_t = DEFAULT_MENTION_COUNT)]
        count: usize,
        /// Minimum seconds between two passes.
        #[arg(long)]
        cooldown: Option<f64>,
    },
    /// Print the latest mentions as `<id>: <text>` without replying.
    Mentions {
        #[arg(long, default_value_t = DEFAULT_MENTION_COUNT)]
        count: usize,
    },
    /// Classify and draft replies for the latest mentions without posting.
    Preview {
        #[arg(long, default_value_t = DEFAULT_MENTION_COUNT)]
        count: usize,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let dotenv_result = dotenv();
    init_tracing();
    if let Err(e) = dotenv_result {
        debug!("No .env file loaded: {}", e);
    }

    let cli = Cli::parse();
    let config = Config::from_env();
    let twitter = Arc::new(Twitter::new(config.twitter.clone()));

    let model = Agent::from_config(&config.openai)
        .map(|agent| Arc::new(agent) as Arc<dyn LanguageModel>);
    let retry = RetryPolicy::default();

    match cli.command.unwrap_or(Command::Dispatch {
        count: DEFAULT_MENTION_COUNT,
        cooldown: None,
    }) {
        Command::Mentions { count } => {
            print_mentions(twitter.as_ref(), count).await?;
        }
        Command::Preview { count } => {
            let analyzer = ContextAnalyzer::new(model.clone(), retry);
            let composer = ReplyComposer::new(model, retry);
            preview_replies(twitter.as_ref(), &analyzer, &composer, count).await?;
        }
        Command::Dispatch { count, cooldown } => {
            let dispatcher = Dispatcher::new(
                twitter.clone(),
                twitter,
                Arc::new(ContextAnalyzer::new(model.clone(), retry)),
                Arc::new(ReplyComposer::new(model, retry)),
                MemoryStore::new(cli.processed_file),
            );

            let outcome = dispatcher.dispatch(count, cooldown).await;
            info!(?outcome, "Dispatch complete");
        }
    }

    Ok(())
}
