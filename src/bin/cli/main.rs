use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use cardbridge::{
    AddCardResponse, AnkiConnectClient, BridgeConfig, CardBridge, CardSubmission, DeckStore,
    DeliveryStatus, Unit,
};

#[derive(Parser)]
#[command(name = "cardbridge", about = "Flashcard ingestion bridge CLI", version)]
struct Cli {
    /// Data directory (default: platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit one card
    Add {
        #[arg(long)]
        course: String,
        #[arg(long)]
        module: String,
        #[arg(long)]
        front: String,
        #[arg(long)]
        back: String,
        /// May be given multiple times
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// easy, medium or hard
        #[arg(long, default_value = "medium")]
        difficulty: String,
        #[arg(long, default_value = "cli")]
        source: String,
    },

    /// Drain the pending queue
    Sweep {
        /// Skip the sweep when the review app does not answer a probe
        #[arg(long)]
        if_reachable: bool,
    },

    /// List stored cards, all units or one
    List {
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        module: Option<String>,
    },

    /// Show queue depth and per-status card counts
    Status,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => DeckStore::default_data_dir().context("could not determine data directory")?,
    };
    let config = BridgeConfig::load_or_default(&data_dir)
        .with_context(|| format!("could not load config from {}", data_dir.display()))?;

    let endpoint = AnkiConnectClient::new(
        config.endpoint_url.clone(),
        config.delivery_timeout(),
        config.connect_timeout(),
    )
    .context("could not build review app client")?;
    let bridge = CardBridge::new(data_dir, config);

    match cli.command {
        Command::Add {
            course,
            module,
            front,
            back,
            tags,
            difficulty,
            source,
        } => {
            let submission = CardSubmission {
                course,
                module,
                front,
                back,
                tags,
                difficulty,
                source,
            };
            let result = bridge.add_card(&endpoint, &submission);
            let response = AddCardResponse::from_result(&result);
            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.success {
                std::process::exit(1);
            }
        }

        Command::Sweep { if_reachable } => {
            use cardbridge::DeliveryEndpoint;
            if if_reachable && !endpoint.probe() {
                println!("review app not reachable, skipping sweep");
                return Ok(());
            }
            let report = bridge.sweep(&endpoint)?;
            println!(
                "swept: {} delivered, {} retried, {} failed, {} skipped, {} dropped",
                report.delivered, report.retried, report.failed, report.skipped, report.dropped
            );
        }

        Command::List { course, module } => {
            let units = match (course, module) {
                (Some(course), Some(module)) => vec![Unit::new(course, module)],
                (None, None) => bridge.list_units()?,
                _ => anyhow::bail!("--course and --module must be given together"),
            };
            for unit in units {
                println!("{}", unit);
                for card in bridge.list_cards(&unit)? {
                    println!("  [{}] {} — {}", card.delivery_status, card.id, card.front);
                }
            }
        }

        Command::Status => {
            let mut delivered = 0usize;
            let mut pending = 0usize;
            let mut failed = 0usize;
            for unit in bridge.list_units()? {
                for card in bridge.list_cards(&unit)? {
                    match card.delivery_status {
                        DeliveryStatus::Delivered => delivered += 1,
                        DeliveryStatus::Pending => pending += 1,
                        DeliveryStatus::Failed => failed += 1,
                    }
                }
            }
            println!("cards: {} delivered, {} pending, {} failed", delivered, pending, failed);
            println!("queue: {} entries awaiting redelivery", bridge.pending_count()?);
        }
    }

    Ok(())
}
