pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "shopsignal",
    about = "Shopsignal operator CLI",
    long_about = "Operate the Shopsignal engagement store: migrations, demo data, score inspection, and bundle analysis.",
    after_help = "Examples:\n  shopsignal doctor --json\n  shopsignal seed\n  shopsignal bundles --min-frequency 3\n  shopsignal track 42 add_to_cart"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo catalog and sales history (idempotent)")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
    #[command(about = "Validate config, DB connectivity, and schema state")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "List engagement scores, highest first, or show one product")]
    Scores {
        #[arg(long, help = "Show a single product by id")]
        product: Option<String>,
        #[arg(long, help = "Only list the top N products")]
        limit: Option<usize>,
    },
    #[command(about = "Recompute every normalized score with the configured threshold")]
    Recalculate,
    #[command(about = "Suggest product bundles from co-purchase history")]
    Bundles {
        #[arg(long, help = "Minimum number of shared purchases for a pair")]
        min_frequency: Option<u32>,
    },
    #[command(about = "Summarize sales history, optionally for one product name")]
    Sales {
        #[arg(long, help = "Exact product name to report on")]
        product: Option<String>,
    },
    #[command(about = "Record one interaction event for a product")]
    Track {
        #[arg(help = "Product id")]
        product: String,
        #[arg(help = "hover_2s, hover_5s, product_click, add_to_cart, or cart_abandon")]
        event_type: String,
        #[arg(long, help = "Attribute the event to a user")]
        user: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Scores { product, limit } => commands::scores::run(product, limit),
        Command::Recalculate => commands::recalculate::run(),
        Command::Bundles { min_frequency } => commands::bundles::run(min_frequency),
        Command::Sales { product } => commands::sales::run(product),
        Command::Track { product, event_type, user } => {
            commands::track::run(product, event_type, user)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
