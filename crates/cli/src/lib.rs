pub mod commands;

use cartwise_core::config::ClassifierKind;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "cartwise",
    about = "Cartwise operator CLI",
    long_about = "Prepare the product catalog, hydrate the search index, inspect configuration, and run single shopping-assistant turns.",
    after_help = "Examples:\n  cartwise migrate\n  cartwise seed\n  cartwise ask \"Find me a jacket under 100 INR\"\n  cartwise doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo product catalog")]
    Seed,
    #[command(about = "Embed every catalog product into the configured product index")]
    Index,
    #[command(about = "Run one conversation turn against the catalog and print the reply")]
    Ask {
        #[arg(help = "The shopper's message")]
        message: String,
        #[arg(long, help = "Override router.classifier (llm or rules)")]
        classifier: Option<ClassifierKind>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, database, catalog, and search backend readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Index => commands::index::run(),
        Command::Ask { message, classifier } => commands::ask::run(&message, classifier),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
