pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    about = "Storefront operator CLI",
    long_about = "Apply migrations, load the sample catalog, run product selection passes and inspect configuration.",
    after_help = "Examples:\n  storefront migrate\n  storefront seed\n  storefront select --limit 5\n  storefront config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic sample catalog (safe to run repeatedly)")]
    Seed,
    #[command(about = "Rescore the whole catalog and report the top-ranked products")]
    Select {
        #[arg(
            long,
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..),
            help = "Number of products to report, at least 1 (defaults to selection.top_n)"
        )]
        limit: Option<usize>,
    },
    #[command(about = "Inspect effective configuration values with source attribution and redaction")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Select { limit } => commands::select::run(limit),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn select_accepts_an_optional_limit() {
        let cli = Cli::try_parse_from(["storefront", "select", "--limit", "5"]).expect("parse");
        assert!(matches!(cli.command, Command::Select { limit: Some(5) }));

        let cli = Cli::try_parse_from(["storefront", "select"]).expect("parse");
        assert!(matches!(cli.command, Command::Select { limit: None }));
    }

    #[test]
    fn select_rejects_a_zero_limit() {
        assert!(Cli::try_parse_from(["storefront", "select", "--limit", "0"]).is_err());
        assert!(Cli::try_parse_from(["storefront", "select", "--limit", "-3"]).is_err());
    }

    #[test]
    fn unknown_subcommands_are_rejected() {
        assert!(Cli::try_parse_from(["storefront", "doctor"]).is_err());
    }
}
