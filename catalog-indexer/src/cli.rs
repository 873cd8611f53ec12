//! Command-line interface.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "catalog-indexer")]
#[command(about = "Sync the product catalog from PostgreSQL into the search index", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run one full sync (the default)
    Sync,
    /// Forward a raw query body to an index and print the hits
    Search {
        /// Index to search
        #[arg(long)]
        index: String,

        /// Query body as JSON
        #[arg(long)]
        query: String,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Sync)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_runs_sync() {
        let cli = Cli::try_parse_from(["catalog-indexer"]).unwrap();
        assert_eq!(cli.command(), Command::Sync);
    }

    #[test]
    fn test_search_arguments() {
        let cli = Cli::try_parse_from([
            "catalog-indexer",
            "search",
            "--index",
            "products",
            "--query",
            r#"{"query":{"match_all":{}}}"#,
        ])
        .unwrap();

        assert_eq!(
            cli.command(),
            Command::Search {
                index: "products".to_string(),
                query: r#"{"query":{"match_all":{}}}"#.to_string(),
            }
        );
    }

    #[test]
    fn test_search_requires_query() {
        assert!(Cli::try_parse_from(["catalog-indexer", "search", "--index", "products"]).is_err());
    }
}
