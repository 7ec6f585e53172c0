use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ragline")]
#[command(version, about = "Ask questions about your documents with a local model")]
pub struct Args {
    /// Configuration file (defaults to ./ragline.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add files or directories to the index
    Ingest {
        /// Files or directories to ingest
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Retrieve the passages most relevant to a query
    Search {
        query: String,

        /// Number of passages to return
        #[arg(short, long)]
        k: Option<usize>,

        /// Fuse semantic and BM25 rankings
        #[arg(long)]
        hybrid: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Answer a question from the indexed documents
    Ask {
        question: String,

        /// Fuse semantic and BM25 rankings
        #[arg(long)]
        hybrid: bool,

        /// Print the model's reasoning before the answer
        #[arg(long)]
        show_reasoning: bool,
    },

    /// Interactive question loop, optionally ingesting files first
    Chat {
        paths: Vec<PathBuf>,

        #[arg(long)]
        hybrid: bool,
    },

    /// Show index statistics
    Status,

    /// Remove every indexed document
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let args = Args::parse_from(["ragline", "search", "what is bm25", "-k", "3", "--json"]);
        match args.command {
            Command::Search {
                query,
                k,
                hybrid,
                json,
            } => {
                assert_eq!(query, "what is bm25");
                assert_eq!(k, Some(3));
                assert!(!hybrid);
                assert!(json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from(["ragline", "status", "-v", "--config", "alt.toml"]);
        assert!(args.verbose);
        assert_eq!(args.config, Some(PathBuf::from("alt.toml")));
    }

    #[test]
    fn test_ingest_requires_paths() {
        assert!(Args::try_parse_from(["ragline", "ingest"]).is_err());
    }
}
