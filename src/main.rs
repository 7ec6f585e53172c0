use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ragline::cli::{
    run_ask, run_chat, run_index_clear, run_index_status, run_ingest, run_search, Args, Command,
};
use ragline::Config;

fn init_logging(verbose: bool) {
    let default = if verbose { "ragline=debug" } else { "ragline=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Ingest { paths } => run_ingest(&config, &paths).await,
        Command::Search {
            query,
            k,
            hybrid,
            json,
        } => run_search(&config, &query, k, hybrid, json).await,
        Command::Ask {
            question,
            hybrid,
            show_reasoning,
        } => run_ask(&config, &question, hybrid, show_reasoning).await,
        Command::Chat { paths, hybrid } => run_chat(&config, &paths, hybrid).await,
        Command::Status => run_index_status(&config).await,
        Command::Clear => run_index_clear(&config).await,
    }
}
