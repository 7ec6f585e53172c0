use anyhow::Result;
use console::{style, Emoji};
use std::sync::Arc;

use crate::config::Config;
use crate::search::{JsonStore, VectorStore};

static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "");
static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "");

// Neither command needs the embedding service, so they open the store
// directly instead of building a session.

pub async fn run_index_status(config: &Config) -> Result<()> {
    let store_path = &config.storage.index_path;

    if !store_path.exists() {
        println!("{}No index found at {}", INFO, store_path.display());
        println!("Run `ragline ingest <paths>` to build one.");
        return Ok(());
    }

    let store: Arc<dyn VectorStore> = Arc::new(JsonStore::new(store_path.clone()));
    store.load().await?;

    let stats = store.stats().await?;

    println!("\n{}Index Status: {}\n", INFO, store_path.display());
    println!("  Documents:       {}", style(stats.total_documents).green());
    println!("  Chunks:          {}", style(stats.total_entries).cyan());
    if let Some(dimensions) = stats.dimensions {
        println!("  Dimensions:      {}", dimensions);
    }
    println!(
        "  Index size:      {} KB",
        style(stats.index_size_bytes / 1024).yellow()
    );
    if let Some(updated) = stats.last_updated {
        println!(
            "  Last updated:    {}",
            style(updated.format("%Y-%m-%d %H:%M:%S")).dim()
        );
    }

    for source in store.list_documents().await? {
        println!("    - {}", source);
    }

    Ok(())
}

pub async fn run_index_clear(config: &Config) -> Result<()> {
    let store_path = &config.storage.index_path;

    if !store_path.exists() {
        println!("{}No index found.", INFO);
        return Ok(());
    }

    let store: Arc<dyn VectorStore> = Arc::new(JsonStore::new(store_path.clone()));
    store.load().await?;
    store.clear().await?;

    println!("{}Index cleared successfully.", SUCCESS);

    Ok(())
}
