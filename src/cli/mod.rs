mod args;
mod chat;
mod index;
mod ingest;
mod search;
mod tui;

pub use args::{Args, Command};
pub use chat::run_chat;
pub use index::{run_index_clear, run_index_status};
pub use ingest::{collect_files, ingest_paths, run_ingest, IngestReport};
pub use search::{run_ask, run_search};
