use anyhow::Result;
use inquire::{InquireError, Text};
use std::path::PathBuf;

use super::ingest::ingest_paths;
use super::search::print_answer;
use super::tui::{print_banner, print_error, ragline_theme};
use crate::config::Config;
use crate::session::RagSession;
use crate::storage::UploadDir;

pub async fn run_chat(config: &Config, paths: &[PathBuf], hybrid: bool) -> Result<()> {
    let session = RagSession::from_config(config).await?;

    if !paths.is_empty() {
        session.health_check().await?;
        let uploads = UploadDir::new(&config.storage.uploads_dir);
        let report = ingest_paths(&session, &uploads, paths).await?;
        for error in &report.errors {
            print_error(error);
        }
    }

    print_banner(session.documents().await?.len());

    loop {
        let question = match Text::new("Question:")
            .with_render_config(ragline_theme())
            .with_help_message("ask anything about the indexed documents")
            .prompt()
        {
            Ok(q) => q,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let question = question.trim();
        if question.is_empty() {
            break;
        }

        let answer = if hybrid {
            session.ask_hybrid(question).await
        } else {
            session.ask(question).await
        };

        match answer {
            Ok(answer) => print_answer(&answer, true),
            Err(e) => print_error(&format!("{:#}", anyhow::Error::from(e))),
        }
    }

    Ok(())
}
