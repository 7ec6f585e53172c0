use anyhow::{Context, Result};
use console::{style, Emoji};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::Config;
use crate::search::{Document, IngestOutcome};
use crate::session::RagSession;
use crate::storage::UploadDir;

static INDEXING: Emoji<'_, '_> = Emoji("📊 ", "");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "");
static ERROR: Emoji<'_, '_> = Emoji("❌ ", "");
static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "");

#[derive(Debug, Default)]
pub struct IngestReport {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub chunks_created: usize,
    pub errors: Vec<String>,
}

impl IngestReport {
    /// Turn a report with failed files into an error, so the process exits
    /// non-zero.
    pub fn ensure_success(&self) -> Result<()> {
        if !self.errors.is_empty() {
            let total = self.files_processed + self.files_skipped + self.errors.len();
            anyhow::bail!(
                "{} of {} file(s) failed to ingest",
                self.errors.len(),
                total
            );
        }
        Ok(())
    }
}

/// Expand files and directories into the files to ingest. Directories are
/// walked with .gitignore rules applied.
pub fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }

        let walker = ignore::WalkBuilder::new(path)
            .hidden(true)
            .git_ignore(true)
            .build();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|t| t.is_file()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => warn!(error = %e, "error walking directory"),
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

/// Copy each file into the upload directory and ingest the stored copy.
pub async fn ingest_paths(
    session: &RagSession,
    uploads: &UploadDir,
    paths: &[PathBuf],
) -> Result<IngestReport> {
    let files = collect_files(paths);
    let mut report = IngestReport::default();

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    for file in &files {
        pb.set_message(format!("{}Ingesting {}...", INDEXING, file.display()));
        match ingest_file(session, uploads, file).await {
            Ok(IngestOutcome::Indexed { ids }) => {
                report.files_processed += 1;
                report.chunks_created += ids.len();
            }
            Ok(IngestOutcome::Unchanged) => report.files_skipped += 1,
            Err(e) => report.errors.push(format!("{}: {:#}", file.display(), e)),
        }
    }

    pb.finish_and_clear();
    session.persist().await?;

    Ok(report)
}

async fn ingest_file(session: &RagSession, uploads: &UploadDir, file: &Path) -> Result<IngestOutcome> {
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("unsupported file name: {}", file.display()))?;

    let bytes = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let stored = uploads.save(filename, &bytes)?;
    let text = uploads.read_text(filename)?;

    let document = Document::new(filename, text)
        .with_metadata("path", stored.display().to_string());

    Ok(session.ingest(document).await?)
}

pub async fn run_ingest(config: &Config, paths: &[PathBuf]) -> Result<()> {
    let session = RagSession::from_config(config).await?;
    let uploads = UploadDir::new(&config.storage.uploads_dir);

    if paths.iter().all(|p| !p.exists()) {
        anyhow::bail!("None of the given paths exist.");
    }
    session.health_check().await?;

    let report = ingest_paths(&session, &uploads, paths).await?;

    println!("\n{}Ingestion complete!\n", SUCCESS);
    println!("  Files processed: {}", style(report.files_processed).green());
    println!("  Chunks created:  {}", style(report.chunks_created).cyan());
    println!(
        "  Files skipped:   {} (unchanged)",
        style(report.files_skipped).dim()
    );

    if !report.errors.is_empty() {
        println!("\n{}Errors ({}):", ERROR, report.errors.len());
        for error in report.errors.iter().take(10) {
            println!("  - {}", style(error).red());
        }
        if report.errors.len() > 10 {
            println!("  ... and {} more", report.errors.len() - 10);
        }
    }

    let stats = session.stats().await?;
    println!("\n{}Index Statistics:", INFO);
    println!("  Documents:       {}", stats.total_documents);
    println!("  Chunks:          {}", stats.total_entries);
    println!("  Index size:      {} KB", stats.index_size_bytes / 1024);

    report.ensure_success()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_files_walks_and_respects_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join(".gitignore"), "skip.txt\n").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("skip.txt"), "s").unwrap();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("sub").join("b.md"), "b").unwrap();

        let files = collect_files(&[root.to_path_buf()]);
        let names: Vec<String> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert!(names.contains(&"a.txt".to_string()));
        assert!(names.contains(&"b.md".to_string()));
        assert!(!names.contains(&"skip.txt".to_string()));
    }

    #[test]
    fn test_report_with_errors_is_failure() {
        let mut report = IngestReport {
            files_processed: 2,
            files_skipped: 1,
            ..IngestReport::default()
        };
        assert!(report.ensure_success().is_ok());

        report.errors.push("bad.txt: service unavailable".to_string());
        let err = report.ensure_success().unwrap_err();
        assert_eq!(err.to_string(), "1 of 4 file(s) failed to ingest");
    }

    #[test]
    fn test_collect_files_accepts_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("one.txt");
        fs::write(&file, "x").unwrap();

        assert_eq!(collect_files(&[file.clone(), file.clone()]), vec![file]);
    }
}
