//! Corpus-scale mining: discover, extract in parallel, write, consolidate.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::unbounded;

use crate::domain::deadline::Deadline;
use crate::domain::error::ExtractError;
use crate::infrastructure::concurrency::build_worker_pool;
use crate::infrastructure::consolidate::{ConsolidatedSplit, consolidate_splits};
use crate::infrastructure::discovery::{SourceFile, discover_source_files};
use crate::infrastructure::writer::{FragmentWriter, WriteJob};
use crate::ports::PathExtractor;

const PROGRESS_INTERVAL: usize = 1000;

#[derive(Debug, Clone)]
pub struct MineOptions {
    pub in_dir: PathBuf,
    pub out_dir: PathBuf,
    pub workers: usize,
    pub timeout: Duration,
    pub splits: Vec<String>,
    pub fragment_extension: String,
}

/// Per-run totals. Every discovered file lands in exactly one of
/// `succeeded`, `empty`, `failed` or `timed_out`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MineReport {
    pub discovered: usize,
    pub succeeded: usize,
    pub empty: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub lines_written: usize,
    pub consolidated: Vec<ConsolidatedSplit>,
}

enum FileOutcome {
    Lines(Vec<String>),
    Failed(ExtractError),
    TimedOut,
    Panicked(String),
}

pub struct MineUsecase<'a> {
    pub extractor: &'a dyn PathExtractor,
}

impl<'a> MineUsecase<'a> {
    /// Mine `options.in_dir` into `options.out_dir`.
    ///
    /// Per-file failures are counted, never returned; only output-side I/O
    /// fails the run.
    pub fn run(&self, options: &MineOptions) -> Result<MineReport> {
        let started = Instant::now();
        std::fs::create_dir_all(&options.out_dir)
            .with_context(|| format!("creating output directory {}", options.out_dir.display()))?;

        let files = discover_source_files(&options.in_dir);
        tracing::info!(
            files = files.len(),
            in_dir = %options.in_dir.display(),
            workers = options.workers,
            "discovered source files"
        );

        let mut report = MineReport {
            discovered: files.len(),
            ..MineReport::default()
        };

        let pool = build_worker_pool(options.workers)?;
        let writer = FragmentWriter::spawn()?;
        let extractor = self.extractor;
        let timeout = options.timeout;

        pool.in_place_scope(|scope| -> Result<()> {
            let (sender, receiver) = unbounded::<(usize, FileOutcome)>();
            for (index, file) in files.iter().enumerate() {
                let sender = sender.clone();
                scope.spawn(move |_| {
                    let outcome = process_file(extractor, file, timeout);
                    let _ = sender.send((index, outcome));
                });
            }
            drop(sender);

            let mut processed = 0;
            while let Ok((index, outcome)) = receiver.recv() {
                let file = &files[index];
                processed += 1;
                match outcome {
                    FileOutcome::Lines(lines) if lines.is_empty() => report.empty += 1,
                    FileOutcome::Lines(lines) => {
                        report.succeeded += 1;
                        writer.submit(WriteJob {
                            fragment: file.fragment_path(&options.out_dir, &options.fragment_extension),
                            lines,
                        })?;
                    }
                    FileOutcome::TimedOut => {
                        report.timed_out += 1;
                        tracing::warn!(file = %file.path.display(), timeout_secs = timeout.as_secs(), "extraction timed out");
                    }
                    FileOutcome::Failed(err) if err.is_recoverable() => {
                        report.failed += 1;
                        tracing::debug!(file = %file.path.display(), error = %err, "skipping file");
                    }
                    FileOutcome::Failed(err) => {
                        report.failed += 1;
                        tracing::error!(file = %file.path.display(), error = %err, "extractor invariant violated");
                    }
                    FileOutcome::Panicked(message) => {
                        report.failed += 1;
                        tracing::error!(file = %file.path.display(), panic = %message, "extractor panicked");
                    }
                }
                if processed % PROGRESS_INTERVAL == 0 {
                    tracing::info!(processed, total = files.len(), "mining progress");
                }
            }
            Ok(())
        })?;

        let stats = writer.finish()?;
        report.lines_written = stats.lines;
        if stats.failed_jobs > 0 {
            tracing::warn!(failed_jobs = stats.failed_jobs, "some fragment writes failed");
        }

        report.consolidated =
            consolidate_splits(&options.out_dir, &options.splits, &options.fragment_extension)?;

        tracing::info!(
            discovered = report.discovered,
            succeeded = report.succeeded,
            empty = report.empty,
            failed = report.failed,
            timed_out = report.timed_out,
            lines = report.lines_written,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "mining finished"
        );
        Ok(report)
    }
}

/// Run the extractor on one file under its own deadline, turning panics and
/// late results into outcomes.
fn process_file(extractor: &dyn PathExtractor, file: &SourceFile, timeout: Duration) -> FileOutcome {
    let deadline = Deadline::after(timeout);
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        extractor.extract_lines(&file.path, &deadline)
    }));
    match result {
        Ok(_) if deadline.is_expired() => FileOutcome::TimedOut,
        Ok(Ok(lines)) => FileOutcome::Lines(lines),
        Ok(Err(ExtractError::Timeout)) => FileOutcome::TimedOut,
        Ok(Err(err)) => FileOutcome::Failed(err),
        Err(payload) => FileOutcome::Panicked(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    struct Fixed(Result<Vec<String>, fn() -> ExtractError>);

    impl PathExtractor for Fixed {
        fn extract_lines(&self, _path: &Path, _deadline: &Deadline) -> Result<Vec<String>, ExtractError> {
            match &self.0 {
                Ok(lines) => Ok(lines.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    struct Panicking;

    impl PathExtractor for Panicking {
        fn extract_lines(&self, _path: &Path, _deadline: &Deadline) -> Result<Vec<String>, ExtractError> {
            panic!("builder bug");
        }
    }

    fn source() -> SourceFile {
        SourceFile {
            path: PathBuf::from("corpus/train/alpha/core.py"),
            bucket: "train".to_string(),
            project: "alpha".to_string(),
        }
    }

    #[test]
    fn test_lines_pass_through() {
        let extractor = Fixed(Ok(vec!["f a,Name,b\n".to_string()]));
        match process_file(&extractor, &source(), Duration::from_secs(60)) {
            FileOutcome::Lines(lines) => assert_eq!(lines.len(), 1),
            _ => panic!("expected lines"),
        }
    }

    #[test]
    fn test_expired_deadline_drops_result() {
        let extractor = Fixed(Ok(vec!["f a,Name,b\n".to_string()]));
        assert!(matches!(
            process_file(&extractor, &source(), Duration::ZERO),
            FileOutcome::TimedOut
        ));
    }

    #[test]
    fn test_errors_become_failures() {
        let extractor = Fixed(Err(|| ExtractError::LeafOnStack));
        assert!(matches!(
            process_file(&extractor, &source(), Duration::from_secs(60)),
            FileOutcome::Failed(ExtractError::LeafOnStack)
        ));
    }

    #[test]
    fn test_panics_are_contained() {
        match process_file(&Panicking, &source(), Duration::from_secs(60)) {
            FileOutcome::Panicked(message) => assert_eq!(message, "builder bug"),
            _ => panic!("expected a contained panic"),
        }
    }
}
