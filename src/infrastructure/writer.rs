//! Single writer thread for fragment files.
//!
//! Workers never touch the output tree. Every append goes through one
//! thread, so lines of different files never interleave within a fragment.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{Sender, unbounded};

use crate::domain::token::mask_method_name;

/// All lines of one successfully extracted file.
#[derive(Debug)]
pub struct WriteJob {
    pub fragment: PathBuf,
    pub lines: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteStats {
    pub jobs: usize,
    pub lines: usize,
    pub failed_jobs: usize,
}

pub struct FragmentWriter {
    sender: Sender<WriteJob>,
    handle: JoinHandle<WriteStats>,
}

impl FragmentWriter {
    pub fn spawn() -> Result<Self> {
        let (sender, receiver) = unbounded::<WriteJob>();
        let handle = thread::Builder::new()
            .name("fragment-writer".to_string())
            .spawn(move || {
                let mut stats = WriteStats::default();
                while let Ok(job) = receiver.recv() {
                    stats.jobs += 1;
                    match append_lines(&job) {
                        Ok(()) => stats.lines += job.lines.len(),
                        Err(err) => {
                            stats.failed_jobs += 1;
                            tracing::error!(
                                fragment = %job.fragment.display(),
                                error = %format!("{err:#}"),
                                "failed to append to fragment"
                            );
                        }
                    }
                }
                stats
            })
            .context("failed to spawn fragment writer thread")?;
        Ok(Self { sender, handle })
    }

    /// Queue a job. Fails only when the writer thread is gone.
    pub fn submit(&self, job: WriteJob) -> Result<()> {
        self.sender
            .send(job)
            .map_err(|_| anyhow!("fragment writer thread has stopped"))
    }

    /// Close the queue, wait until every queued job is on disk and return
    /// the totals.
    pub fn finish(self) -> Result<WriteStats> {
        drop(self.sender);
        self.handle
            .join()
            .map_err(|_| anyhow!("fragment writer thread panicked"))
    }
}

/// Mask the job's lines and append them to its fragment in one write. A
/// failed write is cut back to the previous end of the fragment, so a file's
/// lines land completely or not at all. No fragment stays open between jobs.
fn append_lines(job: &WriteJob) -> Result<()> {
    let payload = render_job(&job.lines);
    let mut file = open_fragment(&job.fragment)?;
    let start = file
        .metadata()
        .with_context(|| format!("reading metadata of {}", job.fragment.display()))?
        .len();
    if let Err(err) = file.write_all(payload.as_bytes()).and_then(|()| file.flush()) {
        truncate_to(&mut file, start)
            .with_context(|| format!("rolling back {}", job.fragment.display()))?;
        return Err(err).with_context(|| format!("writing {}", job.fragment.display()));
    }
    Ok(())
}

fn render_job(lines: &[String]) -> String {
    let mut payload = String::with_capacity(lines.iter().map(String::len).sum());
    for line in lines {
        payload.push_str(&mask_method_name(line));
    }
    payload
}

fn truncate_to(file: &mut File, len: u64) -> io::Result<()> {
    file.set_len(len)?;
    file.sync_data()
}

fn open_fragment(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))
}
