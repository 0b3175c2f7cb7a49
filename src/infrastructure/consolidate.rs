//! Merge per-project fragments into one file per split.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const CONSOLIDATED_FILE_NAME: &str = "path_contexts.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidatedSplit {
    pub split: String,
    pub path: PathBuf,
    pub fragments: usize,
}

/// For every split directory under `out_dir`, concatenate its fragments in
/// file-name order into [`CONSOLIDATED_FILE_NAME`] and delete them.
///
/// Missing split directories are skipped with a warning. Must only run once
/// the writer has been joined.
pub fn consolidate_splits(
    out_dir: &Path,
    splits: &[String],
    extension: &str,
) -> Result<Vec<ConsolidatedSplit>> {
    let mut consolidated = Vec::new();
    for split in splits {
        let dir = out_dir.join(split);
        if !dir.is_dir() {
            tracing::warn!(split = %split, dir = %dir.display(), "split directory missing, skipping");
            continue;
        }
        let fragments = list_fragments(&dir, extension)?;
        let target = dir.join(CONSOLIDATED_FILE_NAME);
        concatenate(&fragments, &target)?;
        for fragment in &fragments {
            fs::remove_file(fragment)
                .with_context(|| format!("removing fragment {}", fragment.display()))?;
        }
        tracing::info!(
            split = %split,
            fragments = fragments.len(),
            output = %target.display(),
            "consolidated split"
        );
        consolidated.push(ConsolidatedSplit {
            split: split.clone(),
            path: target,
            fragments: fragments.len(),
        });
    }
    Ok(consolidated)
}

fn list_fragments(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut fragments = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some(extension) {
            fragments.push(path);
        }
    }
    fragments.sort();
    Ok(fragments)
}

fn concatenate(fragments: &[PathBuf], target: &Path) -> Result<()> {
    let file = File::create(target).with_context(|| format!("creating {}", target.display()))?;
    let mut out = BufWriter::new(file);
    for fragment in fragments {
        let mut input =
            File::open(fragment).with_context(|| format!("opening {}", fragment.display()))?;
        io::copy(&mut input, &mut out)
            .with_context(|| format!("copying {}", fragment.display()))?;
    }
    out.flush()
        .with_context(|| format!("flushing {}", target.display()))?;
    Ok(())
}
