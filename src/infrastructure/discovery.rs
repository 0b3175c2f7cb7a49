//! Corpus discovery: `<root>/<bucket>/<project>/**/*.py`.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A source file together with the bucket and project it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub bucket: String,
    pub project: String,
}

impl SourceFile {
    /// `<out_dir>/<bucket>/<project>.<extension>`.
    pub fn fragment_path(&self, out_dir: &Path, extension: &str) -> PathBuf {
        out_dir
            .join(&self.bucket)
            .join(format!("{}.{}", self.project, extension))
    }
}

/// Setup scripts and test modules carry little naming signal.
pub fn is_excluded(file_name: &str) -> bool {
    file_name == "setup.py"
        || file_name == "conftest.py"
        || file_name.starts_with("test")
        || file_name.ends_with("_test.py")
}

/// Every Python file at least two directories below `root`, sorted by path.
///
/// Unreadable entries are skipped with a warning.
pub fn discover_source_files(root: &Path) -> Vec<SourceFile> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable corpus entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("py") {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if is_excluded(&file_name) {
            tracing::trace!(file = %path.display(), "excluded by name");
            continue;
        }
        if let Some(file) = classify(root, path) {
            files.push(file);
        }
    }
    files
}

fn classify(root: &Path, path: &Path) -> Option<SourceFile> {
    let relative = path.strip_prefix(root).ok()?;
    let mut components = relative.components();
    let bucket = components.next()?.as_os_str().to_string_lossy().into_owned();
    let project = components.next()?.as_os_str().to_string_lossy().into_owned();
    // The file itself must still follow the project directory.
    components.next()?;
    Some(SourceFile {
        path: path.to_path_buf(),
        bucket,
        project,
    })
}
