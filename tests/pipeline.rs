// Batch mining over a temporary corpus.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use pathminer::application::{MineOptions, MineUsecase};
use pathminer::domain::deadline::Deadline;
use pathminer::domain::error::ExtractError;
use pathminer::infrastructure::PythonExtractor;
use pathminer::infrastructure::consolidate::CONSOLIDATED_FILE_NAME;
use pathminer::ports::PathExtractor;

/// Real extraction, except that files named `slow.py` take longer than any
/// test timeout and `broken.py` goes through the real parser.
struct ScriptedExtractor {
    inner: PythonExtractor,
    delay: Duration,
}

impl PathExtractor for ScriptedExtractor {
    fn extract_lines(&self, path: &Path, deadline: &Deadline) -> Result<Vec<String>, ExtractError> {
        if path.file_name().is_some_and(|name| name == "slow.py") {
            thread::sleep(self.delay);
        }
        self.inner.extract_lines(path, deadline)
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn options(in_dir: &Path, out_dir: &Path, timeout: Duration) -> MineOptions {
    MineOptions {
        in_dir: in_dir.to_path_buf(),
        out_dir: out_dir.to_path_buf(),
        workers: 2,
        timeout,
        splits: vec!["train".to_string(), "test".to_string(), "val".to_string()],
        fragment_extension: "c2v".to_string(),
    }
}

const GOOD: &str = "\
def add_values(a, b):
    return a + b

def scale(value, factor=2):
    return value * factor

class Box:
    def size(self):
        return len(self.items)
";

#[test]
fn test_failures_and_timeouts_do_not_reach_the_output() {
    let corpus = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(corpus.path(), "train/proj_a/good.py", GOOD);
    write(corpus.path(), "train/proj_a/broken.py", "def broken(:\n    pass\n");
    write(corpus.path(), "test/proj_b/slow.py", "def slow(x):\n    return x\n");
    write(corpus.path(), "train/proj_a/setup.py", GOOD);
    write(corpus.path(), "train/proj_a/test_good.py", GOOD);

    let expected_lines = PythonExtractor::default()
        .extract_lines(&corpus.path().join("train/proj_a/good.py"), &Deadline::none())
        .unwrap()
        .len();
    assert_eq!(expected_lines, 3);

    let extractor = ScriptedExtractor {
        inner: PythonExtractor::default(),
        delay: Duration::from_millis(600),
    };
    let usecase = MineUsecase {
        extractor: &extractor,
    };
    let report = usecase
        .run(&options(corpus.path(), out.path(), Duration::from_millis(300)))
        .unwrap();

    assert_eq!(report.discovered, 3);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.timed_out, 1);
    assert_eq!(report.empty, 0);
    assert_eq!(report.lines_written, expected_lines);

    let train = fs::read_to_string(out.path().join("train").join(CONSOLIDATED_FILE_NAME)).unwrap();
    assert_eq!(train.lines().count(), expected_lines);
    assert!(train.lines().any(|line| line.starts_with("add|values ")));
    assert!(!out.path().join("train").join("proj_a.c2v").exists());

    // The slow file's bucket never got a fragment, so there is nothing to
    // consolidate there.
    assert!(!out.path().join("test").exists());
    assert_eq!(report.consolidated.len(), 1);
}

#[test]
fn test_lines_are_masked_in_the_consolidated_file() {
    let corpus = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(corpus.path(), "val/proj_c/recursive.py", "def walk(walk, node):\n    return walk(node)\n");

    let extractor = PythonExtractor::default();
    let usecase = MineUsecase {
        extractor: &extractor,
    };
    let report = usecase
        .run(&options(corpus.path(), out.path(), Duration::from_secs(60)))
        .unwrap();
    assert_eq!(report.succeeded, 1);

    let val = fs::read_to_string(out.path().join("val").join(CONSOLIDATED_FILE_NAME)).unwrap();
    let line = val.lines().next().unwrap();
    assert!(line.starts_with("walk "));
    assert!(line.contains("METHOD_NAME"));
    assert!(!line.split(' ').skip(1).any(|context| context.starts_with("walk,")));
}

#[test]
fn test_fragments_of_one_project_accumulate() {
    let corpus = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    for index in 0..20 {
        write(
            corpus.path(),
            &format!("train/proj_d/module_{index}.py"),
            &format!("def f{index}(a, b):\n    return a - b\n"),
        );
    }
    write(corpus.path(), "train/proj_d/empty.py", "X = 1\n");

    let extractor = PythonExtractor::default();
    let usecase = MineUsecase {
        extractor: &extractor,
    };
    let report = usecase
        .run(&options(corpus.path(), out.path(), Duration::from_secs(60)))
        .unwrap();

    assert_eq!(report.discovered, 21);
    assert_eq!(report.succeeded, 20);
    assert_eq!(report.empty, 1);
    assert_eq!(report.lines_written, 20);
    let train = fs::read_to_string(out.path().join("train").join(CONSOLIDATED_FILE_NAME)).unwrap();
    assert_eq!(train.lines().count(), 20);
    assert!(train.lines().all(|line| line.starts_with("f ")));
}
