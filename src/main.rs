// Command-line entry point for pathminer.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pathminer::application::{MineOptions, MineUsecase};
use pathminer::domain::deadline::Deadline;
use pathminer::domain::path::{DEFAULT_MAX_PATH_LENGTH, DEFAULT_MAX_PATH_WIDTH, MergeLimits};
use pathminer::infrastructure::PythonExtractor;
use pathminer::infrastructure::config::Settings;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mine a `<bucket>/<project>/...` corpus into consolidated split files
    Mine(MineArgs),
    /// Print the path-context lines of one Python file
    Extract(ExtractArgs),
    /// Print the per-function syntax trees of one Python file as JSON
    Tree(TreeArgs),
}

#[derive(Args, Debug)]
struct MineArgs {
    /// Corpus root containing <bucket>/<project>/ directories
    #[arg(long, alias = "in_dir")]
    in_dir: PathBuf,

    /// Output root for fragments and consolidated splits
    #[arg(long, alias = "out_dir")]
    out_dir: PathBuf,

    /// Maximum tree distance between the two ends of a path context
    #[arg(long, alias = "max_path_length", alias = "maxlen")]
    max_path_length: Option<usize>,

    /// Maximum sibling-index span at the top of a path context
    #[arg(long, alias = "max_path_width", alias = "maxwidth")]
    max_path_width: Option<usize>,

    /// Extraction worker threads (default: number of CPUs)
    #[arg(long, alias = "max_workers")]
    workers: Option<usize>,

    /// Per-file extraction timeout in seconds
    #[arg(long, alias = "timeout_secs")]
    timeout_secs: Option<u64>,

    /// TOML configuration file; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Python source file
    file: PathBuf,

    #[arg(long, alias = "max_path_length", default_value_t = DEFAULT_MAX_PATH_LENGTH)]
    max_path_length: usize,

    #[arg(long, alias = "max_path_width", default_value_t = DEFAULT_MAX_PATH_WIDTH)]
    max_path_width: usize,
}

#[derive(Args, Debug)]
struct TreeArgs {
    /// Python source file
    file: PathBuf,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Command::Mine(args) => mine(args),
        Command::Extract(args) => extract(args),
        Command::Tree(args) => tree(args),
    };

    if let Err(err) = result {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
}

fn mine(args: MineArgs) -> Result<()> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(max_path_length) = args.max_path_length {
        settings.extractor.max_path_length = max_path_length;
    }
    if let Some(max_path_width) = args.max_path_width {
        settings.extractor.max_path_width = max_path_width;
    }
    if let Some(workers) = args.workers {
        settings.pipeline.workers = workers;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.pipeline.timeout_secs = timeout_secs;
    }
    settings.validate()?;

    let extractor = PythonExtractor::new(settings.extractor.limits());
    let usecase = MineUsecase {
        extractor: &extractor,
    };
    let report = usecase.run(&MineOptions {
        in_dir: args.in_dir,
        out_dir: args.out_dir,
        workers: settings.pipeline.workers,
        timeout: settings.pipeline.timeout(),
        splits: settings.pipeline.splits.clone(),
        fragment_extension: settings.pipeline.fragment_extension.clone(),
    })?;

    for split in &report.consolidated {
        println!("{}: {}", split.split, split.path.display());
    }
    Ok(())
}

fn extract(args: ExtractArgs) -> Result<()> {
    let extractor = PythonExtractor::new(MergeLimits {
        max_path_length: args.max_path_length,
        max_path_width: args.max_path_width,
    });
    let lines = extractor
        .extract_lines(&args.file, &Deadline::none())
        .with_context(|| format!("extracting {}", args.file.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in &lines {
        out.write_all(line.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

fn tree(args: TreeArgs) -> Result<()> {
    let trees = PythonExtractor::default()
        .extract_trees(&args.file)
        .with_context(|| format!("extracting {}", args.file.display()))?;
    println!("{}", serde_json::to_string_pretty(&trees)?);
    Ok(())
}
