use clap::{Parser, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod analyze;
mod error;
mod log;
mod model;
mod render;

use error::AnalysisError;
use render::PngSink;

pub type Result<T> = anyhow::Result<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogType {
    Gc,
    Safepoint,
}

#[derive(Debug, Parser)]
#[command(name = "gc-log-analyzer")]
#[command(about = "Analyze JVM GC and safepoint logs", long_about = None)]
struct Cli {
    /// The type of log.
    #[arg(value_enum)]
    logtype: LogType,

    /// The file to analyze.
    filename: PathBuf,

    /// The number of top consumers to display.
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// Plot wall-clock time instead of JVM time. For a safepoint analysis,
    /// pass the GC log to take timestamps from.
    #[arg(long = "use_gc_timestamps", value_name = "GC_LOG", num_args = 0..=1)]
    use_gc_timestamps: Option<Option<PathBuf>>,

    /// Save the plot without opening an image viewer.
    #[arg(long)]
    no_open: bool,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Companion GC log for a safepoint run.
    fn companion_gc_log(&self) -> Result<Option<&Path>> {
        match &self.use_gc_timestamps {
            None => Ok(None),
            Some(None) => Err(AnalysisError::MissingGcLogPath.into()),
            Some(Some(path)) => Ok(Some(path.as_path())),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let sink = PngSink::new(!cli.no_open);
    let mut stdout = io::stdout().lock();

    match cli.logtype {
        LogType::Gc => {
            analyze::analyze_gc(
                &cli.filename,
                cli.use_gc_timestamps.is_some(),
                cli.top,
                &mut stdout,
                &sink,
            )?;
        }
        LogType::Safepoint => {
            let start = log::resolve_jvm_start(cli.companion_gc_log()?)?;
            analyze::analyze_safepoint(&cli.filename, cli.top, start, &mut stdout, &sink)?;
        }
    }

    Ok(())
}
