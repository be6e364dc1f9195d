use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repo_archiver::{plan_compress, plan_extract, Archiver, Mode, DEFAULT_TOOL};

const TICK_MS: u64 = 80;

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(":: {spinner} {msg:<16} ━{bar:30}━ {pos}/{len} | ETA {eta}")
        .unwrap()
        .tick_chars("▏▎▍▌▋▊▉█▉▋▌▍▎")
        .progress_chars("━━░")
}

#[derive(Parser)]
#[command(name = "repo-archiver")]
#[command(version)]
#[command(about = "Zip every folder, or unzip every archive, in a directory")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long, global = true, default_value = ".", help = "Directory holding the folders or archives")]
    dir: PathBuf,

    #[arg(long, global = true, env = "SEVEN_ZIP", default_value = DEFAULT_TOOL, help = "Path to the 7z executable")]
    tool: PathBuf,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Zip each subdirectory into <name>.zip
    Compress,
    /// Extract each *.zip into a folder named after it
    Extract,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mode = match cli.command {
        Some(Commands::Compress) => Mode::Compress,
        Some(Commands::Extract) => Mode::Extract,
        None => {
            let choice: String = Input::new()
                .with_prompt("Type 'z' to compress or 'u' to extract")
                .interact_text()?;
            match Mode::from_choice(&choice) {
                Some(mode) => mode,
                None => {
                    println!("Invalid choice. Please type 'z' or 'u'.");
                    return Ok(());
                }
            }
        }
    };

    run(&Archiver::new(cli.tool), mode, &cli.dir)
}

fn run(archiver: &Archiver, mode: Mode, dir: &Path) -> Result<()> {
    let (jobs, verb) = match mode {
        Mode::Compress => (plan_compress(dir)?, "Compressing"),
        Mode::Extract => (plan_extract(dir)?, "Extracting"),
    };

    println!("{} in {}\n", verb, dir.display());

    let pb = ProgressBar::new(jobs.len() as u64);
    pb.set_style(bar_style());
    pb.set_message(verb);
    pb.enable_steady_tick(Duration::from_millis(TICK_MS));

    let ran = archiver
        .run_all(mode, &jobs, |job| {
            if job.skip {
                pb.println(format!("Skip: {} already exists.", job.target.display()));
            } else {
                pb.println(format!(
                    "{}: {} -> {}",
                    verb,
                    job.source.display(),
                    job.target.display()
                ));
            }
            pb.inc(1);
        })
        .with_context(|| format!("{} aborted", verb.to_lowercase()))?;
    pb.finish_and_clear();

    println!("\nDone: {} processed, {} skipped.", ran, jobs.len() - ran);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
