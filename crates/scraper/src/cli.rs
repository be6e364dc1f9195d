use anyhow::{bail, Context, Result};
use clap::Parser;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repo_scraper::{
    clone_all, load_records, save_records, CloneStatus, RepoRecord, SearchClient, MAX_PER_PAGE,
};

const TICK_MS: u64 = 80;

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(":: {spinner} {msg:<16} ━{bar:30}━ {pos}/{len} | ETA {eta}")
        .unwrap()
        .tick_chars("▏▎▍▌▋▊▉█▉▋▌▍▎")
        .progress_chars("━━░")
}

#[derive(Parser)]
#[command(name = "repo-scraper")]
#[command(version)]
#[command(about = "Search GitHub by keyword, save the results and shallow-clone them")]
struct Cli {
    #[arg(short, long, help = "Search keyword [prompted if omitted]")]
    keyword: Option<String>,

    #[arg(short, long, default_value_t = MAX_PER_PAGE, help = "Maximum results (1-100)")]
    limit: usize,

    #[arg(short, long, default_value = "repos.json", help = "Where to save the search results")]
    output: PathBuf,

    #[arg(short, long, default_value = "cloned_repos", help = "Directory to clone into")]
    dest: PathBuf,

    #[arg(long, default_value_t = 2, help = "Seconds to wait after each clone")]
    pause_secs: u64,

    #[arg(long, help = "Only search and save; do not clone")]
    no_clone: bool,

    #[arg(long, conflicts_with_all = ["keyword", "no_clone"], help = "Clone from a previously saved results file instead of searching")]
    from: Option<PathBuf>,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let records = match &cli.from {
        Some(path) => load_records(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let records = search(cli.token, cli.keyword, cli.limit)?;
            save_records(&cli.output, &records)
                .with_context(|| format!("failed to save {}", cli.output.display()))?;
            println!("Saved repository info to {}", cli.output.display());
            records
        }
    };

    if cli.no_clone {
        return Ok(());
    }

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(bar_style());
    pb.set_message("Cloning");
    pb.enable_steady_tick(Duration::from_millis(TICK_MS));

    let summary = clone_all(
        &records,
        &cli.dest,
        Duration::from_secs(cli.pause_secs),
        |record, status| {
            match status {
                CloneStatus::Cloned => pb.println(format!("  Cloned: {}", record.name)),
                CloneStatus::Skipped => pb.println(format!(
                    "  Repo '{}' already exists locally. Skipping.",
                    record.name
                )),
                CloneStatus::Failed(reason) => {
                    pb.println(format!("  [!] {}: {}", record.name, reason))
                }
            }
            pb.inc(1);
        },
    )?;
    pb.finish_and_clear();

    println!(
        "\nDone! {} cloned, {} skipped, {} failed. Check '{}' and the '{}' folder.",
        summary.cloned.len(),
        summary.skipped.len(),
        summary.failed.len(),
        cli.output.display(),
        cli.dest.display()
    );

    Ok(())
}

fn search(token: Option<String>, keyword: Option<String>, limit: usize) -> Result<Vec<RepoRecord>> {
    let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
        eprintln!("ERROR: set your GitHub token in the environment:");
        eprintln!("  export GITHUB_TOKEN='your_token_here'");
        std::process::exit(1);
    };

    let keyword = match keyword {
        Some(k) => k,
        None => Input::new()
            .with_prompt("Enter keyword to search for repositories")
            .allow_empty(true)
            .interact_text()?,
    };
    let keyword = keyword.trim();
    if keyword.is_empty() {
        bail!("please provide a valid keyword");
    }

    println!("Searching for repositories with keyword: '{}'...", keyword);
    let records = SearchClient::new(token)?.search(keyword, limit)?;
    println!("Found {} repositories.", records.len());
    Ok(records)
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
