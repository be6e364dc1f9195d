use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repo_cleaner::{CleanReport, Cleaner, Config, RunObserver, Snapshot};
use repo_tidy_core::{FileVerdict, Policy};

const TICK_MS: u64 = 80;

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template(" {spinner} {msg}")
        .unwrap()
        .tick_chars("▏▎▍▌▋▊▉█▉▋▌▍▎")
}

#[derive(Parser)]
#[command(name = "repo-cleaner")]
#[command(version)]
#[command(about = "Copy repositories, strip junk and split files into code/ and text/")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true, help = "Config file (JSON) overriding the default policy")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy every repository under PARENT into PARENT/cleaned-repo and clean the copies
    Run {
        #[arg(help = "Folder containing repositories [prompted if omitted]")]
        parent: Option<PathBuf>,
    },
    /// Clean existing working copies in place (destructive)
    Clean {
        #[arg(required = true, help = "Working copies to clean")]
        repos: Vec<PathBuf>,
    },
    /// Show where `clean` would send each file of a repository, without touching it
    Plan {
        #[arg(help = "Repository to inspect")]
        repo: PathBuf,
    },
    /// Explain the junk verdict and destination for individual files
    Explain {
        #[arg(required = true, help = "Files to explain")]
        files: Vec<PathBuf>,
        #[arg(short, long, help = "Repository root the files belong to [default: current dir]")]
        root: Option<PathBuf>,
    },
    /// Print the effective configuration as JSON
    Policy,
    /// Generate shell completions
    Completions {
        #[arg(help = "Shell to generate for (bash, zsh, fish, powershell)")]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Run { parent } => cmd_run(config, parent),
        Commands::Clean { repos } => cmd_clean(config, &repos),
        Commands::Plan { repo } => cmd_plan(&config.policy, &repo),
        Commands::Explain { files, root } => cmd_explain(&config.policy, &files, root),
        Commands::Policy => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "repo-cleaner", &mut io::stdout());
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = log_filter(verbose, std::env::var("RUST_LOG").ok());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// RUST_LOG, when set, replaces the --verbose level entirely.
fn log_filter(verbose: bool, rust_log: Option<String>) -> EnvFilter {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(level.into()))
}

struct CliObserver {
    pb: ProgressBar,
}

impl CliObserver {
    fn new() -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(spinner_style());
        pb.enable_steady_tick(Duration::from_millis(TICK_MS));
        Self { pb }
    }
}

impl RunObserver for CliObserver {
    fn copied(&mut self, snapshot: &Snapshot) {
        self.pb.println(format!(
            "Copied {} -> {}",
            snapshot.name,
            snapshot.destination.display()
        ));
    }

    fn cleaning(&mut self, root: &Path) {
        self.pb.set_message(format!("Cleaning {}", root.display()));
    }

    fn cleaned(&mut self, report: &CleanReport) {
        self.pb.println(format!("Cleaned {}", report.root.display()));
        self.pb.println(format!("  {}", report.summary()));
        for failure in report.failures() {
            self.pb.println(format!("  [!] {}", failure));
        }
    }

    fn failed(&mut self, root: &Path, error: &anyhow::Error) {
        self.pb.println(format!("  [!] {}: {:#}", root.display(), error));
    }
}

fn prompt_parent() -> Result<Option<PathBuf>> {
    let input: String = Input::new()
        .with_prompt("Enter path to folder containing repos")
        .allow_empty(true)
        .interact_text()?;

    let trimmed = input.trim();
    Ok((!trimmed.is_empty()).then(|| PathBuf::from(trimmed)))
}

fn cmd_run(config: Config, parent: Option<PathBuf>) -> Result<()> {
    let parent = match parent {
        Some(p) => p,
        None => match prompt_parent()? {
            Some(p) => p,
            None => {
                println!("No folder provided.");
                return Ok(());
            }
        },
    };

    let cleaner = Cleaner::new(config);
    let mut observer = CliObserver::new();
    observer
        .pb
        .set_message(format!("Copying repositories from {}", parent.display()));

    let summary = cleaner.run(&parent, &mut observer)?;
    observer.pb.finish_and_clear();

    if summary.is_empty() {
        println!("No repositories found.");
        return Ok(());
    }

    println!(
        "\nAll done. Check the '{}' folder.",
        summary.output_root.display()
    );
    if summary.failure_count() > 0 {
        println!("{} paths could not be processed.", summary.failure_count());
    }

    Ok(())
}

fn cmd_clean(config: Config, repos: &[PathBuf]) -> Result<()> {
    let cleaner = Cleaner::new(config);
    let mut observer = CliObserver::new();

    for repo in repos {
        observer.cleaning(repo);
        match cleaner.clean_repository(repo) {
            Ok(report) => observer.cleaned(&report),
            Err(e) => observer.failed(repo, &e),
        }
    }

    observer.pb.finish_and_clear();
    Ok(())
}

fn cmd_plan(policy: &Policy, repo: &Path) -> Result<()> {
    let plan = repo_cleaner::Classifier::new(policy)
        .skip_classified()
        .plan(repo)?;

    if plan.actions.is_empty() {
        println!("Nothing to classify in {}.", repo.display());
        return Ok(());
    }

    for action in &plan.actions {
        match action {
            repo_cleaner::Action::Delete { path, rule } => {
                println!("  delete  {}  ({})", relative(repo, path).display(), rule);
            }
            repo_cleaner::Action::Move { from, route, .. } => {
                println!(
                    "  {:<6}  {}  ({})",
                    route.destination,
                    relative(repo, from).display(),
                    route.rule
                );
            }
        }
    }

    let moves = plan.moves().count();
    println!(
        "\n{} to move, {} to delete",
        moves,
        plan.actions.len() - moves
    );

    Ok(())
}

fn cmd_explain(policy: &Policy, files: &[PathBuf], root: Option<PathBuf>) -> Result<()> {
    let root = match root {
        Some(r) => r,
        None => std::env::current_dir()?,
    };

    for file in files {
        let absolute = if file.is_absolute() {
            file.clone()
        } else {
            root.join(file)
        };
        let rel = relative(&root, &absolute);

        println!("File: {}", rel.display());
        match policy.judge_file(&absolute) {
            FileVerdict::Delete(rule) => println!("Verdict: junk ({})", rule),
            FileVerdict::Keep(reason) => {
                let route = policy.route(rel);
                println!("Verdict: keep ({:?})", reason);
                println!("Destination: {} ({})", route.destination, route.rule);
            }
        }
        println!();
    }

    Ok(())
}

fn relative<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
