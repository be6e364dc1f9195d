use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

pub const DEFAULT_TOOL: &str = "7z";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot run {}: {source}", tool.display())]
    Spawn {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {status} on {}: {stderr}", tool.display(), path.display())]
    Failed {
        tool: PathBuf,
        path: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compress,
    Extract,
}

impl Mode {
    /// `z` compresses, `u` extracts.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim().to_lowercase().as_str() {
            "z" => Some(Mode::Compress),
            "u" => Some(Mode::Extract),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub source: PathBuf,
    pub target: PathBuf,
    /// The target already exists and is left alone.
    pub skip: bool,
}

impl Job {
    fn new(source: PathBuf, target: PathBuf) -> Self {
        let skip = target.exists();
        Self {
            source,
            target,
            skip,
        }
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|source| ArchiveError::Read {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .collect();
    entries.sort();
    Ok(entries)
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

/// One job per immediate subdirectory: `<dir>/<name>` -> `<dir>/<name>.zip`.
pub fn plan_compress(dir: &Path) -> Result<Vec<Job>, ArchiveError> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|p| p.is_dir())
        .filter_map(|folder| {
            let name = folder.file_name()?.to_os_string();
            let mut zip_name = name;
            zip_name.push(".zip");
            let target = dir.join(zip_name);
            Some(Job::new(folder, target))
        })
        .collect())
}

/// One job per `*.zip` file: `<dir>/<stem>.zip` -> `<dir>/<stem>`.
pub fn plan_extract(dir: &Path) -> Result<Vec<Job>, ArchiveError> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|p| p.is_file() && is_zip(p))
        .filter_map(|zip| {
            let target = dir.join(zip.file_stem()?);
            Some(Job::new(zip, target))
        })
        .collect())
}

/// Drives an external 7-Zip compatible tool.
pub struct Archiver {
    tool: PathBuf,
}

impl Archiver {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }

    pub fn tool(&self) -> &Path {
        &self.tool
    }

    pub fn args(mode: Mode, job: &Job) -> Vec<OsString> {
        match mode {
            Mode::Compress => vec![
                "a".into(),
                "-tzip".into(),
                job.target.clone().into_os_string(),
                job.source.clone().into_os_string(),
            ],
            Mode::Extract => {
                let mut out = OsString::from("-o");
                out.push(&job.target);
                vec![
                    "x".into(),
                    job.source.clone().into_os_string(),
                    out,
                    "-y".into(),
                ]
            }
        }
    }

    pub fn run_job(&self, mode: Mode, job: &Job) -> Result<(), ArchiveError> {
        let output = Command::new(&self.tool)
            .args(Self::args(mode, job))
            .output()
            .map_err(|source| ArchiveError::Spawn {
                tool: self.tool.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ArchiveError::Failed {
                tool: self.tool.clone(),
                path: job.source.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    /// Run the jobs in order, stopping at the first failure. Skipped jobs
    /// are reported to `on_job` but never run.
    pub fn run_all(
        &self,
        mode: Mode,
        jobs: &[Job],
        mut on_job: impl FnMut(&Job),
    ) -> Result<usize, ArchiveError> {
        let mut ran = 0;
        for job in jobs {
            on_job(job);
            if job.skip {
                continue;
            }
            tracing::debug!(
                source = %job.source.display(),
                target = %job.target.display(),
                ?mode,
                "running archive tool"
            );
            self.run_job(mode, job)?;
            ran += 1;
        }
        Ok(ran)
    }

    pub fn compress_all(&self, dir: &Path, on_job: impl FnMut(&Job)) -> Result<usize, ArchiveError> {
        let jobs = plan_compress(dir)?;
        self.run_all(Mode::Compress, &jobs, on_job)
    }

    pub fn extract_all(&self, dir: &Path, on_job: impl FnMut(&Job)) -> Result<usize, ArchiveError> {
        let jobs = plan_extract(dir)?;
        self.run_all(Mode::Extract, &jobs, on_job)
    }
}

impl Default for Archiver {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL)
    }
}
