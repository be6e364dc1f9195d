use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("no GitHub token provided (set GITHUB_TOKEN)")]
    MissingToken,

    #[error("GitHub API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to clone {name}: {source}")]
    Clone {
        name: String,
        #[source]
        source: git2::Error,
    },
}
