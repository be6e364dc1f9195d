use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::ScrapeError;

pub const DESCRIPTION_MAX_CHARS: usize = 100;

/// One search hit, reduced to what is saved and cloned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRecord {
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub language: Option<String>,
    pub created_at: String,
    pub clone_url: String,
    pub stars: u64,
}

/// Shape of an item in the search response.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchItem {
    name: String,
    full_name: String,
    description: Option<String>,
    language: Option<String>,
    created_at: String,
    clone_url: String,
    stargazers_count: u64,
}

impl From<SearchItem> for RepoRecord {
    fn from(item: SearchItem) -> Self {
        Self {
            name: item.name,
            full_name: item.full_name,
            description: truncate_chars(item.description.as_deref().unwrap_or(""), DESCRIPTION_MAX_CHARS),
            language: item.language,
            created_at: item.created_at,
            clone_url: item.clone_url,
            stars: item.stargazers_count,
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Write records as a JSON array indented by four spaces.
pub fn save_records(path: &Path, records: &[RepoRecord]) -> Result<(), ScrapeError> {
    let io_err = |source| ScrapeError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
    records.serialize(&mut ser)?;
    writer.flush().map_err(io_err)
}

pub fn load_records(path: &Path) -> Result<Vec<RepoRecord>, ScrapeError> {
    let content = std::fs::read_to_string(path).map_err(|source| ScrapeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
