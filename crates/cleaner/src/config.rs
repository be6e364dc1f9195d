use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use repo_tidy_core::{Destination, Policy};

pub const DEFAULT_OUTPUT_DIR: &str = "cleaned-repo";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the directory created under the parent folder to hold the
    /// working copies. Never treated as a repository itself.
    pub output_dir_name: String,
    pub policy: Policy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir_name: DEFAULT_OUTPUT_DIR.to_string(),
            policy: Policy::default(),
        }
    }
}

impl Config {
    pub fn with_policy(policy: Policy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn output_root(&self, parent: &Path) -> PathBuf {
        parent.join(&self.output_dir_name)
    }

    /// The two destination roots of a repository; every stage treats them as
    /// already classified.
    pub fn destination_roots(repo_root: &Path) -> Vec<PathBuf> {
        Destination::ALL
            .iter()
            .map(|d| d.root_in(repo_root))
            .collect()
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(Self {
            policy: config.policy.clone().normalized(),
            ..config
        })
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(Into::into)
    }
}
