use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the log store daemon's Unix socket.
    #[serde(default = "default_socket")]
    pub socket: PathBuf,
    /// Anti-forgery token submitted with every request.
    #[serde(default)]
    pub token: String,
    /// Page size for list requests.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Default row cap for purges; absent means uncapped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purge_cap: Option<u64>,
    /// Whether this client may edit stored filters in place.
    #[serde(default)]
    pub can_edit_filters: bool,
    /// Stored filter names known to this client.
    #[serde(default)]
    pub filters: Vec<String>,

    // This field is not serialized, just used at runtime
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

fn default_socket() -> PathBuf {
    PathBuf::from(".logsieve.sock")
}

fn default_page_size() -> u64 {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket: default_socket(),
            token: String::new(),
            page_size: default_page_size(),
            purge_cap: None,
            can_edit_filters: false,
            filters: Vec::new(),
            config_path: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn known_filters(&self) -> BTreeSet<String> {
        self.filters.iter().cloned().collect()
    }
}
