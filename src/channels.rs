//! Channel directory
//!
//! Static lookup table for the channel listing endpoint. Loaded once from
//! a JSON file at startup and served read-only; unknown ids surface as a
//! miss the HTTP layer turns into a 404.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A single directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to read channel directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse channel directory: {0}")]
    Parse(#[from] serde_json::Error),
}

/// In-memory channel directory keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ChannelDirectory {
    channels: HashMap<u64, Channel>,
}

impl ChannelDirectory {
    /// Parse a JSON array of channels.
    pub fn from_json_str(json: &str) -> Result<Self, DirectoryError> {
        let entries: Vec<Channel> = serde_json::from_str(json)?;
        Ok(Self {
            channels: entries.into_iter().map(|c| (c.id, c)).collect(),
        })
    }

    /// Load a JSON channel list from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn lookup(&self, id: u64) -> Option<&Channel> {
        self.channels.get(&id)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"id": 1, "name": "MyChannel", "tags": ["rust", "backend"], "description": "Systems programming"},
        {"id": 2, "name": "Another"}
    ]"#;

    #[test]
    fn lookup_by_id() {
        let directory = ChannelDirectory::from_json_str(SAMPLE).unwrap();
        assert_eq!(directory.len(), 2);

        let channel = directory.lookup(1).unwrap();
        assert_eq!(channel.name, "MyChannel");
        assert_eq!(channel.tags, vec!["rust", "backend"]);

        assert!(directory.lookup(99).is_none());
    }

    #[test]
    fn missing_fields_default() {
        let directory = ChannelDirectory::from_json_str(SAMPLE).unwrap();
        let channel = directory.lookup(2).unwrap();
        assert!(channel.tags.is_empty());
        assert_eq!(channel.description, "");
    }

    #[test]
    fn malformed_directory_is_a_parse_error() {
        assert!(matches!(
            ChannelDirectory::from_json_str("[{]"),
            Err(DirectoryError::Parse(_))
        ));
    }
}
