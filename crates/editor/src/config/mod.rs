//! Snippet service configuration, read from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Service settings.
///
/// ```toml
/// sync_delay = 0
/// drop_on_zero = false
///
/// [[sources]]
/// path = "snippets/rust.toml"
/// filetypes = ["rust"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Debounce before edits are folded into the active snippet, in
	/// milliseconds. Negative values turn live synchronization off.
	pub sync_delay: i64,
	/// Leave a top-level snippet as soon as its final stop is reached.
	pub drop_on_zero: bool,
	/// Snippet files loaded by [`SnippetService::load_configured`](crate::SnippetService::load_configured).
	pub sources: Vec<SnippetSource>,
}

/// A snippet file and the filetypes it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnippetSource {
	pub path: PathBuf,
	/// Empty means every filetype.
	#[serde(default)]
	pub filetypes: Vec<String>,
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid config: {0}")]
	Toml(#[from] toml::de::Error),
}

impl Config {
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}

	/// Reads a config file. Relative source paths are resolved against the
	/// directory containing it.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let mut config = Self::from_toml_str(&text)?;
		if let Some(dir) = path.parent() {
			for source in &mut config.sources {
				if source.path.is_relative() {
					source.path = dir.join(&source.path);
				}
			}
		}
		Ok(config)
	}

	/// Debounce delay, or `None` when live synchronization is disabled.
	pub fn sync_delay(&self) -> Option<Duration> {
		u64::try_from(self.sync_delay).ok().map(Duration::from_millis)
	}
}
