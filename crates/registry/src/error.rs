use std::path::PathBuf;

use stencil_snippet::SnippetParseError;

/// Failure to load a snippet file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("invalid TOML: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("invalid YAML: {0}")]
	Yaml(#[from] serde_yaml::Error),

	/// The extension is none of `json`, `toml`, `yaml` or `yml`.
	#[error("unsupported snippet file format: {}", path.display())]
	UnsupportedFormat { path: PathBuf },

	/// A body that does not parse as a snippet template.
	#[error("snippet '{name}' has an invalid body: {source}")]
	InvalidSnippet {
		name: String,
		#[source]
		source: SnippetParseError,
	},
}
