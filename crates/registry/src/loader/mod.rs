//! Deserialization of snippet files.

use std::ffi::OsStr;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use stencil_snippet::{SnippetBody, parse_snippet_template};

use crate::error::LoadError;
use crate::registry::SnippetDef;

/// Serialization format of a snippet file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetFormat {
	Json,
	Toml,
	Yaml,
}

impl SnippetFormat {
	/// Picks the format from the file extension.
	pub fn from_path(path: &Path) -> Option<Self> {
		match path.extension().and_then(OsStr::to_str)? {
			"json" => Some(Self::Json),
			"toml" => Some(Self::Toml),
			"yaml" | "yml" => Some(Self::Yaml),
			_ => None,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
	One(String),
	Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawSnippet {
	#[serde(default)]
	prefix: Option<OneOrMany>,
	body: OneOrMany,
	#[serde(default)]
	description: Option<String>,
}

/// Parses a snippet file, keeping the order of its entries.
///
/// A missing prefix defaults to the snippet name. Entries whose body does
/// not parse are logged and skipped so one typo does not hide a whole file.
pub fn parse_source(text: &str, format: SnippetFormat) -> Result<Vec<SnippetDef>, LoadError> {
	let raw: IndexMap<String, RawSnippet> = match format {
		SnippetFormat::Json => serde_json::from_str(text)?,
		SnippetFormat::Toml => toml::from_str(text)?,
		SnippetFormat::Yaml => serde_yaml::from_str(text)?,
	};

	let mut snippets = Vec::with_capacity(raw.len());
	for (name, raw) in raw {
		let body = match raw.body {
			OneOrMany::One(text) => SnippetBody::Text(text),
			OneOrMany::Many(lines) => SnippetBody::Lines(lines),
		};
		if let Err(source) = parse_snippet_template(&body.join("\n")) {
			let err = LoadError::InvalidSnippet { name, source };
			tracing::warn!(%err, "skipping snippet");
			continue;
		}

		let prefixes = match raw.prefix {
			None => vec![name.clone()],
			Some(OneOrMany::One(prefix)) => vec![prefix],
			Some(OneOrMany::Many(prefixes)) => prefixes,
		}
		.into_iter()
		.filter(|prefix| !prefix.is_empty())
		.collect();

		snippets.push(SnippetDef {
			name,
			prefixes,
			body,
			description: raw.description,
		});
	}
	Ok(snippets)
}

#[cfg(test)]
mod tests;
