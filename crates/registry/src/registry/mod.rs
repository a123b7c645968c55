use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stencil_snippet::SnippetBody;

use crate::error::LoadError;
use crate::loader::{SnippetFormat, parse_source};

/// Filetype whose snippets apply to every buffer.
pub const GLOBAL_FILETYPE: &str = "*";

/// One snippet from a snippet file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetDef {
	pub name: String,
	pub prefixes: Vec<String>,
	pub body: SnippetBody,
	pub description: Option<String>,
}

/// The snippet a line ends with, and the prefix that matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnippetMatch<'a> {
	pub prefix: &'a str,
	pub snippet: &'a SnippetDef,
}

/// Completion candidate for a host completion menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteItem {
	pub word: String,
	pub kind: String,
	pub dup: u8,
	pub user_data: CompleteUserData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteUserData {
	pub body: String,
	pub description: String,
}

#[derive(Debug, Clone)]
struct Source {
	filetypes: Vec<String>,
	snippets: Vec<SnippetDef>,
}

impl Source {
	fn applies_to(&self, filetype: &str) -> bool {
		self.filetypes.iter().any(|ft| ft == filetype || ft == GLOBAL_FILETYPE)
	}
}

/// Loaded snippet sources, in load order.
#[derive(Debug, Clone, Default)]
pub struct SnippetRegistry {
	sources: IndexMap<PathBuf, Source>,
}

impl SnippetRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads the snippet file at `path` for `filetypes` and returns how many
	/// snippets it provided.
	///
	/// Loading a path again replaces what it provided before. On failure the
	/// registry is left unchanged. An empty filetype list registers the file
	/// globally.
	pub fn load(&mut self, path: &Path, filetypes: &[&str]) -> Result<usize, LoadError> {
		let format = SnippetFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat {
			path: path.to_path_buf(),
		})?;
		let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let snippets = parse_source(&text, format)?;
		let count = self.insert(path, snippets, filetypes);
		tracing::debug!(path = %path.display(), count, ?filetypes, "loaded snippet file");
		Ok(count)
	}

	/// Registers `snippets` under `key`, replacing a previous source with the
	/// same key.
	pub fn insert(&mut self, key: impl Into<PathBuf>, snippets: Vec<SnippetDef>, filetypes: &[&str]) -> usize {
		let filetypes = if filetypes.is_empty() {
			vec![GLOBAL_FILETYPE.to_string()]
		} else {
			filetypes.iter().map(|ft| ft.to_string()).collect()
		};
		let count = snippets.len();
		self.sources.insert(key.into(), Source { filetypes, snippets });
		count
	}

	pub fn len(&self) -> usize {
		self.sources.values().map(|source| source.snippets.len()).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Snippets available for `filetype`, including global ones.
	pub fn get<'a>(&'a self, filetype: &'a str) -> impl Iterator<Item = &'a SnippetDef> + 'a {
		self.sources
			.values()
			.filter(move |source| source.applies_to(filetype))
			.flat_map(|source| source.snippets.iter())
	}

	/// Finds the snippet with the longest prefix that `line_before_cursor`
	/// ends with. Among equally long prefixes the first loaded wins.
	pub fn search<'a>(&'a self, filetype: &'a str, line_before_cursor: &str) -> Option<SnippetMatch<'a>> {
		let mut best: Option<SnippetMatch<'a>> = None;
		for snippet in self.get(filetype) {
			for prefix in &snippet.prefixes {
				let longer = best.is_none_or(|best| prefix.chars().count() > best.prefix.chars().count());
				if longer && line_before_cursor.ends_with(prefix.as_str()) {
					best = Some(SnippetMatch {
						prefix: prefix.as_str(),
						snippet,
					});
				}
			}
		}
		best
	}

	/// One completion item per prefix of every snippet for `filetype`.
	pub fn complete_items(&self, filetype: &str) -> Vec<CompleteItem> {
		self.get(filetype)
			.flat_map(|snippet| {
				snippet.prefixes.iter().map(move |prefix| CompleteItem {
					word: prefix.clone(),
					kind: "Snippet".to_string(),
					dup: 1,
					user_data: CompleteUserData {
						body: snippet.body.join("\n"),
						description: snippet.description.clone().unwrap_or_default(),
					},
				})
			})
			.collect()
	}
}
