//! Snippet variable resolution: document-derived built-ins, time, and user callbacks.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, Timelike};
use stencil_primitives::Document;

/// Resolves `$NAME` variables during instantiation.
///
/// `default` is the rendered default content of the variable (empty when it
/// has none). Returning `None` or an empty string falls back to that default.
pub trait SnippetVarResolver {
	fn resolve_var(&self, name: &str, default: &str) -> Option<String>;
}

impl<T: SnippetVarResolver + ?Sized> SnippetVarResolver for &T {
	fn resolve_var(&self, name: &str, default: &str) -> Option<String> {
		(**self).resolve_var(name, default)
	}
}

/// Fixed name/value pairs.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
	vars: HashMap<String, String>,
}

impl MapResolver {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.vars.insert(name.into(), value.into());
		self
	}

	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.vars.insert(name.into(), value.into());
	}
}

impl SnippetVarResolver for MapResolver {
	fn resolve_var(&self, name: &str, _default: &str) -> Option<String> {
		self.vars.get(name).cloned()
	}
}

/// Snapshot of the editing context that built-in variables are computed from.
///
/// The timestamp is captured once so every time variable in one expansion
/// agrees.
#[derive(Debug, Clone)]
pub struct VarContext {
	path: Option<PathBuf>,
	current_line: String,
	current_word: String,
	line_index: usize,
	selected_text: Option<String>,
	now: DateTime<Local>,
}

impl VarContext {
	/// Captures the context around the cursor of `doc`.
	pub fn from_document(doc: &(impl Document + ?Sized)) -> Self {
		let cursor = doc.cursor();
		let line = doc.line_range(cursor);
		let current_line = doc.slice(line.clone());
		let column = cursor.saturating_sub(line.start);
		Self {
			path: doc.path().map(|path| path.to_path_buf()),
			current_word: word_at(&current_line, column),
			current_line,
			line_index: doc.line_index(cursor),
			selected_text: doc.selected_text(),
			now: Local::now(),
		}
	}

	/// Context with no document: only time and UUID variables resolve.
	pub fn detached() -> Self {
		Self {
			path: None,
			current_line: String::new(),
			current_word: String::new(),
			line_index: 0,
			selected_text: None,
			now: Local::now(),
		}
	}

	pub fn with_now(mut self, now: DateTime<Local>) -> Self {
		self.now = now;
		self
	}
}

impl SnippetVarResolver for VarContext {
	fn resolve_var(&self, name: &str, _default: &str) -> Option<String> {
		let now = &self.now;
		match name {
			"TM_FILEPATH" => self.path.as_ref().map(|path| path.to_string_lossy().to_string()),
			"TM_DIRECTORY" => self
				.path
				.as_ref()
				.and_then(|path| path.parent().map(|parent| parent.to_string_lossy().to_string())),
			"TM_FILENAME" => self
				.path
				.as_ref()
				.and_then(|path| path.file_name().map(|name| name.to_string_lossy().to_string())),
			"TM_FILENAME_BASE" => self
				.path
				.as_ref()
				.and_then(|path| path.file_stem().map(|stem| stem.to_string_lossy().to_string())),
			"TM_CURRENT_LINE" => Some(self.current_line.clone()),
			"TM_CURRENT_WORD" => Some(self.current_word.clone()),
			"TM_LINE_INDEX" => Some(self.line_index.to_string()),
			"TM_LINE_NUMBER" => Some((self.line_index + 1).to_string()),
			"SELECTION" | "TM_SELECTED_TEXT" => self.selected_text.clone(),
			"CURRENT_YEAR" => Some(format!("{:04}", now.year())),
			"CURRENT_YEAR_SHORT" => Some(now.format("%y").to_string()),
			"CURRENT_MONTH" => Some(format!("{:02}", now.month())),
			"CURRENT_MONTH_NAME" => Some(now.format("%B").to_string()),
			"CURRENT_MONTH_NAME_SHORT" => Some(now.format("%b").to_string()),
			"CURRENT_DATE" => Some(format!("{:02}", now.day())),
			"CURRENT_DAY_NAME" => Some(now.format("%A").to_string()),
			"CURRENT_DAY_NAME_SHORT" => Some(now.format("%a").to_string()),
			"CURRENT_HOUR" => Some(format!("{:02}", now.hour())),
			"CURRENT_MINUTE" => Some(format!("{:02}", now.minute())),
			"CURRENT_SECOND" => Some(format!("{:02}", now.second())),
			"CURRENT_SECONDS_UNIX" => Some(now.timestamp().to_string()),
			"UUID" => Some(uuid::Uuid::new_v4().to_string()),
			_ => None,
		}
	}
}

/// User-registered variable callback. Receives the rendered default text.
pub type VarCallback = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Variables registered at runtime. They take precedence over built-ins.
#[derive(Clone, Default)]
pub struct VarRegistry {
	callbacks: HashMap<String, VarCallback>,
}

impl VarRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `callback` for `name`, replacing any previous registration.
	pub fn register(&mut self, name: impl Into<String>, callback: impl Fn(&str) -> Option<String> + Send + Sync + 'static) {
		self.callbacks.insert(name.into(), Arc::new(callback));
	}

	pub fn contains(&self, name: &str) -> bool {
		self.callbacks.contains_key(name)
	}

	/// Layers the registered callbacks over `context`.
	pub fn scoped(&self, context: VarContext) -> ScopedResolver<'_> {
		ScopedResolver { registry: self, context }
	}
}

impl fmt::Debug for VarRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<&str> = self.callbacks.keys().map(String::as_str).collect();
		names.sort_unstable();
		f.debug_struct("VarRegistry").field("callbacks", &names).finish()
	}
}

impl SnippetVarResolver for VarRegistry {
	fn resolve_var(&self, name: &str, default: &str) -> Option<String> {
		self.callbacks.get(name).and_then(|callback| callback(default))
	}
}

/// Registered callbacks first, then built-ins from a [`VarContext`].
#[derive(Debug)]
pub struct ScopedResolver<'a> {
	registry: &'a VarRegistry,
	context: VarContext,
}

impl SnippetVarResolver for ScopedResolver<'_> {
	fn resolve_var(&self, name: &str, default: &str) -> Option<String> {
		if self.registry.contains(name) {
			return self.registry.resolve_var(name, default);
		}
		self.context.resolve_var(name, default)
	}
}

fn word_at(line: &str, column: usize) -> String {
	let chars: Vec<char> = line.chars().collect();
	let column = column.min(chars.len());
	let is_word = |ch: &char| ch.is_alphanumeric() || *ch == '_';

	let start = chars[..column].iter().rposition(|ch| !is_word(ch)).map_or(0, |pos| pos + 1);
	let end = chars[column..].iter().position(|ch| !is_word(ch)).map_or(chars.len(), |pos| column + pos);
	chars[start..end].iter().collect()
}
