//! Document capability consumed by the snippet engine, plus a rope-backed host.

use std::ops::Range as StdRange;
use std::path::{Path, PathBuf};

use ropey::Rope;

use crate::position::{OffsetEncoding, Position, char_to_position};
use crate::range::{CharIdx, CharLen, Range, map_through_replace};
use crate::rope::{leading_whitespace, line_content_len};

/// Text buffer and cursor owned by the host editor.
///
/// All offsets are char indices. The engine only borrows a document for the
/// duration of one call and never holds on to it.
pub trait Document {
	/// Total number of chars in the buffer.
	fn len_chars(&self) -> CharLen;

	/// Returns the text in `range`, clamped to the buffer.
	fn slice(&self, range: StdRange<CharIdx>) -> String;

	/// Replaces `range` with `text`.
	fn replace(&mut self, range: StdRange<CharIdx>, text: &str);

	/// Current cursor position.
	fn cursor(&self) -> CharIdx;

	/// Moves the cursor, collapsing any selection.
	fn set_cursor(&mut self, pos: CharIdx);

	/// Span of the line containing `pos`, without its terminator.
	fn line_range(&self, pos: CharIdx) -> StdRange<CharIdx>;

	/// Zero-based line index containing `pos`.
	fn line_index(&self, pos: CharIdx) -> usize;

	/// Selects `range` so that typing replaces it.
	///
	/// Hosts without a selection concept only move the cursor to the end.
	fn select(&mut self, range: Range) {
		self.set_cursor(range.max());
	}

	/// Newline sequence used to join multi-line bodies.
	fn newline(&self) -> &str {
		"\n"
	}

	/// Filetype used for snippet lookup.
	fn filetype(&self) -> &str {
		""
	}

	/// Backing file, if any.
	fn path(&self) -> Option<&Path> {
		None
	}

	/// Text of the active selection.
	fn selected_text(&self) -> Option<String> {
		None
	}

	/// Leading whitespace of the line containing `pos`.
	fn line_indent(&self, pos: CharIdx) -> String {
		let line = self.slice(self.line_range(pos));
		leading_whitespace(&line).to_string()
	}

	/// Text of the cursor line up to the cursor.
	fn text_before_cursor(&self) -> String {
		let cursor = self.cursor();
		let line = self.line_range(cursor);
		self.slice(line.start..cursor.max(line.start))
	}
}

/// In-memory document backed by a [`Rope`].
///
/// Models the handful of host behaviors the engine relies on: a selection
/// that typing replaces, cursor mapping across edits and a configurable
/// newline.
#[derive(Debug, Clone)]
pub struct RopeDocument {
	text: Rope,
	selection: Range,
	newline: String,
	filetype: String,
	path: Option<PathBuf>,
}

impl RopeDocument {
	/// Creates a document holding `text` with the cursor at the end.
	pub fn new(text: &str) -> Self {
		let text = Rope::from(text);
		let end = text.len_chars();
		Self {
			text,
			selection: Range::point(end),
			newline: "\n".to_string(),
			filetype: String::new(),
			path: None,
		}
	}

	pub fn with_filetype(mut self, filetype: impl Into<String>) -> Self {
		self.filetype = filetype.into();
		self
	}

	pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.path = Some(path.into());
		self
	}

	pub fn with_newline(mut self, newline: impl Into<String>) -> Self {
		self.newline = newline.into();
		self
	}

	/// Full buffer contents.
	pub fn text(&self) -> String {
		self.text.to_string()
	}

	/// Buffer contents split on `\n`.
	pub fn lines(&self) -> Vec<String> {
		self.text().split('\n').map(str::to_string).collect()
	}

	pub fn rope(&self) -> &Rope {
		&self.text
	}

	pub fn selection(&self) -> Range {
		self.selection
	}

	/// Cursor as a line/character position in `encoding`.
	pub fn cursor_position(&self, encoding: OffsetEncoding) -> Option<Position> {
		char_to_position(&self.text, self.selection.head, encoding)
	}

	/// Types `text` like a user would: a non-empty selection is replaced,
	/// otherwise the text is inserted at the cursor. The cursor ends up after
	/// the typed text.
	pub fn type_text(&mut self, text: &str) {
		let span = self.selection.extent();
		let start = span.start;
		self.replace(span, text);
		self.selection = Range::point(start + text.chars().count());
	}

	/// Deletes the selection, or the char before the cursor.
	pub fn backspace(&mut self) {
		let span = if self.selection.is_empty() {
			let head = self.selection.head;
			if head == 0 {
				return;
			}
			head - 1..head
		} else {
			self.selection.extent()
		};
		let start = span.start;
		self.replace(span, "");
		self.selection = Range::point(start);
	}

	fn clamp(&self, range: StdRange<CharIdx>) -> StdRange<CharIdx> {
		let len = self.text.len_chars();
		let end = range.end.min(len);
		range.start.min(end)..end
	}
}

impl Default for RopeDocument {
	fn default() -> Self {
		Self::new("")
	}
}

impl Document for RopeDocument {
	fn len_chars(&self) -> CharLen {
		self.text.len_chars()
	}

	fn slice(&self, range: StdRange<CharIdx>) -> String {
		let range = self.clamp(range);
		self.text.slice(range).to_string()
	}

	fn replace(&mut self, range: StdRange<CharIdx>, text: &str) {
		let range = self.clamp(range);
		let start = range.start;
		if !range.is_empty() {
			self.text.remove(range.clone());
		}
		if !text.is_empty() {
			self.text.insert(start, text);
		}
		let inserted = text.chars().count();
		self.selection = self
			.selection
			.map(|pos| map_through_replace(pos, &range, inserted));
	}

	fn cursor(&self) -> CharIdx {
		self.selection.head
	}

	fn set_cursor(&mut self, pos: CharIdx) {
		self.selection = Range::point(pos.min(self.text.len_chars()));
	}

	fn line_range(&self, pos: CharIdx) -> StdRange<CharIdx> {
		let line = self.line_index(pos);
		let start = self.text.line_to_char(line);
		start..start + line_content_len(self.text.line(line))
	}

	fn line_index(&self, pos: CharIdx) -> usize {
		self.text.char_to_line(pos.min(self.text.len_chars()))
	}

	fn select(&mut self, range: Range) {
		self.selection = Range::new(range.min(), range.max()).clamp(self.text.len_chars());
	}

	fn newline(&self) -> &str {
		&self.newline
	}

	fn filetype(&self) -> &str {
		&self.filetype
	}

	fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	fn selected_text(&self) -> Option<String> {
		(!self.selection.is_empty()).then(|| self.slice(self.selection.extent()))
	}
}
