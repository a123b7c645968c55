//! Conversion between char offsets and line/character positions.
//!
//! Hosts report cursors and ranges as `(line, character)` pairs whose column
//! unit depends on the host: byte-addressed editors use UTF-8, protocol-style
//! hosts usually use UTF-16. The snippet engine works exclusively in chars,
//! so everything crossing the boundary goes through here.

use ropey::Rope;

use crate::range::CharIdx;
use crate::rope::line_content_len;

/// Column unit used by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OffsetEncoding {
	/// Columns count UTF-8 bytes.
	Utf8,
	/// Columns count UTF-16 code units.
	#[default]
	Utf16,
	/// Columns count Unicode scalar values.
	Utf32,
}

/// Zero-based line/character position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
	/// Zero-based line index.
	pub line: u32,
	/// Zero-based column in the host's [`OffsetEncoding`].
	pub character: u32,
}

impl Position {
	/// Creates a new position.
	pub const fn new(line: u32, character: u32) -> Self {
		Self { line, character }
	}
}

/// Half-open range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
	/// Start position (inclusive).
	pub start: Position,
	/// End position (exclusive).
	pub end: Position,
}

impl TextRange {
	/// Creates a new range.
	pub const fn new(start: Position, end: Position) -> Self {
		Self { start, end }
	}
}

/// Converts a position to a char index.
///
/// Returns `None` when the line does not exist. Columns past the end of the
/// line clamp to the line end (before its line terminator).
pub fn position_to_char(text: &Rope, pos: Position, encoding: OffsetEncoding) -> Option<CharIdx> {
	let line = pos.line as usize;
	if line >= text.len_lines() {
		return None;
	}

	let line_start = text.line_to_char(line);
	let line_slice = text.line(line);
	let content = line_slice.slice(..line_content_len(line_slice));
	let column = pos.character as usize;

	let offset = match encoding {
		OffsetEncoding::Utf8 => content.byte_to_char(column.min(content.len_bytes())),
		OffsetEncoding::Utf16 => content.utf16_cu_to_char(column.min(content.len_utf16_cu())),
		OffsetEncoding::Utf32 => column.min(content.len_chars()),
	};

	Some(line_start + offset)
}

/// Converts a char index to a position.
///
/// Returns `None` when the index lies past the end of the text.
pub fn char_to_position(text: &Rope, char_idx: CharIdx, encoding: OffsetEncoding) -> Option<Position> {
	if char_idx > text.len_chars() {
		return None;
	}

	let line = text.char_to_line(char_idx);
	let line_start = text.line_to_char(line);
	let before = text.slice(line_start..char_idx);

	let character = match encoding {
		OffsetEncoding::Utf8 => before.len_bytes(),
		OffsetEncoding::Utf16 => before.len_utf16_cu(),
		OffsetEncoding::Utf32 => before.len_chars(),
	};

	Some(Position {
		line: u32::try_from(line).ok()?,
		character: u32::try_from(character).ok()?,
	})
}

/// Converts a position range to a char span.
pub fn range_to_chars(text: &Rope, range: TextRange, encoding: OffsetEncoding) -> Option<std::ops::Range<CharIdx>> {
	let start = position_to_char(text, range.start, encoding)?;
	let end = position_to_char(text, range.end, encoding)?;
	Some(start..end)
}

/// Converts a char span to a position range.
pub fn chars_to_range(text: &Rope, span: std::ops::Range<CharIdx>, encoding: OffsetEncoding) -> Option<TextRange> {
	Some(TextRange {
		start: char_to_position(text, span.start, encoding)?,
		end: char_to_position(text, span.end, encoding)?,
	})
}
