//! Rope utilities and extensions.

use ropey::RopeSlice;

use crate::range::CharLen;

/// Returns the number of chars in a line slice, excluding its line ending.
///
/// Both `\n` and `\r\n` endings are stripped.
pub fn line_content_len(line: RopeSlice) -> CharLen {
	let mut len = line.len_chars();
	if len > 0 && line.char(len - 1) == '\n' {
		len -= 1;
		if len > 0 && line.char(len - 1) == '\r' {
			len -= 1;
		}
	}
	len
}

/// Returns the leading run of spaces and tabs of `line`.
pub fn leading_whitespace(line: &str) -> &str {
	let end = line.find(|ch: char| ch != ' ' && ch != '\t').unwrap_or(line.len());
	&line[..end]
}
