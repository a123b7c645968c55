use thiserror::Error;

use crate::syntax::SnippetParseError;

/// Errors reported by snippet operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnippetError {
	/// The body is not a valid snippet template.
	#[error("invalid snippet body: {0}")]
	Parse(#[from] SnippetParseError),
	/// The body rendered to an empty string.
	#[error("snippet body rendered to empty text")]
	EmptyRender,
	/// A navigation direction other than `+1` or `-1`.
	#[error("invalid direction {0}, expected 1 or -1")]
	InvalidDirection(i64),
}
