//! Snippet engine.
//!
//! Bodies are parsed into a [`SnippetTemplate`], instantiated into an arena
//! [`SnippetTree`] and inserted into a [`Document`](stencil_primitives::Document)
//! by a [`SnippetSession`], which then keeps mirrors consistent with user edits
//! and moves focus between tabstops across nested expansions.

mod error;
mod instance;
mod render;
mod session;
mod sync;
mod syntax;
mod tree;
mod vars;

pub use error::SnippetError;
pub use render::{RenderedSnippet, render, render_with_resolver};
pub use session::{FocusedNode, SnippetChoiceOverlay, SnippetSession};
pub use syntax::{Field, FieldKind, Node, SnippetParseError, SnippetTemplate, Var, parse_snippet_template};
pub use tree::{NodeId, NodeKind, SnippetTree};
pub use vars::{MapResolver, ScopedResolver, SnippetVarResolver, VarCallback, VarContext, VarRegistry};

/// A snippet body as supplied by snippet files or callers: one string or a
/// sequence of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetBody {
	Text(String),
	Lines(Vec<String>),
}

impl SnippetBody {
	/// Joins the body into a single template string using `newline`.
	pub fn join(&self, newline: &str) -> String {
		match self {
			Self::Text(text) => text.clone(),
			Self::Lines(lines) => lines.join(newline),
		}
	}
}

impl From<&str> for SnippetBody {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl From<String> for SnippetBody {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<Vec<String>> for SnippetBody {
	fn from(lines: Vec<String>) -> Self {
		Self::Lines(lines)
	}
}

impl From<&[&str]> for SnippetBody {
	fn from(lines: &[&str]) -> Self {
		Self::Lines(lines.iter().map(|line| line.to_string()).collect())
	}
}

impl<const N: usize> From<[&str; N]> for SnippetBody {
	fn from(lines: [&str; N]) -> Self {
		Self::Lines(lines.iter().map(|line| line.to_string()).collect())
	}
}
