//! Snippet template parser.
//!
//! Supported syntax:
//! * `$n`, `${n}`: tabstops
//! * `${n:default}`: placeholders with nested content
//! * `${n|a,b,c|}`: choices
//! * `$NAME`, `${NAME}`, `${NAME:default}`: variables
//! * `\$`, `\}`, `\\`: escapes
//!
//! A tabstop or choice whose index was already declared earlier in the body
//! (pre-order) parses as [`FieldKind::Mirror`]; its own default is discarded.

use std::collections::HashSet;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetTemplate {
	pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	Text(String),
	Field(Field),
	Var(Var),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
	pub index: u32,
	pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
	Tabstop,
	Placeholder(Vec<Node>),
	Choice(Vec<String>),
	/// Non-authoritative occurrence of an index declared earlier.
	Mirror,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
	pub name: String,
	pub default: Option<Vec<Node>>,
}

/// Malformed snippet syntax. Offsets are char offsets into the body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnippetParseError {
	#[error("unterminated placeholder starting at {offset}")]
	Unterminated { offset: usize },
	#[error("tabstop index at {offset} is out of range")]
	InvalidIndex { offset: usize },
	#[error("unexpected {found:?} at {offset}")]
	UnexpectedChar { offset: usize, found: char },
	#[error("choice at {offset} has no options")]
	EmptyChoice { offset: usize },
}

pub fn parse_snippet_template(input: &str) -> Result<SnippetTemplate, SnippetParseError> {
	let mut parser = Parser {
		chars: input.chars().collect(),
		pos: 0,
		declared: HashSet::new(),
	};
	let nodes = parser.parse_nodes(None)?;
	Ok(SnippetTemplate { nodes })
}

struct Parser {
	chars: Vec<char>,
	pos: usize,
	declared: HashSet<u32>,
}

impl Parser {
	fn peek(&self) -> Option<char> {
		self.chars.get(self.pos).copied()
	}

	fn peek_at(&self, offset: usize) -> Option<char> {
		self.chars.get(self.pos + offset).copied()
	}

	/// Parses a node sequence. Inside a braced construct (`open` is the offset
	/// of its `$`) the sequence ends before an unescaped `}`; at top level `}`
	/// is plain text.
	fn parse_nodes(&mut self, open: Option<usize>) -> Result<Vec<Node>, SnippetParseError> {
		let mut nodes = Vec::new();
		let mut text = String::new();

		loop {
			let Some(ch) = self.peek() else {
				if let Some(offset) = open {
					return Err(SnippetParseError::Unterminated { offset });
				}
				break;
			};

			match ch {
				'}' if open.is_some() => break,
				'\\' => {
					match self.peek_at(1) {
						Some(escaped @ ('$' | '}' | '\\')) => {
							text.push(escaped);
							self.pos += 2;
						}
						_ => {
							text.push('\\');
							self.pos += 1;
						}
					}
				}
				'$' => match self.parse_dollar()? {
					Some(node) => {
						flush_text(&mut nodes, &mut text);
						nodes.push(node);
					}
					None => {
						text.push('$');
						self.pos += 1;
					}
				},
				_ => {
					text.push(ch);
					self.pos += 1;
				}
			}
		}

		flush_text(&mut nodes, &mut text);
		Ok(nodes)
	}

	/// Parses the construct starting at the `$` under the cursor, or returns
	/// `None` (without consuming) when the `$` is literal.
	fn parse_dollar(&mut self) -> Result<Option<Node>, SnippetParseError> {
		let open = self.pos;
		match self.peek_at(1) {
			Some(ch) if ch.is_ascii_digit() => {
				self.pos += 1;
				let index = self.parse_index()?;
				Ok(Some(self.bare_field(index)))
			}
			Some(ch) if is_name_start(ch) => {
				self.pos += 1;
				let name = self.parse_name();
				Ok(Some(Node::Var(Var { name, default: None })))
			}
			Some('{') => {
				self.pos += 2;
				self.parse_braced(open).map(Some)
			}
			_ => Ok(None),
		}
	}

	fn parse_braced(&mut self, open: usize) -> Result<Node, SnippetParseError> {
		match self.peek() {
			None => Err(SnippetParseError::Unterminated { offset: open }),
			Some(ch) if ch.is_ascii_digit() => {
				let index = self.parse_index()?;
				match self.peek() {
					None => Err(SnippetParseError::Unterminated { offset: open }),
					Some('}') => {
						self.pos += 1;
						Ok(self.bare_field(index))
					}
					Some(':') => {
						self.pos += 1;
						self.parse_placeholder(index, open)
					}
					Some('|') => {
						self.pos += 1;
						self.parse_choice(index, open)
					}
					Some(found) => Err(SnippetParseError::UnexpectedChar { offset: self.pos, found }),
				}
			}
			Some(ch) if is_name_start(ch) => {
				let name = self.parse_name();
				match self.peek() {
					None => Err(SnippetParseError::Unterminated { offset: open }),
					Some('}') => {
						self.pos += 1;
						Ok(Node::Var(Var { name, default: None }))
					}
					Some(':') => {
						self.pos += 1;
						let default = self.parse_nodes(Some(open))?;
						self.pos += 1;
						Ok(Node::Var(Var {
							name,
							default: Some(default),
						}))
					}
					Some(found) => Err(SnippetParseError::UnexpectedChar { offset: self.pos, found }),
				}
			}
			Some(found) => Err(SnippetParseError::UnexpectedChar { offset: self.pos, found }),
		}
	}

	fn parse_placeholder(&mut self, index: u32, open: usize) -> Result<Node, SnippetParseError> {
		if self.declared.insert(index) {
			let children = self.parse_nodes(Some(open))?;
			self.pos += 1;
			return Ok(Node::Field(Field {
				index,
				kind: FieldKind::Placeholder(children),
			}));
		}

		// Declarations inside a discarded default must not shadow later ones.
		let snapshot = self.declared.clone();
		self.parse_nodes(Some(open))?;
		self.pos += 1;
		self.declared = snapshot;
		Ok(Node::Field(Field {
			index,
			kind: FieldKind::Mirror,
		}))
	}

	fn parse_choice(&mut self, index: u32, open: usize) -> Result<Node, SnippetParseError> {
		let mut options = Vec::new();
		let mut current = String::new();

		loop {
			let Some(ch) = self.peek() else {
				return Err(SnippetParseError::Unterminated { offset: open });
			};
			match ch {
				'\\' => match self.peek_at(1) {
					Some(escaped @ (',' | '|' | '\\')) => {
						current.push(escaped);
						self.pos += 2;
					}
					_ => {
						current.push('\\');
						self.pos += 1;
					}
				},
				',' => {
					options.push(std::mem::take(&mut current));
					self.pos += 1;
				}
				'|' if self.peek_at(1) == Some('}') => {
					options.push(current);
					self.pos += 2;
					break;
				}
				_ => {
					current.push(ch);
					self.pos += 1;
				}
			}
		}

		if options.len() == 1 && options[0].is_empty() {
			return Err(SnippetParseError::EmptyChoice { offset: open });
		}

		let kind = if self.declared.insert(index) {
			FieldKind::Choice(options)
		} else {
			FieldKind::Mirror
		};
		Ok(Node::Field(Field { index, kind }))
	}

	fn bare_field(&mut self, index: u32) -> Node {
		let kind = if self.declared.insert(index) {
			FieldKind::Tabstop
		} else {
			FieldKind::Mirror
		};
		Node::Field(Field { index, kind })
	}

	fn parse_index(&mut self) -> Result<u32, SnippetParseError> {
		let start = self.pos;
		while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
			self.pos += 1;
		}
		let digits: String = self.chars[start..self.pos].iter().collect();
		digits
			.parse::<u32>()
			.map_err(|_| SnippetParseError::InvalidIndex { offset: start })
	}

	fn parse_name(&mut self) -> String {
		let start = self.pos;
		while self.peek().is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
			self.pos += 1;
		}
		self.chars[start..self.pos].iter().collect()
	}
}

fn is_name_start(ch: char) -> bool {
	ch.is_ascii_alphabetic() || ch == '_'
}

fn flush_text(nodes: &mut Vec<Node>, text: &mut String) {
	if !text.is_empty() {
		nodes.push(Node::Text(std::mem::take(text)));
	}
}
