//! Stack of live snippet instances inserted into one document.
//!
//! Each expansion inside the focused tabstop of the innermost instance pushes
//! a nested instance linked to that tabstop. Jumping past the last stop of a
//! nested instance escalates to the next stop of its parent; jumping back
//! from its first stop returns to the tabstop that contained it.

use std::ops::Range as StdRange;

use stencil_primitives::{CharIdx, Document, Range, SeqDirection};

use crate::error::SnippetError;
use crate::instance::{OuterRef, SnippetInstance};
use crate::sync::{Write, cycle_choice, synchronize};
use crate::syntax::parse_snippet_template;
use crate::tree::{NodeKind, SnippetTree};
use crate::vars::SnippetVarResolver;

/// The focused tabstop of the innermost instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedNode {
	pub tabstop: u32,
	/// Absolute char range of the tabstop's authoritative occurrence.
	pub range: StdRange<CharIdx>,
}

/// Menu contents for a focused choice tabstop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetChoiceOverlay {
	pub tabstop: u32,
	pub range: StdRange<CharIdx>,
	pub options: Vec<String>,
	pub selected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JumpTarget {
	/// Another stop of the innermost instance, by order position.
	Within(usize),
	/// A stop of an enclosing instance; everything above it is abandoned.
	Outer { instance: usize, tabstop: u32 },
}

/// Snippet state for one document.
#[derive(Debug, Clone, Default)]
pub struct SnippetSession {
	stack: Vec<SnippetInstance>,
	guarded: bool,
}

impl SnippetSession {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_active(&self) -> bool {
		!self.stack.is_empty()
	}

	/// Number of stacked instances.
	pub fn depth(&self) -> usize {
		self.stack.len()
	}

	/// True when the innermost instance was not expanded inside another one.
	pub fn is_top_level(&self) -> bool {
		self.stack.last().is_some_and(|instance| instance.outer.is_none())
	}

	/// Suppresses edit notifications while focus moves.
	pub fn guard(&mut self) {
		self.guarded = true;
	}

	pub fn unguard(&mut self) {
		self.guarded = false;
	}

	pub fn is_guarded(&self) -> bool {
		self.guarded
	}

	pub fn current_node(&self) -> Option<FocusedNode> {
		let top = self.stack.last()?;
		Some(FocusedNode {
			tabstop: top.active_tabstop()?,
			range: top.focus_range()?,
		})
	}

	/// Inserts `body` at the cursor, replacing `prefix` when the text before
	/// the cursor ends with it.
	///
	/// Returns `Ok(true)` when the snippet became active and `Ok(false)` when
	/// it had no stop to navigate and was inserted as plain text. A body that
	/// fails to parse leaves the document untouched.
	pub fn expand<D>(
		&mut self,
		doc: &mut D,
		body: &str,
		prefix: Option<&str>,
		resolver: &dyn SnippetVarResolver,
	) -> Result<bool, SnippetError>
	where
		D: Document + ?Sized,
	{
		let template = parse_snippet_template(body)?;

		if self.is_active() {
			self.update(doc, None);
			let cursor = doc.cursor();
			let inside = self
				.current_node()
				.is_some_and(|node| node.range.start <= cursor && cursor <= node.range.end);
			if !inside {
				tracing::debug!(depth = self.stack.len(), "expansion outside focused tabstop, dropping session");
				self.stack.clear();
			}
		}

		if let Some(prefix) = prefix.filter(|prefix| !prefix.is_empty())
			&& doc.text_before_cursor().ends_with(prefix)
		{
			let cursor = doc.cursor();
			doc.replace(cursor - prefix.chars().count()..cursor, "");
		}

		let cursor = doc.cursor();
		let indent = doc.line_indent(cursor);
		let tree = SnippetTree::instantiate(&template, resolver, &indent);
		let outer = self.stack.len().checked_sub(1).and_then(|instance| {
			let tabstop = self.stack[instance].active_tabstop()?;
			Some(OuterRef { instance, tabstop })
		});

		let mut instance = SnippetInstance::new(tree, cursor, outer);
		let text = instance.text().to_string();
		let len = text.chars().count();
		// Stacked instances all contain the cursor, so their anchors hold.
		doc.replace(cursor..cursor, &text);
		instance.tail = doc.len_chars() - (cursor + len);

		if instance.order.is_empty() {
			doc.set_cursor(cursor + len);
			tracing::debug!(len, "snippet without tabstops inserted as text");
			return Ok(false);
		}

		self.stack.push(instance);
		self.focus_current(doc);
		tracing::debug!(depth = self.stack.len(), tabstop = ?self.current_node().map(|node| node.tabstop), "snippet expanded");
		Ok(true)
	}

	/// Whether `jump(direction)` would move focus.
	pub fn jumpable(&self, direction: SeqDirection) -> bool {
		self.jump_target(direction).is_some()
	}

	/// Moves focus to the next or previous stop, leaving nested instances as
	/// needed. Returns false when there is nowhere to go; the cursor is then
	/// put back on the current stop.
	pub fn jump<D>(&mut self, doc: &mut D, direction: SeqDirection) -> bool
	where
		D: Document + ?Sized,
	{
		let Some(top) = self.stack.len().checked_sub(1) else {
			return false;
		};
		let prefer = self.stack[top].active_tabstop();
		self.sync(doc, top, prefer);
		if self.stack.is_empty() {
			return false;
		}

		let Some(target) = self.jump_target(direction) else {
			self.focus_current(doc);
			return false;
		};

		match target {
			JumpTarget::Within(i) => {
				if let Some(top) = self.stack.last_mut() {
					top.active_i = i;
				}
			}
			JumpTarget::Outer { instance, tabstop } => {
				let outer = self.stack.get(instance + 1).and_then(|child| child.outer).map(|outer| outer.tabstop);
				self.stack.truncate(instance + 1);
				self.sync(doc, instance, outer);
				if self.stack.len() != instance + 1 {
					return false;
				}
				if !self.stack[instance].focus(tabstop) {
					tracing::warn!(tabstop, "jump target vanished during synchronization");
				}
			}
		}

		self.focus_current(doc);
		tracing::trace!(depth = self.stack.len(), tabstop = ?self.current_node().map(|node| node.tabstop), "jumped");
		true
	}

	fn jump_target(&self, direction: SeqDirection) -> Option<JumpTarget> {
		let top = self.stack.last()?;
		match direction {
			SeqDirection::Next if top.active_i + 1 < top.order.len() => Some(JumpTarget::Within(top.active_i + 1)),
			SeqDirection::Prev if top.active_i > 0 => Some(JumpTarget::Within(top.active_i - 1)),
			SeqDirection::Prev => top.outer.map(|outer| JumpTarget::Outer {
				instance: outer.instance,
				tabstop: outer.tabstop,
			}),
			SeqDirection::Next => {
				let mut child = top;
				while let Some(outer) = child.outer {
					let parent = self.stack.get(outer.instance)?;
					let at = parent
						.order
						.iter()
						.position(|index| *index == outer.tabstop)
						.unwrap_or(parent.active_i);
					if let Some(&tabstop) = parent.order.get(at + 1) {
						return Some(JumpTarget::Outer {
							instance: outer.instance,
							tabstop,
						});
					}
					child = parent;
				}
				None
			}
		}
	}

	/// Whether the focused stop is a choice.
	pub fn choosable(&self) -> bool {
		self.focused_choice().is_some()
	}

	/// Selects the next or previous option of the focused choice, wrapping
	/// around, and updates its mirrors.
	pub fn choice<D>(&mut self, doc: &mut D, direction: SeqDirection) -> bool
	where
		D: Document + ?Sized,
	{
		let Some(top) = self.stack.len().checked_sub(1) else {
			return false;
		};
		let prefer = self.stack[top].active_tabstop();
		self.sync(doc, top, prefer);
		if self.stack.len() != top + 1 {
			return false;
		}

		let Some(writes) = cycle_choice(&mut self.stack[top], direction) else {
			return false;
		};
		self.apply_writes(doc, top, &writes);
		self.verify(doc, top);
		self.focus_current(doc);
		true
	}

	/// Options of the focused choice, for a host menu.
	pub fn choice_overlay(&self) -> Option<SnippetChoiceOverlay> {
		let (tabstop, options, selected) = self.focused_choice()?;
		Some(SnippetChoiceOverlay {
			tabstop,
			range: self.current_node()?.range,
			options,
			selected,
		})
	}

	fn focused_choice(&self) -> Option<(u32, Vec<String>, usize)> {
		let top = self.stack.last()?;
		let tabstop = top.active_tabstop()?;
		match top.tree.kind(top.tree.authoritative(tabstop)?) {
			NodeKind::Choice { options, selected, .. } => Some((tabstop, options.clone(), *selected)),
			_ => None,
		}
	}

	/// Folds document edits into the stack.
	///
	/// With `Some(tabstop)` only the innermost instance is synchronized, and
	/// only while `tabstop` is still focused. With `None` every instance is
	/// synchronized from the innermost outwards.
	pub fn update<D>(&mut self, doc: &mut D, tabstop: Option<u32>)
	where
		D: Document + ?Sized,
	{
		let Some(top) = self.stack.len().checked_sub(1) else {
			return;
		};
		match tabstop {
			Some(index) => {
				if self.stack[top].active_tabstop() == Some(index) {
					self.sync(doc, top, Some(index));
				} else {
					tracing::trace!(tabstop = index, "stale update ignored");
				}
			}
			None => {
				for k in (0..=top).rev() {
					if k >= self.stack.len() {
						continue;
					}
					let prefer = match self.stack.get(k + 1) {
						Some(child) => child.outer.map(|outer| outer.tabstop),
						None => self.stack[k].active_tabstop(),
					};
					self.sync(doc, k, prefer);
				}
			}
		}
	}

	/// Leaves the innermost instance, and every enclosing one the cursor is
	/// no longer inside.
	pub fn drop<D>(&mut self, doc: &mut D)
	where
		D: Document + ?Sized,
	{
		self.update(doc, None);
		let Some(mut popped) = self.stack.pop() else {
			return;
		};

		let cursor = doc.cursor();
		let doc_len = doc.len_chars();
		while let Some(top) = self.stack.last() {
			let region = top.region(doc_len);
			if region.start <= cursor && cursor <= region.end {
				break;
			}
			if let Some(next) = self.stack.pop() {
				popped = next;
			}
		}

		let depth = self.stack.len();
		if let (Some(outer), Some(top)) = (popped.outer, self.stack.last_mut())
			&& outer.instance + 1 == depth
		{
			top.focus(outer.tabstop);
		}
		tracing::debug!(depth = self.stack.len(), "snippet dropped");
	}

	/// Synchronizes instance `k` with the document, writes its mirrors and
	/// pops it when nothing is left to navigate.
	fn sync<D>(&mut self, doc: &mut D, k: usize, prefer: Option<u32>)
	where
		D: Document + ?Sized,
	{
		let doc_len = doc.len_chars();
		let instance = &mut self.stack[k];
		let current = if instance.is_region_valid(doc_len) {
			doc.slice(instance.region(doc_len))
		} else {
			tracing::warn!(depth = k, "snippet region vanished, treating it as empty");
			instance.start = instance.start.min(doc_len);
			instance.tail = doc_len - instance.start;
			String::new()
		};

		let writes = synchronize(instance, &current, prefer);
		if !writes.is_empty() {
			tracing::trace!(depth = k, writes = writes.len(), "mirror writes");
		}
		self.apply_writes(doc, k, &writes);
		self.verify(doc, k);

		if self.stack[k].order.is_empty() {
			tracing::debug!(depth = k, "snippet has no stops left");
			self.stack.truncate(k);
		}
	}

	fn apply_writes<D>(&mut self, doc: &mut D, k: usize, writes: &[Write])
	where
		D: Document + ?Sized,
	{
		let start = self.stack[k].start;
		for write in writes {
			let range = start + write.range.start..start + write.range.end;
			self.replace(doc, range, &write.text, k);
		}
	}

	/// Rewrites the region of `k` when it disagrees with the rendered text.
	fn verify<D>(&mut self, doc: &mut D, k: usize)
	where
		D: Document + ?Sized,
	{
		let region = self.stack[k].region(doc.len_chars());
		if doc.slice(region.clone()) == self.stack[k].text() {
			return;
		}
		tracing::warn!(depth = k, "snippet region out of sync, rewriting it");
		let text = self.stack[k].text().to_string();
		doc.replace(region, &text);
		self.stack.truncate(k + 1);
	}

	/// Replaces `range` on behalf of instance `origin` and keeps every
	/// instance above it anchored.
	fn replace<D>(&mut self, doc: &mut D, range: StdRange<CharIdx>, text: &str, origin: usize)
	where
		D: Document + ?Sized,
	{
		let doc_len = doc.len_chars();
		doc.replace(range.clone(), text);
		let inserted = text.chars().count();
		for instance in self.stack.iter_mut().skip(origin + 1) {
			instance.on_external_write(&range, inserted, doc_len);
		}
	}

	fn focus_current<D>(&self, doc: &mut D)
	where
		D: Document + ?Sized,
	{
		let Some(node) = self.current_node() else {
			return;
		};
		if node.range.is_empty() {
			doc.set_cursor(node.range.start);
		} else {
			doc.select(Range::new(node.range.start, node.range.end));
		}
	}
}
