use std::collections::HashMap;
use std::ops::Range as StdRange;

use stencil_primitives::{CharIdx, CharLen};

use crate::tree::{Layout, SnippetTree};

/// Link from a nested instance to the field of its parent it was expanded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OuterRef {
	/// Stack index of the parent instance.
	pub instance: usize,
	/// Tabstop of the parent containing this instance.
	pub tabstop: u32,
}

/// A snippet inserted into a document.
///
/// The region is anchored by its start and by its distance to the document
/// end, so edits inside it grow or shrink it without bookkeeping.
#[derive(Debug, Clone)]
pub(crate) struct SnippetInstance {
	pub tree: SnippetTree,
	pub values: HashMap<u32, String>,
	/// Last synchronized text and node ranges, relative to `start`.
	pub layout: Layout,
	pub order: Vec<u32>,
	pub active_i: usize,
	pub start: CharIdx,
	pub tail: CharLen,
	pub outer: Option<OuterRef>,
}

impl SnippetInstance {
	pub fn new(tree: SnippetTree, start: CharIdx, outer: Option<OuterRef>) -> Self {
		let values = tree.compute_values(&HashMap::new());
		let layout = tree.layout(&values);
		let order = tree.order();
		Self {
			tree,
			values,
			layout,
			order,
			active_i: 0,
			start,
			tail: 0,
			outer,
		}
	}

	pub fn text(&self) -> &str {
		&self.layout.text
	}

	pub fn region(&self, doc_len: CharLen) -> StdRange<CharIdx> {
		self.start..doc_len.saturating_sub(self.tail).max(self.start)
	}

	/// False once edits outside the instance consumed part of its anchors.
	pub fn is_region_valid(&self, doc_len: CharLen) -> bool {
		self.start + self.tail <= doc_len
	}

	pub fn active_tabstop(&self) -> Option<u32> {
		self.order.get(self.active_i).copied()
	}

	/// Absolute range of the authoritative node of `index`.
	pub fn tabstop_range(&self, index: u32) -> Option<StdRange<CharIdx>> {
		let id = self.tree.authoritative(index)?;
		let range = self.layout.range(id)?;
		Some(self.start + range.start..self.start + range.end)
	}

	pub fn focus_range(&self) -> Option<StdRange<CharIdx>> {
		self.tabstop_range(self.active_tabstop()?)
	}

	/// Focuses `index` if it is still navigable.
	pub fn focus(&mut self, index: u32) -> bool {
		match self.order.iter().position(|candidate| *candidate == index) {
			Some(i) => {
				self.active_i = i;
				true
			}
			None => false,
		}
	}

	/// Keeps focus on `previous` when it survived a re-order, else clamps.
	pub fn refocus(&mut self, previous: Option<u32>) {
		if previous.is_some_and(|index| self.focus(index)) {
			return;
		}
		self.active_i = self.active_i.min(self.order.len().saturating_sub(1));
	}

	/// Adjusts anchors for a write that did not originate from this instance.
	///
	/// Writes ending at or before the region shift it, writes starting at or
	/// after its end change the tail, and writes inside it are picked up by
	/// the next synchronization.
	pub fn on_external_write(&mut self, range: &StdRange<CharIdx>, inserted: CharLen, doc_len_before: CharLen) {
		let region = self.region(doc_len_before);
		let removed = range.end - range.start;
		if range.end <= region.start {
			self.start = self.start + inserted - removed;
		} else if range.start >= region.end {
			self.tail = self.tail + inserted - removed;
		} else if range.start < region.start || range.end > region.end {
			tracing::warn!(start = region.start, end = region.end, "write straddles snippet region");
		}
	}
}
