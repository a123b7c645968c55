//! Folds document edits back into a snippet tree and plans mirror writes.
//!
//! The last synchronized text of an instance is diffed against the current
//! text of its region. The resulting single edit window is applied to the
//! deepest node containing it, indices are re-evaluated, and every mirror
//! whose text changed gets one replacement. Writes are returned in
//! descending position order so they can be applied without remapping.

use std::collections::{HashMap, HashSet};
use std::ops::Range as StdRange;

use stencil_primitives::SeqDirection;

use crate::instance::SnippetInstance;
use crate::tree::{Layout, NodeId, NodeKind, SnippetTree};

/// A replacement relative to the region start, in current document coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Write {
	pub range: StdRange<usize>,
	pub text: String,
}

/// Replacement of `from..to` in the old text by `inserted`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
	from: usize,
	to: usize,
	inserted: Vec<char>,
}

impl Edit {
	fn within(&self, range: &StdRange<usize>) -> bool {
		range.start <= self.from && self.to <= range.end
	}

	fn removed(&self) -> usize {
		self.to - self.from
	}
}

/// Where the edited target sat in the tree before the edit.
struct Anchor {
	target: NodeId,
	edit: Edit,
	rank: HashMap<NodeId, usize>,
	ancestors: HashSet<NodeId>,
	descendants: HashSet<NodeId>,
}

impl Anchor {
	fn capture(tree: &SnippetTree, target: NodeId, edit: Edit) -> Self {
		let rank = tree.pre_order().into_iter().enumerate().map(|(i, id)| (id, i)).collect::<HashMap<_, _>>();
		let ancestors = rank.keys().copied().filter(|id| tree.is_ancestor(*id, target)).collect();
		let descendants = rank.keys().copied().filter(|id| tree.is_ancestor(target, *id)).collect();
		Self {
			target,
			edit,
			rank,
			ancestors,
			descendants,
		}
	}

	/// Maps an old node range to where that node's text sits now.
	fn current(&self, id: NodeId, old: StdRange<usize>) -> StdRange<usize> {
		let removed = self.edit.removed();
		let inserted = self.edit.inserted.len();
		let shift = |pos: usize| pos + inserted - removed;

		if id == self.target || self.ancestors.contains(&id) {
			return old.start..shift(old.end);
		}
		let before = if self.descendants.contains(&id) {
			old.end <= self.edit.from
		} else {
			self.rank.get(&id) < self.rank.get(&self.target)
		};
		if before { old } else { shift(old.start)..shift(old.end) }
	}
}

/// Synchronizes `instance` with `current`, the text now covering its region.
///
/// `prefer` names the tabstop the user is editing; it wins ties when the edit
/// window sits on a boundary between nodes.
pub(crate) fn synchronize(instance: &mut SnippetInstance, current: &str, prefer: Option<u32>) -> Vec<Write> {
	if instance.layout.text == current {
		return Vec::new();
	}

	let old: Vec<char> = instance.layout.text.chars().collect();
	let new: Vec<char> = current.chars().collect();
	let mut edit = diff(&old, &new);

	let preferred = prefer.and_then(|index| instance.tree.authoritative(index));
	if let Some(range) = preferred.and_then(|id| instance.layout.range(id)) {
		slide_into(&mut edit, &old, &range);
	}

	let target = locate(&instance.tree, &instance.layout, &edit, preferred);
	tracing::trace!(from = edit.from, to = edit.to, inserted = edit.inserted.len(), kind = ?instance.tree.kind(target), "snippet edit");

	let anchor = Anchor::capture(&instance.tree, target, edit);
	let redirected = apply(&mut instance.tree, &instance.layout, &anchor, &old);
	refresh(instance, Some(&anchor), redirected)
}

/// Cycles the focused choice and returns the writes that show it.
pub(crate) fn cycle_choice(instance: &mut SnippetInstance, direction: SeqDirection) -> Option<Vec<Write>> {
	let id = instance.tree.authoritative(instance.active_tabstop()?)?;
	let NodeKind::Choice {
		options, selected, custom, ..
	} = instance.tree.kind_mut(id)
	else {
		return None;
	};
	if options.is_empty() {
		return None;
	}
	let len = options.len() as isize;
	*selected = (*selected as isize + direction.step()).rem_euclid(len) as usize;
	*custom = None;
	Some(refresh(instance, None, Some(id)))
}

/// Re-evaluates values and layout after a tree edit and plans the writes.
fn refresh(instance: &mut SnippetInstance, anchor: Option<&Anchor>, extra: Option<NodeId>) -> Vec<Write> {
	let previous_focus = instance.active_tabstop();
	let values = instance.tree.compute_values(&instance.values);
	let layout = instance.tree.layout(&values);
	let old = &instance.layout;

	let mut dirty: Vec<NodeId> = instance
		.tree
		.mirrors()
		.into_iter()
		.filter(|id| anchor.is_none_or(|anchor| anchor.target != *id))
		.collect();
	dirty.extend(extra);
	dirty.retain(|id| old.range(*id).is_some() && old.node_text(*id) != layout.node_text(*id));
	dirty.dedup();

	let mut writes: Vec<Write> = dirty
		.into_iter()
		.filter_map(|id| {
			let range = old.range(id)?;
			let range = match anchor {
				Some(anchor) => anchor.current(id, range),
				None => range,
			};
			Some(Write {
				range,
				text: layout.node_text(id),
			})
		})
		.collect();
	writes.sort_by(|a, b| b.range.start.cmp(&a.range.start));

	instance.values = values;
	instance.layout = layout;
	instance.order = instance.tree.order();
	instance.refocus(previous_focus);
	writes
}

fn diff(old: &[char], new: &[char]) -> Edit {
	let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
	let max_suffix = old.len().min(new.len()) - prefix;
	let suffix = old
		.iter()
		.rev()
		.zip(new.iter().rev())
		.take(max_suffix)
		.take_while(|(a, b)| a == b)
		.count();
	Edit {
		from: prefix,
		to: old.len() - suffix,
		inserted: new[prefix..new.len() - suffix].to_vec(),
	}
}

/// Shifts a pure insertion or deletion left while that describes the same
/// change, until it lies inside `range`. Diffing favors the rightmost
/// position, which is wrong when the user typed a repeated char at the end
/// of a field followed by the same char.
fn slide_into(edit: &mut Edit, old: &[char], range: &StdRange<usize>) {
	if edit.within(range) {
		return;
	}
	let mut candidate = edit.clone();
	while candidate.from > 0 {
		let before = old[candidate.from - 1];
		if candidate.inserted.is_empty() && candidate.from < candidate.to {
			if old[candidate.to - 1] != before {
				return;
			}
		} else if candidate.from == candidate.to {
			match candidate.inserted.last() {
				Some(last) if *last == before => {
					candidate.inserted.pop();
					candidate.inserted.insert(0, before);
				}
				_ => return,
			}
		} else {
			return;
		}
		candidate.from -= 1;
		candidate.to -= 1;
		if candidate.within(range) {
			*edit = candidate;
			return;
		}
	}
}

/// Finds the deepest node containing the edit window.
fn locate(tree: &SnippetTree, layout: &Layout, edit: &Edit, preferred: Option<NodeId>) -> NodeId {
	let mut node = tree.root();
	loop {
		if tree.is_leaf(node) {
			return node;
		}
		let best = tree
			.children(node)
			.iter()
			.copied()
			.filter(|child| layout.range(*child).is_some_and(|range| edit.within(&range)))
			.min_by_key(|child| rank(tree, *child, preferred));
		match best {
			Some(child) => node = child,
			None => return node,
		}
	}
}

fn rank(tree: &SnippetTree, id: NodeId, preferred: Option<NodeId>) -> u8 {
	if preferred.is_some_and(|focus| focus == id || tree.is_ancestor(id, focus)) {
		return 0;
	}
	match tree.kind(id) {
		NodeKind::Tabstop { .. } | NodeKind::Choice { .. } => 1,
		NodeKind::Var { .. } => 2,
		NodeKind::Text(_) => 3,
		NodeKind::Mirror { .. } => 4,
		NodeKind::Root => 5,
	}
}

/// Applies the edit to the target node. Returns the authoritative node an
/// edited mirror was redirected to.
fn apply(tree: &mut SnippetTree, layout: &Layout, anchor: &Anchor, old: &[char]) -> Option<NodeId> {
	let target = anchor.target;
	let edit = &anchor.edit;
	let range = layout.range(target)?;
	let local = edit.from - range.start..edit.to - range.start;
	let inserted: String = edit.inserted.iter().collect();
	let display: String = old[range.clone()].iter().collect();
	let spliced = splice(&display, &local, &inserted);

	match tree.kind(target).clone() {
		NodeKind::Text(_) => *tree.kind_mut(target) = NodeKind::Text(spliced),
		NodeKind::Var { name, value: Some(_) } => {
			*tree.kind_mut(target) = NodeKind::Var {
				name,
				value: Some(spliced),
			}
		}
		NodeKind::Choice { .. } => set_choice_display(tree, target, spliced),
		NodeKind::Mirror { index } => match tree.authoritative(index) {
			Some(auth) if !tree.is_ancestor(auth, target) => {
				set_field_text(tree, auth, spliced);
				return Some(auth);
			}
			_ => *tree.kind_mut(target) = NodeKind::Text(spliced),
		},
		NodeKind::Tabstop { .. } if tree.children(target).is_empty() => {
			let text = tree.alloc(NodeKind::Text(spliced));
			tree.set_children(target, vec![text]);
		}
		NodeKind::Root | NodeKind::Tabstop { .. } | NodeKind::Var { value: None, .. } => {
			collapse(tree, layout, target, edit, old);
		}
	}
	None
}

/// Replaces the children of `container` touched by the edit with one text node.
fn collapse(tree: &mut SnippetTree, layout: &Layout, container: NodeId, edit: &Edit, old: &[char]) {
	let mut children = tree.children(container).to_vec();
	let touched = |range: &StdRange<usize>| {
		(range.start < edit.to && range.end > edit.from) || (edit.from <= range.start && range.end <= edit.to)
	};
	let run: Vec<usize> = children
		.iter()
		.enumerate()
		.filter(|(_, child)| layout.range(**child).is_some_and(|range| touched(&range)))
		.map(|(i, _)| i)
		.collect();

	let (span, slots) = match (run.first(), run.last()) {
		(Some(&first), Some(&last)) => {
			let start = layout.range(children[first]).map_or(edit.from, |range| range.start.min(edit.from));
			let end = layout.range(children[last]).map_or(edit.to, |range| range.end.max(edit.to));
			(start..end, first..last + 1)
		}
		_ => {
			let at = children
				.iter()
				.position(|child| layout.range(*child).is_some_and(|range| range.start >= edit.to))
				.unwrap_or(children.len());
			(edit.from..edit.to, at..at)
		}
	};

	let mut text: String = old[span.start..edit.from].iter().collect();
	text.extend(edit.inserted.iter());
	text.extend(old[edit.to..span.end].iter());

	let removed = slots.len();
	let node = tree.alloc(NodeKind::Text(text));
	children.splice(slots, [node]);
	tracing::debug!(removed, "collapsed snippet nodes into text");
	tree.set_children(container, children);
}

fn set_field_text(tree: &mut SnippetTree, id: NodeId, value: String) {
	if matches!(tree.kind(id), NodeKind::Choice { .. }) {
		set_choice_display(tree, id, value);
	} else {
		let text = tree.alloc(NodeKind::Text(value));
		tree.set_children(id, vec![text]);
	}
}

fn set_choice_display(tree: &mut SnippetTree, id: NodeId, display: String) {
	if let NodeKind::Choice {
		options, selected, custom, ..
	} = tree.kind_mut(id)
	{
		match options.iter().position(|option| *option == display) {
			Some(i) => {
				*selected = i;
				*custom = None;
			}
			None => *custom = Some(display),
		}
	}
}

fn splice(text: &str, range: &StdRange<usize>, inserted: &str) -> String {
	let mut out: String = text.chars().take(range.start).collect();
	out.push_str(inserted);
	out.extend(text.chars().skip(range.end));
	out
}

#[cfg(test)]
mod tests;
