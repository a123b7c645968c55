//! Arena tree of a live snippet.
//!
//! Nodes are addressed by [`NodeId`] and never move. Mirrors hold only the
//! index they reference; the text of every index is derived from its single
//! authoritative node (the first tabstop or choice with that index in
//! pre-order) and cached per synchronization.

use std::collections::{HashMap, HashSet};
use std::ops::Range as StdRange;

use crate::syntax::{FieldKind, Node, SnippetTemplate};
use crate::vars::SnippetVarResolver;

/// Stable handle to a node of a [`SnippetTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	Root,
	Text(String),
	/// Authoritative tabstop; its value is the text of its children.
	Tabstop { index: u32 },
	Choice {
		index: u32,
		options: Vec<String>,
		selected: usize,
		/// Free text typed over the options, if any.
		custom: Option<String>,
	},
	Mirror { index: u32 },
	/// `value` is set once resolved; otherwise the children hold the default.
	Var { name: String, value: Option<String> },
}

impl NodeKind {
	/// Index of an authoritative tabstop or choice.
	pub fn declared_index(&self) -> Option<u32> {
		match self {
			Self::Tabstop { index } | Self::Choice { index, .. } => Some(*index),
			_ => None,
		}
	}
}

#[derive(Debug, Clone)]
struct TreeNode {
	kind: NodeKind,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct SnippetTree {
	nodes: Vec<TreeNode>,
}

/// Rendered text of a tree plus the char range of every reachable node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Layout {
	pub text: String,
	pub len: usize,
	ranges: Vec<Option<StdRange<usize>>>,
}

impl Layout {
	pub fn range(&self, id: NodeId) -> Option<StdRange<usize>> {
		self.ranges.get(id.0).cloned().flatten()
	}

	/// Text covered by `id` in this layout.
	pub fn node_text(&self, id: NodeId) -> String {
		self.range(id)
			.map(|range| self.text.chars().skip(range.start).take(range.len()).collect())
			.unwrap_or_default()
	}
}

pub(crate) const ROOT: NodeId = NodeId(0);

impl SnippetTree {
	/// Builds the tree for `template`, resolving variables and baking `indent`
	/// after every newline of template text and variable values.
	pub fn instantiate(template: &SnippetTemplate, resolver: &dyn SnippetVarResolver, indent: &str) -> Self {
		let mut tree = Self {
			nodes: vec![TreeNode {
				kind: NodeKind::Root,
				parent: None,
				children: Vec::new(),
			}],
		};
		tree.build(ROOT, &template.nodes, indent);
		tree.resolve_vars(resolver, indent);
		tree
	}

	fn build(&mut self, parent: NodeId, nodes: &[Node], indent: &str) {
		for node in nodes {
			match node {
				Node::Text(text) => {
					self.push(parent, NodeKind::Text(indent_text(text, indent)));
				}
				Node::Field(field) => match &field.kind {
					FieldKind::Tabstop => {
						self.push(parent, NodeKind::Tabstop { index: field.index });
					}
					FieldKind::Placeholder(children) => {
						let id = self.push(parent, NodeKind::Tabstop { index: field.index });
						self.build(id, children, indent);
					}
					FieldKind::Choice(options) => {
						self.push(
							parent,
							NodeKind::Choice {
								index: field.index,
								options: options.iter().map(|option| indent_text(option, indent)).collect(),
								selected: 0,
								custom: None,
							},
						);
					}
					FieldKind::Mirror => {
						self.push(parent, NodeKind::Mirror { index: field.index });
					}
				},
				Node::Var(var) => {
					let id = self.push(
						parent,
						NodeKind::Var {
							name: var.name.clone(),
							value: None,
						},
					);
					if let Some(default) = &var.default {
						self.build(id, default, indent);
					}
				}
			}
		}
	}

	/// Resolves variables innermost first so an outer default sees resolved
	/// inner values. A resolved variable drops its default children.
	fn resolve_vars(&mut self, resolver: &dyn SnippetVarResolver, indent: &str) {
		let vars: Vec<NodeId> = self
			.post_order()
			.into_iter()
			.filter(|id| matches!(self.kind(*id), NodeKind::Var { .. }))
			.collect();

		for id in vars {
			if !self.is_reachable(id) {
				continue;
			}
			let NodeKind::Var { name, .. } = self.kind(id) else {
				continue;
			};
			let name = name.clone();
			let values = self.compute_values(&HashMap::new());
			let default = self.display(id, &values);
			let Some(value) = resolver.resolve_var(&name, &default).filter(|value| !value.is_empty()) else {
				tracing::trace!(var = %name, "snippet variable unresolved, using default");
				continue;
			};
			self.set_children(id, Vec::new());
			self.nodes[id.0].kind = NodeKind::Var {
				name,
				value: Some(indent_text(&value, indent)),
			};
		}
	}

	pub fn root(&self) -> NodeId {
		ROOT
	}

	pub fn kind(&self, id: NodeId) -> &NodeKind {
		&self.nodes[id.0].kind
	}

	pub(crate) fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
		&mut self.nodes[id.0].kind
	}

	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.nodes[id.0].parent
	}

	pub fn children(&self, id: NodeId) -> &[NodeId] {
		&self.nodes[id.0].children
	}

	/// Appends a new node under `parent`.
	pub(crate) fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
		let id = self.alloc(kind);
		self.nodes[id.0].parent = Some(parent);
		self.nodes[parent.0].children.push(id);
		id
	}

	/// Allocates a detached node.
	pub(crate) fn alloc(&mut self, kind: NodeKind) -> NodeId {
		let id = NodeId(self.nodes.len());
		self.nodes.push(TreeNode {
			kind,
			parent: None,
			children: Vec::new(),
		});
		id
	}

	/// Replaces the children of `id`. Previous children become unreachable.
	pub(crate) fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
		for old in std::mem::take(&mut self.nodes[id.0].children) {
			self.nodes[old.0].parent = None;
		}
		for child in &children {
			self.nodes[child.0].parent = Some(id);
		}
		self.nodes[id.0].children = children;
	}

	pub fn is_reachable(&self, id: NodeId) -> bool {
		let mut current = id;
		loop {
			if current == ROOT {
				return true;
			}
			match self.parent(current) {
				Some(parent) => current = parent,
				None => return false,
			}
		}
	}

	/// Returns true when `ancestor` is a proper ancestor of `id`.
	pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
		let mut current = self.parent(id);
		while let Some(node) = current {
			if node == ancestor {
				return true;
			}
			current = self.parent(node);
		}
		false
	}

	/// Reachable nodes in pre-order, root first.
	pub fn pre_order(&self) -> Vec<NodeId> {
		let mut out = Vec::with_capacity(self.nodes.len());
		let mut stack = vec![ROOT];
		while let Some(id) = stack.pop() {
			out.push(id);
			stack.extend(self.children(id).iter().rev().copied());
		}
		out
	}

	fn post_order(&self) -> Vec<NodeId> {
		fn walk(tree: &SnippetTree, id: NodeId, out: &mut Vec<NodeId>) {
			for child in tree.children(id) {
				walk(tree, *child, out);
			}
			out.push(id);
		}
		let mut out = Vec::with_capacity(self.nodes.len());
		walk(self, ROOT, &mut out);
		out
	}

	/// The authoritative node for `index`, if still reachable.
	pub fn authoritative(&self, index: u32) -> Option<NodeId> {
		self.pre_order()
			.into_iter()
			.find(|id| self.kind(*id).declared_index() == Some(index))
	}

	/// Reachable mirror nodes in pre-order.
	pub fn mirrors(&self) -> Vec<NodeId> {
		self.pre_order()
			.into_iter()
			.filter(|id| matches!(self.kind(*id), NodeKind::Mirror { .. }))
			.collect()
	}

	/// Navigation order: declared indices ascending, `0` last.
	pub fn order(&self) -> Vec<u32> {
		let mut indices: Vec<u32> = self.pre_order().into_iter().filter_map(|id| self.kind(id).declared_index()).collect();
		indices.sort_unstable();
		indices.dedup();
		if indices.first() == Some(&0) {
			indices.remove(0);
			indices.push(0);
		}
		indices
	}

	/// Computes the text of every index.
	///
	/// Indices whose declaration disappeared keep their `previous` value so the
	/// mirrors still referencing them stay stable.
	pub(crate) fn compute_values(&self, previous: &HashMap<u32, String>) -> HashMap<u32, String> {
		let mut values = HashMap::new();
		let mut active = HashSet::new();
		for index in self.order() {
			self.value_of(index, previous, &mut values, &mut active);
		}
		for (index, value) in previous {
			values.entry(*index).or_insert_with(|| value.clone());
		}
		values
	}

	fn value_of(&self, index: u32, previous: &HashMap<u32, String>, values: &mut HashMap<u32, String>, active: &mut HashSet<u32>) -> String {
		if let Some(value) = values.get(&index) {
			return value.clone();
		}
		// Cycle: a mirror inside the field it references.
		if !active.insert(index) {
			return String::new();
		}
		let value = match self.authoritative(index) {
			Some(id) => self.evaluate(id, previous, values, active),
			None => previous.get(&index).cloned().unwrap_or_default(),
		};
		active.remove(&index);
		values.insert(index, value.clone());
		value
	}

	fn evaluate(&self, id: NodeId, previous: &HashMap<u32, String>, values: &mut HashMap<u32, String>, active: &mut HashSet<u32>) -> String {
		match self.kind(id) {
			NodeKind::Text(text) => text.clone(),
			NodeKind::Var { value: Some(value), .. } => value.clone(),
			NodeKind::Choice { .. } => self.choice_text(id),
			NodeKind::Mirror { index } => self.value_of(*index, previous, values, active),
			NodeKind::Root | NodeKind::Tabstop { .. } | NodeKind::Var { value: None, .. } => self
				.children(id)
				.iter()
				.map(|child| self.evaluate(*child, previous, values, active))
				.collect(),
		}
	}

	/// Text a choice currently shows.
	pub fn choice_text(&self, id: NodeId) -> String {
		match self.kind(id) {
			NodeKind::Choice {
				options, selected, custom, ..
			} => custom
				.clone()
				.or_else(|| options.get(*selected).cloned())
				.unwrap_or_default(),
			_ => String::new(),
		}
	}

	/// Returns true for a mirror nested inside the field it references.
	fn is_self_mirror(&self, id: NodeId, index: u32) -> bool {
		self.authoritative(index).is_some_and(|auth| self.is_ancestor(auth, id))
	}

	/// Text of `id` given the per-index `values`.
	pub(crate) fn display(&self, id: NodeId, values: &HashMap<u32, String>) -> String {
		match self.kind(id) {
			NodeKind::Text(text) => text.clone(),
			NodeKind::Var { value: Some(value), .. } => value.clone(),
			NodeKind::Choice { .. } => self.choice_text(id),
			NodeKind::Mirror { index } => {
				if self.is_self_mirror(id, *index) {
					String::new()
				} else {
					values.get(index).cloned().unwrap_or_default()
				}
			}
			NodeKind::Root | NodeKind::Tabstop { .. } | NodeKind::Var { value: None, .. } => {
				self.children(id).iter().map(|child| self.display(*child, values)).collect()
			}
		}
	}

	pub(crate) fn layout(&self, values: &HashMap<u32, String>) -> Layout {
		let mut layout = Layout {
			text: String::new(),
			len: 0,
			ranges: vec![None; self.nodes.len()],
		};
		self.layout_node(ROOT, values, &mut layout);
		layout
	}

	fn layout_node(&self, id: NodeId, values: &HashMap<u32, String>, layout: &mut Layout) {
		let start = layout.len;
		match self.kind(id) {
			NodeKind::Root | NodeKind::Tabstop { .. } | NodeKind::Var { value: None, .. } => {
				for child in self.children(id) {
					self.layout_node(*child, values, layout);
				}
			}
			_ => {
				let text = self.display(id, values);
				layout.len += text.chars().count();
				layout.text.push_str(&text);
			}
		}
		layout.ranges[id.0] = Some(start..layout.len);
	}

	/// Returns true for nodes that own text directly rather than through children.
	pub(crate) fn is_leaf(&self, id: NodeId) -> bool {
		match self.kind(id) {
			NodeKind::Root | NodeKind::Var { value: None, .. } => false,
			NodeKind::Tabstop { .. } => self.children(id).is_empty(),
			_ => true,
		}
	}
}

fn indent_text(text: &str, indent: &str) -> String {
	if indent.is_empty() {
		text.to_string()
	} else {
		text.replace('\n', &format!("\n{indent}"))
	}
}

#[cfg(test)]
mod tests;
