//! Static rendering of a template, used for previews and plain-text output.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range as StdRange;

use crate::syntax::SnippetTemplate;
use crate::tree::{NodeKind, SnippetTree};
use crate::vars::{MapResolver, SnippetVarResolver};

/// Text of a freshly instantiated template with the char ranges of every
/// tabstop occurrence (authoritative and mirrors) grouped by index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedSnippet {
	pub text: String,
	pub tabstops: BTreeMap<u32, Vec<StdRange<usize>>>,
	pub choices: BTreeMap<u32, Vec<String>>,
}

impl RenderedSnippet {
	pub(crate) fn from_tree(tree: &SnippetTree) -> Self {
		let values = tree.compute_values(&HashMap::new());
		let layout = tree.layout(&values);

		let mut tabstops: BTreeMap<u32, Vec<StdRange<usize>>> = BTreeMap::new();
		let mut choices = BTreeMap::new();
		for id in tree.pre_order() {
			let index = match tree.kind(id) {
				NodeKind::Tabstop { index } | NodeKind::Mirror { index } => *index,
				NodeKind::Choice { index, options, .. } => {
					choices.insert(*index, options.clone());
					*index
				}
				_ => continue,
			};
			if let Some(range) = layout.range(id) {
				tabstops.entry(index).or_default().push(range);
			}
		}
		for ranges in tabstops.values_mut() {
			ranges.sort_by_key(|range| (range.start, range.end));
		}

		Self {
			text: layout.text,
			tabstops,
			choices,
		}
	}
}

/// Renders `template` with every variable falling back to its default.
pub fn render(template: &SnippetTemplate) -> RenderedSnippet {
	render_with_resolver(template, &MapResolver::new())
}

pub fn render_with_resolver(template: &SnippetTemplate, resolver: &dyn SnippetVarResolver) -> RenderedSnippet {
	let tree = SnippetTree::instantiate(template, resolver, "");
	RenderedSnippet::from_tree(&tree)
}
