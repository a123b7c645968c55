use std::collections::HashMap;

use pretty_assertions::assert_eq;

use super::*;
use crate::parse_snippet_template;
use crate::vars::{MapResolver, VarContext, VarRegistry};

fn tree(body: &str) -> SnippetTree {
	SnippetTree::instantiate(&parse_snippet_template(body).unwrap(), &MapResolver::new(), "")
}

#[test]
fn order_places_zero_last() {
	assert_eq!(tree("$0 $3 ${1:a} $2 $1").order(), vec![1, 2, 3, 0]);
	assert_eq!(tree("plain").order(), Vec::<u32>::new());
	assert_eq!(tree("$0").order(), vec![0]);
}

#[test]
fn indent_follows_every_template_newline() {
	let template = parse_snippet_template("if ($1) {\n\t$0\n}").unwrap();
	let tree = SnippetTree::instantiate(&template, &MapResolver::new(), "    ");
	let layout = tree.layout(&tree.compute_values(&HashMap::new()));

	assert_eq!(layout.text, "if () {\n    \t\n    }");
}

#[test]
fn indent_applies_to_variable_values_once() {
	let template = parse_snippet_template("a\n$SEL").unwrap();
	let resolver = MapResolver::new().with("SEL", "x\ny");
	let tree = SnippetTree::instantiate(&template, &resolver, "\t");
	let values = tree.compute_values(&HashMap::new());

	assert_eq!(tree.layout(&values).text, "a\n\tx\n\ty");
	// re-rendering must not indent again
	assert_eq!(tree.layout(&tree.compute_values(&values)).text, "a\n\tx\n\ty");
}

#[test]
fn variable_callback_receives_rendered_default() {
	let mut registry = VarRegistry::new();
	registry.register("WRAP", |default| Some(format!("[{default}]")));
	let template = parse_snippet_template("${1:id} ${WRAP:$1 default}").unwrap();
	let tree = SnippetTree::instantiate(&template, &registry.scoped(VarContext::detached()), "");
	let layout = tree.layout(&tree.compute_values(&HashMap::new()));

	assert_eq!(layout.text, "id [id default]");
}

#[test]
fn missing_declaration_keeps_previous_value() {
	let mut tree = tree("${1:foo} $1");
	let auth = tree.authoritative(1).unwrap();
	let previous = tree.compute_values(&HashMap::new());
	assert_eq!(previous[&1], "foo");

	let root = tree.root();
	let text = tree.alloc(NodeKind::Text("foo".to_string()));
	let mut children = tree.children(root).to_vec();
	children[0] = text;
	tree.set_children(root, children);

	assert!(!tree.is_reachable(auth));
	assert_eq!(tree.authoritative(1), None);
	assert_eq!(tree.order(), Vec::<u32>::new());
	let values = tree.compute_values(&previous);
	assert_eq!(tree.layout(&values).text, "foo foo");
}

#[test]
fn layout_ranges_nest() {
	let tree = tree("<${1:a${2:bc}d}>");
	let layout = tree.layout(&tree.compute_values(&HashMap::new()));
	let one = tree.authoritative(1).unwrap();
	let two = tree.authoritative(2).unwrap();

	assert_eq!(layout.text, "<abcd>");
	assert_eq!(layout.range(one), Some(1..5));
	assert_eq!(layout.range(two), Some(2..4));
	assert_eq!(layout.node_text(two), "bc");
	assert!(tree.is_ancestor(one, two));
	assert!(!tree.is_ancestor(two, one));
}

#[test]
fn choice_text_prefers_custom_value() {
	let mut tree = tree("${1|a,b|}");
	let id = tree.authoritative(1).unwrap();
	assert_eq!(tree.choice_text(id), "a");

	if let NodeKind::Choice { selected, .. } = tree.kind_mut(id) {
		*selected = 1;
	}
	assert_eq!(tree.choice_text(id), "b");

	if let NodeKind::Choice { custom, .. } = tree.kind_mut(id) {
		*custom = Some("zzz".to_string());
	}
	assert_eq!(tree.choice_text(id), "zzz");
}
