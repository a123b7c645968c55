use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::parse_snippet_template;
use crate::vars::MapResolver;

fn instance(body: &str) -> SnippetInstance {
	let template = parse_snippet_template(body).unwrap();
	SnippetInstance::new(SnippetTree::instantiate(&template, &MapResolver::new(), ""), 0, None)
}

fn replace(text: &str, range: StdRange<usize>, inserted: &str) -> String {
	let mut out: String = text.chars().take(range.start).collect();
	out.push_str(inserted);
	out.extend(text.chars().skip(range.end));
	out
}

/// Applies a user edit, synchronizes, applies the planned writes, and checks
/// that the document matches the instance afterwards.
fn edit(inst: &mut SnippetInstance, doc: &str, range: StdRange<usize>, inserted: &str, prefer: Option<u32>) -> String {
	let mut doc = replace(doc, range, inserted);
	let writes = synchronize(inst, &doc, prefer);
	for write in &writes {
		doc = replace(&doc, write.range.clone(), &write.text);
	}
	assert_eq!(doc, inst.layout.text);
	doc
}

#[test]
fn unchanged_text_plans_nothing() {
	let mut inst = instance("${1:a} $1");
	let text = inst.layout.text.clone();
	assert!(synchronize(&mut inst, &text, Some(1)).is_empty());
}

#[test]
fn typing_into_empty_tabstop_updates_mirror() {
	let mut inst = instance("$1 $1");
	let doc = inst.layout.text.clone();
	let doc = edit(&mut inst, &doc, 0..0, "b", Some(1));
	assert_eq!(doc, "b b");
	let doc = edit(&mut inst, &doc, 1..1, "a", Some(1));
	assert_eq!(doc, "ba ba");
	let doc = edit(&mut inst, &doc, 2..2, "r", Some(1));
	assert_eq!(doc, "bar bar");
	assert_eq!(inst.values[&1], "bar");
}

#[test]
fn replacing_placeholder_updates_every_mirror() {
	let mut inst = instance("${1:foo}($1, $1)");
	let doc = inst.layout.text.clone();
	assert_eq!(doc, "foo(foo, foo)");

	let doc = edit(&mut inst, &doc, 0..3, "x", Some(1));
	assert_eq!(doc, "x(x, x)");
	let doc = edit(&mut inst, &doc, 1..1, "yzw", Some(1));
	assert_eq!(doc, "xyzw(xyzw, xyzw)");
}

#[test]
fn deleting_field_content_shrinks_mirrors() {
	let mut inst = instance("${1:foo} $1");
	let doc = inst.layout.text.clone();
	let doc = edit(&mut inst, &doc, 0..3, "", Some(1));
	assert_eq!(doc, " ");
	assert_eq!(inst.order, vec![1]);
}

#[test]
fn editing_a_mirror_redirects_to_authoritative() {
	let mut inst = instance("${1:foo} $1 $1");
	let doc = inst.layout.text.clone();
	let doc = edit(&mut inst, &doc, 6..7, "x", None);
	assert_eq!(doc, "fox fox fox");
	assert_eq!(inst.values[&1], "fox");
}

#[test]
fn trailing_repeat_char_stays_in_focused_field() {
	let mut inst = instance("$1 $1");
	let doc = inst.layout.text.clone();
	let doc = edit(&mut inst, &doc, 0..0, "a", Some(1));
	let doc = edit(&mut inst, &doc, 1..1, " ", Some(1));
	assert_eq!(doc, "a  a ");
	assert_eq!(inst.values[&1], "a ");
}

#[test]
fn nested_field_change_reaches_outer_mirror() {
	let mut inst = instance("${1:a ${2:b}} [$1]");
	let doc = inst.layout.text.clone();
	assert_eq!(doc, "a b [a b]");

	let doc = edit(&mut inst, &doc, 2..3, "xyz", Some(2));
	assert_eq!(doc, "a xyz [a xyz]");
	assert_eq!(inst.values[&1], "a xyz");
}

#[test]
fn nested_tabstop_edit_shifts_later_mirror() {
	let mut inst = instance("${2:<$3>} ${3:q}");
	let doc = inst.layout.text.clone();
	assert_eq!(doc, "<> ");
	assert_eq!(inst.order, vec![2, 3]);

	let doc = edit(&mut inst, &doc, 1..1, "in", Some(3));
	assert_eq!(doc, "<in> in");
}

#[test]
fn edit_spanning_fields_collapses_them_to_text() {
	let mut inst = instance("a ${1:one} ${2:two} b");
	let doc = inst.layout.text.clone();
	let doc = edit(&mut inst, &doc, 3..7, "", None);
	assert_eq!(doc, "a owo b");
	assert_eq!(inst.order, Vec::<u32>::new());
}

#[test]
fn edits_outside_the_field_leave_siblings_alone() {
	let mut inst = instance("${1:a}-${2:b}-$2");
	let doc = inst.layout.text.clone();
	let doc = edit(&mut inst, &doc, 0..1, "long", Some(1));
	assert_eq!(doc, "long-b-b");
	let doc = edit(&mut inst, &doc, 5..6, "", Some(2));
	assert_eq!(doc, "long--");
	assert_eq!(inst.values[&1], "long");
}

#[test]
fn typed_choice_value_becomes_custom() {
	let mut inst = instance("${1|red,blue|} $1");
	let doc = inst.layout.text.clone();
	assert_eq!(doc, "red red");

	let doc = edit(&mut inst, &doc, 0..3, "blue", Some(1));
	assert_eq!(doc, "blue blue");
	let id = inst.tree.authoritative(1).unwrap();
	assert!(matches!(inst.tree.kind(id), NodeKind::Choice { selected: 1, custom: None, .. }));

	let doc = edit(&mut inst, &doc, 4..4, "ish", Some(1));
	assert_eq!(doc, "blueish blueish");
}

#[test]
fn choice_cycles_with_wraparound() {
	let mut inst = instance("${1|a,bb,ccc|}:$1");
	let mut doc = inst.layout.text.clone();

	for expected in ["bb:bb", "ccc:ccc", "a:a"] {
		let writes = cycle_choice(&mut inst, SeqDirection::Next).expect("focused choice");
		for write in &writes {
			doc = replace(&doc, write.range.clone(), &write.text);
		}
		assert_eq!(doc, expected);
	}

	let writes = cycle_choice(&mut inst, SeqDirection::Prev).expect("focused choice");
	for write in &writes {
		doc = replace(&doc, write.range.clone(), &write.text);
	}
	assert_eq!(doc, "ccc:ccc");
}

#[test]
fn cycle_choice_ignores_plain_tabstops() {
	let mut inst = instance("${1:x}");
	assert!(cycle_choice(&mut inst, SeqDirection::Next).is_none());
}

#[test]
fn self_mirror_stays_empty() {
	let mut inst = instance("${1:a$1b}");
	let doc = inst.layout.text.clone();
	assert_eq!(doc, "ab");
	let doc = edit(&mut inst, &doc, 1..1, "X", Some(1));
	assert_eq!(doc, "aXb");
}

#[test]
fn multibyte_edits_use_char_offsets() {
	let mut inst = instance("あ$1う$1お");
	let doc = inst.layout.text.clone();
	let doc = edit(&mut inst, &doc, 1..1, "いい", Some(1));
	assert_eq!(doc, "あいいういいお");
}

#[test]
fn diff_finds_single_window() {
	let old: Vec<char> = "hello world".chars().collect();
	let new: Vec<char> = "hello brave world".chars().collect();
	let edit = diff(&old, &new);
	assert_eq!((edit.from, edit.to), (6, 6));
	assert_eq!(edit.inserted.iter().collect::<String>(), "brave ");
}

proptest! {
	#[test]
	fn mirrors_track_authoritative_under_random_typing(
		ops in prop::collection::vec((0usize..8, 0usize..4, "[a-z ]{0,3}"), 1..12)
	) {
		let mut inst = instance("<${1:seed}|$1|${2:x$1y}|$2>");
		let mut doc = inst.layout.text.clone();

		for (offset, len, text) in ops {
			let Some(range) = inst.tree.authoritative(1).and_then(|id| inst.layout.range(id)) else {
				break;
			};
			let start = range.start + offset.min(range.len());
			let end = (start + len).min(range.end);
			doc = replace(&doc, start..end, &text);
			let writes = synchronize(&mut inst, &doc, Some(1));
			for write in &writes {
				doc = replace(&doc, write.range.clone(), &write.text);
			}
			prop_assert_eq!(&doc, &inst.layout.text);

			let one = inst.values.get(&1).cloned().unwrap_or_default();
			let expected = format!("<{one}|{one}|x{one}y|x{one}y>");
			prop_assert_eq!(&doc, &expected);
		}
	}
}
