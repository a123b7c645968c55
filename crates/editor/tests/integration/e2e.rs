//! Typing sessions against a rope document, from expansion to leaving
//! insert mode.

use pretty_assertions::assert_eq;
use stencil_editor::{Config, Document, Mode};
use stencil_primitives::{OffsetEncoding, Position};

use crate::harness::Harness;

const IF_BLOCK: [&str; 3] = ["if ($1) {", "\t$0", "}"];

#[test]
fn final_stop() {
	let mut h = Harness::new();
	h.anonymous("console.log($0)").escape();
	assert_eq!(h.screen(), ["console.log(|)"]);
}

#[test]
fn jump() {
	let mut h = Harness::new();
	h.anonymous("$1 $2").input("foo").jump(1).input("bar").escape();
	assert_eq!(h.screen(), ["foo bar|"]);
}

#[test]
fn copy() {
	let mut h = Harness::new();
	h.anonymous("$1 $1").input("bar").escape();
	assert_eq!(h.screen(), ["bar| bar"]);
}

#[test]
fn default_text() {
	let mut h = Harness::new();
	h.anonymous("${1:foo}").escape();
	assert_eq!(h.screen(), ["foo|"]);
}

#[test]
fn multi_line() {
	let mut h = Harness::new();
	h.anonymous(IF_BLOCK).input("foo").jump(1).input("bar").escape();
	assert_eq!(h.screen(), ["if (foo) {", "\tbar|", "}"]);
}

#[test]
fn nest_jump() {
	let mut h = Harness::new();
	h.anonymous(IF_BLOCK)
		.anonymous(IF_BLOCK)
		.input("foo")
		.jump(1)
		.input("bar")
		.jump(1)
		.input("baz")
		.escape();
	assert_eq!(h.screen(), ["if (if (foo) {", "\tbar", "}) {", "\tbaz|", "}"]);
}

#[test]
fn nest_range() {
	let mut h = Harness::new();
	h.anonymous(IF_BLOCK)
		.anonymous("x == null")
		.jump(1)
		.input("foo")
		.jump(-1)
		.input("bar")
		.escape();
	assert_eq!(h.screen(), ["if (bar|) {", "\tfoo", "}"]);
}

#[test]
fn multibyte() {
	let mut h = Harness::new();
	h.anonymous("あ$1う$2お").input("い").jump(1).input("え");
	assert_eq!(h.doc.cursor_position(OffsetEncoding::Utf16), Some(Position::new(0, 4)));
	assert_eq!(h.doc.cursor_position(OffsetEncoding::Utf32), Some(Position::new(0, 4)));
	h.escape();
	assert_eq!(h.screen(), ["あいうえ|お"]);
}

#[test]
fn choice_cycles_with_wraparound() {
	let mut h = Harness::new();
	h.anonymous("${1|red,green,blue|}: $1").choice(1).choice(1);
	assert_eq!(h.doc.text(), "blue: blue");
	h.choice(1);
	assert_eq!(h.doc.text(), "red: red");
	h.choice(-1).escape();
	assert_eq!(h.screen(), ["blue|: blue"]);
}

#[test]
fn choice_can_be_overtyped() {
	let mut h = Harness::new();
	h.anonymous("${1|a,b|} $1").input("custom").escape();
	assert_eq!(h.screen(), ["custom| custom"]);
}

#[test]
fn nested_edits_leave_parent_siblings_alone() {
	let mut h = Harness::new();
	h.anonymous("$1 ${2:b} $2").anonymous("<$1>").input("x");
	assert_eq!(h.doc.text(), "<x> b b");

	h.jump(1);
	assert_eq!(h.doc.selected_text().as_deref(), Some("b"));
	h.input("y").escape();
	assert_eq!(h.screen(), ["<x> y| y"]);
}

#[test]
fn jumpable_reports_ends() {
	let mut h = Harness::new();
	h.anonymous("$1 $2 $0");
	assert_eq!(h.service.jumpable(-1), Ok(false));
	assert_eq!(h.service.jumpable(1), Ok(true));
	h.jump(1).jump(1);
	assert_eq!(h.service.jumpable(1), Ok(false));
	assert_eq!(h.service.jumpable(-1), Ok(true));
}

#[test]
fn drop_on_zero_config_ends_snippet() {
	let mut h = Harness::with_config(Config {
		drop_on_zero: true,
		..Config::default()
	});
	h.anonymous(IF_BLOCK).input("ok").jump(1);
	assert!(!h.service.is_active());
	h.input("body");
	assert_eq!(h.screen(), ["if (ok) {", "\tbody|", "}"]);
}

#[test]
fn select_mode_keeps_session() {
	let mut h = Harness::new();
	h.anonymous("${1:x} $1");
	h.service.on_mode_changed(&mut h.doc, Mode::Select);
	h.input("y");
	assert!(h.service.is_active());
	assert_eq!(h.doc.text(), "y y");
}
