//! Snippet files loaded through a config file and expanded by prefix.

use std::fs;

use pretty_assertions::assert_eq;
use stencil_editor::{Config, Document, RopeDocument, SnippetService};

fn service_from_dir(dir: &std::path::Path) -> SnippetService {
	fs::write(
		dir.join("rust.toml"),
		r#"
[fn]
prefix = ["fn", "pubfn"]
body = ["fn ${1:name}($2) {", "\t$0", "}"]
description = "function"

[header]
prefix = "hdr"
body = "// $TM_FILENAME"
"#,
	)
	.unwrap();
	fs::write(dir.join("global.json"), r#"{ "todo": { "prefix": "todo", "body": "TODO(${1:me}): $0" } }"#).unwrap();
	fs::write(
		dir.join("stencil.toml"),
		r#"
[[sources]]
path = "rust.toml"
filetypes = ["rust"]

[[sources]]
path = "global.json"
filetypes = ["*"]
"#,
	)
	.unwrap();

	let config = Config::load(&dir.join("stencil.toml")).unwrap();
	let mut service = SnippetService::new(config);
	assert_eq!(service.load_configured(), 3);
	service
}

#[test]
fn prefix_expansion_keeps_line_indent() {
	let dir = tempfile::tempdir().unwrap();
	let mut service = service_from_dir(dir.path());
	let mut doc = RopeDocument::new("impl A {\n    fn").with_filetype("rust");

	assert_eq!(service.expand(&mut doc), Ok(true));
	assert_eq!(doc.lines(), ["impl A {", "    fn name() {", "    \t", "    }"]);
	assert_eq!(doc.selected_text().as_deref(), Some("name"));

	doc.type_text("run");
	service.on_text_changed(&mut doc);
	service.jump(&mut doc, 1).unwrap();
	doc.type_text("x: u8");
	service.jump(&mut doc, 1).unwrap();
	doc.type_text("todo!()");
	assert_eq!(doc.lines(), ["impl A {", "    fn run(x: u8) {", "    \ttodo!()", "    }"]);
}

#[test]
fn longest_prefix_wins() {
	let dir = tempfile::tempdir().unwrap();
	let mut service = service_from_dir(dir.path());
	let mut doc = RopeDocument::new("pubfn").with_filetype("rust");

	service.expand(&mut doc).unwrap();
	assert_eq!(doc.lines()[0], "fn name() {");
}

#[test]
fn global_snippets_apply_to_any_filetype() {
	let dir = tempfile::tempdir().unwrap();
	let mut service = service_from_dir(dir.path());
	let mut doc = RopeDocument::new("# todo").with_filetype("markdown");

	assert!(service.expandable(&doc));
	service.expand(&mut doc).unwrap();
	assert_eq!(doc.text(), "# TODO(me): ");
	assert_eq!(service.complete_items(&doc).len(), 1);
}

#[test]
fn file_variables_follow_document_path() {
	let dir = tempfile::tempdir().unwrap();
	let mut service = service_from_dir(dir.path());
	let mut doc = RopeDocument::new("hdr").with_filetype("rust").with_path("/src/main.rs");

	assert_eq!(service.expand(&mut doc), Ok(false));
	assert_eq!(doc.text(), "// main.rs");
	assert_eq!(doc.cursor(), doc.len_chars());
}

#[test]
fn completion_items_cover_every_prefix() {
	let dir = tempfile::tempdir().unwrap();
	let service = service_from_dir(dir.path());
	let doc = RopeDocument::default().with_filetype("rust");

	let words: Vec<String> = service.complete_items(&doc).into_iter().map(|item| item.word).collect();
	assert_eq!(words, ["fn", "pubfn", "hdr", "todo"]);
	let item = &service.complete_items(&doc)[0];
	assert_eq!(item.user_data.body, "fn ${1:name}($2) {\n\t$0\n}");
	assert_eq!(item.user_data.description, "function");
}
