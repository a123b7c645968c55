use std::path::Path;

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn format_follows_extension() {
	assert_eq!(SnippetFormat::from_path(Path::new("a/rust.json")), Some(SnippetFormat::Json));
	assert_eq!(SnippetFormat::from_path(Path::new("rust.toml")), Some(SnippetFormat::Toml));
	assert_eq!(SnippetFormat::from_path(Path::new("rust.yml")), Some(SnippetFormat::Yaml));
	assert_eq!(SnippetFormat::from_path(Path::new("rust.yaml")), Some(SnippetFormat::Yaml));
	assert_eq!(SnippetFormat::from_path(Path::new("rust.snippets")), None);
	assert_eq!(SnippetFormat::from_path(Path::new("README")), None);
}

#[test]
fn json_entries_keep_file_order() {
	let text = r#"{
		"while": { "prefix": "wh", "body": "while $1 {\n\t$0\n}" },
		"if": { "prefix": ["if", "iff"], "body": ["if $1 {", "\t$0", "}"], "description": "if block" }
	}"#;
	let snippets = parse_source(text, SnippetFormat::Json).unwrap();

	assert_eq!(snippets.len(), 2);
	assert_eq!(snippets[0].name, "while");
	assert_eq!(snippets[0].prefixes, ["wh"]);
	assert_eq!(snippets[0].body, SnippetBody::Text("while $1 {\n\t$0\n}".to_string()));
	assert_eq!(snippets[1].prefixes, ["if", "iff"]);
	assert_eq!(snippets[1].body.join("\n"), "if $1 {\n\t$0\n}");
	assert_eq!(snippets[1].description.as_deref(), Some("if block"));
}

#[test]
fn toml_prefix_defaults_to_name() {
	let text = r##"
[fn]
body = "fn ${1:name}() {\n\t$0\n}"

[test]
prefix = "tst"
body = ["#[test]", "fn ${1:case}() {", "\t$0", "}"]
"##;
	let snippets = parse_source(text, SnippetFormat::Toml).unwrap();

	assert_eq!(snippets[0].prefixes, ["fn"]);
	assert_eq!(snippets[0].description, None);
	assert_eq!(snippets[1].prefixes, ["tst"]);
}

#[test]
fn yaml_is_supported() {
	let text = "log:\n  prefix: log\n  body: console.log($0)\n  description: print\n";
	let snippets = parse_source(text, SnippetFormat::Yaml).unwrap();

	assert_eq!(snippets.len(), 1);
	assert_eq!(snippets[0].body, SnippetBody::Text("console.log($0)".to_string()));
}

#[test]
fn invalid_bodies_are_skipped() {
	let text = r#"{
		"broken": { "prefix": "b", "body": "${1:never closed" },
		"fine": { "prefix": "f", "body": "$1" }
	}"#;
	let snippets = parse_source(text, SnippetFormat::Json).unwrap();

	assert_eq!(snippets.len(), 1);
	assert_eq!(snippets[0].name, "fine");
}

#[test]
fn empty_prefixes_are_dropped() {
	let text = r#"{ "x": { "prefix": ["", "x"], "body": "x" } }"#;
	let snippets = parse_source(text, SnippetFormat::Json).unwrap();
	assert_eq!(snippets[0].prefixes, ["x"]);
}

#[test]
fn syntax_errors_surface_per_format() {
	assert!(matches!(parse_source("{", SnippetFormat::Json), Err(LoadError::Json(_))));
	assert!(matches!(parse_source("[x", SnippetFormat::Toml), Err(LoadError::Toml(_))));
	assert!(matches!(parse_source("a: [", SnippetFormat::Yaml), Err(LoadError::Yaml(_))));
	assert!(matches!(
		parse_source(r#"{ "x": { "prefix": "x" } }"#, SnippetFormat::Json),
		Err(LoadError::Json(_))
	));
}
