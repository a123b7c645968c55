//! Subcommand implementations, writing their results to `out`.

use std::io::Write;
use std::path::Path;

use stencil_editor::{Config, Document, RopeDocument, SnippetService};
use stencil_registry::SnippetRegistry;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Parses a `NAME=VALUE` variable argument.
pub fn parse_var(arg: &str) -> Result<(String, String), String> {
	match arg.split_once('=') {
		Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
		_ => Err(format!("expected NAME=VALUE, got `{arg}`")),
	}
}

pub fn render(body: &str, vars: Vec<(String, String)>, out: &mut impl Write) -> CommandResult {
	let mut service = SnippetService::default();
	for (name, value) in vars {
		service.register_variable(name, move |_| Some(value.clone()));
	}
	let text = service.render_to_text(body)?;
	writeln!(out, "{text}")?;
	Ok(())
}

pub fn list(file: &Path, filetype: &str, out: &mut impl Write) -> CommandResult {
	let mut registry = SnippetRegistry::new();
	registry.load(file, &[filetype])?;
	let items = registry.complete_items(filetype);
	serde_json::to_writer_pretty(&mut *out, &items)?;
	writeln!(out)?;
	Ok(())
}

/// Expands the prefix `line` ends with and prints the result, marking the
/// cursor with `|` when a tabstop is left to fill.
pub fn expand(line: &str, config: &Path, filetype: &str, out: &mut impl Write) -> CommandResult {
	let config = Config::load(config)?;
	let mut service = SnippetService::new(config);
	let loaded = service.load_configured();
	tracing::debug!(loaded, "snippet sources loaded");

	let mut doc = RopeDocument::new(line).with_filetype(filetype);
	if !service.expandable(&doc) {
		return Err(format!("no snippet prefix for `{filetype}` at the end of `{line}`").into());
	}
	let active = service.expand(&mut doc)?;

	let mut text = doc.text();
	if active {
		let cursor = doc.rope().char_to_byte(doc.cursor());
		text.insert(cursor, '|');
	}
	writeln!(out, "{text}")?;
	Ok(())
}
