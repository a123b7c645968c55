//! Stencil command line.
//!
//! Renders snippet bodies, lists the completion items of snippet files and
//! expands a prefix against configured snippet sources.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

/// Stencil command line arguments.
#[derive(Parser, Debug)]
#[command(name = "stencil")]
#[command(about = "Snippet rendering and expansion")]
struct Args {
	#[command(subcommand)]
	command: Command,

	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Render a snippet body to plain text
	Render {
		body: String,

		/// Variable value, may be repeated
		#[arg(long = "var", value_name = "NAME=VALUE", value_parser = commands::parse_var)]
		vars: Vec<(String, String)>,
	},
	/// Print the completion items of a snippet file as JSON
	List {
		#[arg(value_name = "PATH")]
		file: PathBuf,

		#[arg(short, long, default_value = stencil_registry::GLOBAL_FILETYPE)]
		filetype: String,
	},
	/// Expand the snippet prefix at the end of LINE
	Expand {
		line: String,

		/// Config file listing snippet sources
		#[arg(short, long, value_name = "PATH")]
		config: PathBuf,

		#[arg(short, long)]
		filetype: String,
	},
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let mut out = std::io::stdout().lock();
	match args.command {
		Command::Render { body, vars } => commands::render(&body, vars, &mut out),
		Command::List { file, filetype } => commands::list(&file, &filetype, &mut out),
		Command::Expand { line, config, filetype } => commands::expand(&line, &config, &filetype, &mut out),
	}
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("STENCIL_LOG").unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("stencil_editor=trace,stencil_snippet=trace,stencil_registry=trace,debug")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose)
		.init();
}
