//! Snippet definitions loaded from JSON, TOML or YAML files.
//!
//! Each file maps snippet names to a prefix (or several), a body and an
//! optional description. Files are registered for one or more filetypes;
//! the `*` filetype makes its snippets available everywhere.

mod error;
mod loader;
mod registry;

pub use error::LoadError;
pub use loader::{SnippetFormat, parse_source};
pub use registry::{CompleteItem, CompleteUserData, GLOBAL_FILETYPE, SnippetDef, SnippetMatch, SnippetRegistry};
