//! Editor integration for the snippet engine.
//!
//! [`SnippetService`] is what a host editor talks to: it loads snippet files,
//! expands snippets by prefix or body, moves between tabstops and keeps the
//! active snippet in sync with edits through a debounced [`SyncScheduler`].

mod config;
mod debounce;
mod service;

pub use config::{Config, ConfigError, SnippetSource};
pub use debounce::SyncScheduler;
pub use service::SnippetService;
pub use stencil_primitives::{Document, Mode, RopeDocument};
pub use stencil_registry::CompleteItem;
pub use stencil_snippet::SnippetBody;
