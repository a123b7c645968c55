//! Core types for snippet editing: char offsets, positions, modes, and the document capability.

/// Sequential navigation direction.
pub mod direction;
/// Document capability consumed by the snippet engine.
pub mod document;
/// Editor mode definitions.
pub mod mode;
/// Line/character positions measured in UTF-8, UTF-16, or UTF-32 units.
pub mod position;
/// Text range types over char indices.
pub mod range;
/// Rope utilities and extensions.
pub mod rope;

pub use direction::SeqDirection;
pub use document::{Document, RopeDocument};
pub use mode::Mode;
pub use position::{OffsetEncoding, Position, TextRange};
pub use range::{CharIdx, CharLen, Range};
pub use ropey::{Rope, RopeSlice};
