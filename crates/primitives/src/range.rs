use std::ops::Range as StdRange;

/// A position in the text, measured in characters (not bytes).
///
/// This is the canonical coordinate space for the snippet engine. Hosts that
/// address text in another unit convert through [`crate::position`].
pub type CharIdx = usize;

/// A length or count in the text, measured in characters (not bytes).
///
/// This is distinct from CharIdx to avoid accidentally passing an index
/// where a length is expected or vice versa.
pub type CharLen = usize;

/// A selection defined by anchor and head positions.
///
/// The anchor is the fixed end and the head is the cursor. A snippet
/// placeholder is selected with the anchor on its start and the head on its
/// end, so typing replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
	/// The fixed end of the range.
	pub anchor: CharIdx,
	/// The moving end of the range (cursor position).
	pub head: CharIdx,
}

impl Range {
	/// Creates a new range from anchor to head.
	pub fn new(anchor: CharIdx, head: CharIdx) -> Self {
		Self { anchor, head }
	}

	/// Creates a zero-width range (cursor) at the given position.
	pub fn point(pos: CharIdx) -> Self {
		Self::new(pos, pos)
	}

	/// Creates a forward range covering `span`.
	pub fn from_span(span: StdRange<CharIdx>) -> Self {
		Self::new(span.start, span.end)
	}

	/// Returns the smaller of anchor and head.
	#[inline]
	pub fn min(&self) -> CharIdx {
		std::cmp::min(self.anchor, self.head)
	}

	/// Returns the larger of anchor and head.
	#[inline]
	pub fn max(&self) -> CharIdx {
		std::cmp::max(self.anchor, self.head)
	}

	/// Returns the covered chars as a half-open span.
	#[inline]
	pub fn extent(&self) -> StdRange<CharIdx> {
		self.min()..self.max()
	}

	/// Returns the length of the range in characters.
	#[inline]
	pub fn len(&self) -> CharLen {
		self.max() - self.min()
	}

	/// Returns true if anchor equals head (zero-width cursor).
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.anchor == self.head
	}

	/// Returns true if the position is within the range (exclusive of max).
	pub fn contains(&self, pos: CharIdx) -> bool {
		pos >= self.min() && pos < self.max()
	}

	/// Applies a function to both anchor and head.
	pub fn map(self, mut f: impl FnMut(CharIdx) -> CharIdx) -> Self {
		Self {
			anchor: f(self.anchor),
			head: f(self.head),
		}
	}

	/// Clamps anchor and head to `[0, max_char]`.
	pub fn clamp(&self, max_char: CharIdx) -> Self {
		Self {
			anchor: self.anchor.min(max_char),
			head: self.head.min(max_char),
		}
	}
}

impl Default for Range {
	fn default() -> Self {
		Self::point(0)
	}
}

/// Maps a position through the replacement of `replaced` by `inserted` chars.
///
/// Positions before the replacement (including one sitting exactly at the
/// start of a pure insertion) stay put, positions after it shift by the length
/// delta, and positions inside it collapse onto the end of the inserted text.
pub fn map_through_replace(pos: CharIdx, replaced: &StdRange<CharIdx>, inserted: CharLen) -> CharIdx {
	if pos <= replaced.start {
		pos
	} else if pos >= replaced.end {
		pos - (replaced.end - replaced.start) + inserted
	} else {
		replaced.start + inserted
	}
}
