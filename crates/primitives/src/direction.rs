/// Direction of travel through an ordered sequence (tabstops, choice options).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqDirection {
	/// Towards the end of the sequence (`+1`).
	Next,
	/// Towards the start of the sequence (`-1`).
	Prev,
}

impl SeqDirection {
	/// Converts a host-facing step (`+1` or `-1`) into a direction.
	pub fn from_step(step: i64) -> Option<Self> {
		match step {
			1 => Some(Self::Next),
			-1 => Some(Self::Prev),
			_ => None,
		}
	}

	/// Signed step for index arithmetic.
	pub const fn step(self) -> isize {
		match self {
			Self::Next => 1,
			Self::Prev => -1,
		}
	}
}
