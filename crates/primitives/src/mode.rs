/// Host editing mode, as reported by mode-change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
	/// Command mode. Entering it ends the editing phase of a snippet.
	Normal,
	/// Text insertion.
	#[default]
	Insert,
	/// A placeholder is selected and typing replaces it.
	Select,
}

impl Mode {
	/// Returns true for modes in which typed text reaches the document.
	pub const fn is_editing(self) -> bool {
		matches!(self, Self::Insert | Self::Select)
	}
}
