//! Drives a [`SnippetService`] the way an editor would: typed text is
//! followed by an edit notification, and leaving insert mode ends the run.

use stencil_editor::{Config, Document, Mode, RopeDocument, SnippetBody, SnippetService};

pub struct Harness {
	pub service: SnippetService,
	pub doc: RopeDocument,
}

impl Harness {
	pub fn new() -> Self {
		Self::with_config(Config::default())
	}

	pub fn with_config(config: Config) -> Self {
		Self {
			service: SnippetService::new(config),
			doc: RopeDocument::default(),
		}
	}

	pub fn anonymous(&mut self, body: impl Into<SnippetBody>) -> &mut Self {
		self.service
			.anonymous(&mut self.doc, body, None)
			.expect("snippet body should parse");
		self
	}

	pub fn input(&mut self, text: &str) -> &mut Self {
		self.doc.type_text(text);
		self.service.on_text_changed(&mut self.doc);
		self
	}

	pub fn jump(&mut self, dir: i64) -> &mut Self {
		self.service.jump(&mut self.doc, dir).expect("unit direction");
		self
	}

	pub fn choice(&mut self, dir: i64) -> &mut Self {
		self.service.choice(&mut self.doc, dir).expect("unit direction");
		self
	}

	/// Leaves insert mode.
	pub fn escape(&mut self) -> &mut Self {
		self.service.on_mode_changed(&mut self.doc, Mode::Normal);
		self
	}

	/// Buffer lines with `|` marking the cursor.
	pub fn screen(&self) -> Vec<String> {
		let mut text = self.doc.text();
		text.insert(self.doc.rope().char_to_byte(self.doc.cursor()), '|');
		text.split('\n').map(str::to_string).collect()
	}
}
