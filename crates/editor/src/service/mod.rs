//! Host-facing snippet operations.
//!
//! [`SnippetService`] owns the snippet registry, user variables and the
//! session of one document. Hosts forward their edit and mode notifications
//! and drain debounced synchronization ticks with [`SnippetService::poll_sync`].

use std::path::Path;

use stencil_primitives::{Document, Mode, SeqDirection};
use stencil_registry::{CompleteItem, LoadError, SnippetRegistry};
use stencil_snippet::{
	SnippetBody, SnippetChoiceOverlay, SnippetError, SnippetSession, VarContext, VarRegistry, parse_snippet_template,
	render_with_resolver,
};

use crate::config::Config;
use crate::debounce::SyncScheduler;

#[derive(Debug)]
pub struct SnippetService {
	session: SnippetSession,
	registry: SnippetRegistry,
	variables: VarRegistry,
	config: Config,
	scheduler: SyncScheduler,
	mode: Mode,
	/// Set while an expansion is live and notifications matter.
	listening: bool,
}

impl Default for SnippetService {
	fn default() -> Self {
		Self::new(Config::default())
	}
}

impl SnippetService {
	pub fn new(config: Config) -> Self {
		let scheduler = SyncScheduler::new(config.sync_delay());
		Self {
			session: SnippetSession::new(),
			registry: SnippetRegistry::new(),
			variables: VarRegistry::new(),
			config,
			scheduler,
			mode: Mode::Insert,
			listening: false,
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn session(&self) -> &SnippetSession {
		&self.session
	}

	pub fn registry(&self) -> &SnippetRegistry {
		&self.registry
	}

	pub fn mode(&self) -> Mode {
		self.mode
	}

	pub fn is_active(&self) -> bool {
		self.session.is_active()
	}

	/// Loads a snippet file for `filetypes`. Other sources are untouched when
	/// it fails.
	pub fn load(&mut self, path: &Path, filetypes: &[&str]) -> Result<usize, LoadError> {
		self.registry.load(path, filetypes).inspect_err(|err| {
			tracing::error!(path = %path.display(), %err, "failed to load snippet file");
		})
	}

	/// Loads every configured source, skipping the ones that fail. Returns
	/// the number of snippets loaded.
	pub fn load_configured(&mut self) -> usize {
		let sources = self.config.sources.clone();
		sources
			.iter()
			.filter_map(|source| {
				let filetypes: Vec<&str> = source.filetypes.iter().map(String::as_str).collect();
				self.load(&source.path, &filetypes).ok()
			})
			.sum()
	}

	/// Registers a variable resolved by `callback`, which receives the
	/// rendered default text. Registered variables shadow built-in ones.
	pub fn register_variable(&mut self, name: impl Into<String>, callback: impl Fn(&str) -> Option<String> + Send + Sync + 'static) {
		self.variables.register(name, callback);
	}

	/// Whether the text before the cursor ends with a snippet prefix.
	pub fn expandable<D>(&self, doc: &D) -> bool
	where
		D: Document + ?Sized,
	{
		self.registry.search(doc.filetype(), &doc.text_before_cursor()).is_some()
	}

	/// Expands the snippet whose prefix the cursor follows, replacing the
	/// prefix. Returns `Ok(false)` when nothing matched or the snippet had no
	/// stop to navigate.
	pub fn expand<D>(&mut self, doc: &mut D) -> Result<bool, SnippetError>
	where
		D: Document + ?Sized,
	{
		let line = doc.text_before_cursor();
		let Some(found) = self.registry.search(doc.filetype(), &line) else {
			return Ok(false);
		};
		let prefix = found.prefix.to_string();
		let body = found.snippet.body.clone();
		tracing::debug!(snippet = %found.snippet.name, %prefix, "expanding snippet");
		self.anonymous(doc, body, Some(&prefix))
	}

	/// Expands `body` at the cursor, removing `prefix` before it when present.
	pub fn anonymous<D>(&mut self, doc: &mut D, body: impl Into<SnippetBody>, prefix: Option<&str>) -> Result<bool, SnippetError>
	where
		D: Document + ?Sized,
	{
		let body = body.into().join(doc.newline());
		let context = VarContext::from_document(&*doc);
		let resolver = self.variables.scoped(context);
		let active = self.session.expand(doc, &body, prefix, &resolver)?;
		if active {
			self.listening = true;
		}
		Ok(active)
	}

	pub fn jumpable(&self, dir: i64) -> Result<bool, SnippetError> {
		Ok(self.session.jumpable(direction(dir)?))
	}

	/// Moves to the next (`1`) or previous (`-1`) stop.
	pub fn jump<D>(&mut self, doc: &mut D, dir: i64) -> Result<bool, SnippetError>
	where
		D: Document + ?Sized,
	{
		let direction = direction(dir)?;
		if !self.session.is_active() {
			return Ok(false);
		}
		if self.mode.is_editing() {
			let tabstop = self.session.current_node().map(|node| node.tabstop);
			self.force_update(doc, tabstop);
		}

		self.session.guard();
		let moved = self.session.jump(doc, direction);
		self.session.unguard();

		let on_zero = self.session.current_node().is_some_and(|node| node.tabstop == 0);
		if self.config.drop_on_zero && on_zero && self.session.is_top_level() {
			tracing::debug!("reached final stop, dropping snippet");
			self.drop_session(doc);
		}
		self.settle();
		Ok(moved)
	}

	pub fn choosable(&self) -> bool {
		self.session.choosable()
	}

	/// Cycles the focused choice forward (`1`) or backward (`-1`).
	pub fn choice<D>(&mut self, doc: &mut D, dir: i64) -> Result<bool, SnippetError>
	where
		D: Document + ?Sized,
	{
		let direction = direction(dir)?;
		self.scheduler.cancel();
		let changed = self.session.choice(doc, direction);
		self.settle();
		Ok(changed)
	}

	pub fn choice_overlay(&self) -> Option<SnippetChoiceOverlay> {
		self.session.choice_overlay()
	}

	/// Completion items for the document's filetype.
	pub fn complete_items<D>(&self, doc: &D) -> Vec<CompleteItem>
	where
		D: Document + ?Sized,
	{
		self.registry.complete_items(doc.filetype())
	}

	/// Renders `body` to plain text, for previews.
	pub fn render_to_text(&self, body: &str) -> Result<String, SnippetError> {
		let template = parse_snippet_template(body)?;
		let rendered = render_with_resolver(&template, &self.variables.scoped(VarContext::detached()));
		if rendered.text.is_empty() {
			return Err(SnippetError::EmptyRender);
		}
		Ok(rendered.text)
	}

	/// Text edit notification. Schedules a debounced synchronization.
	pub fn on_text_changed<D>(&mut self, doc: &mut D)
	where
		D: Document + ?Sized,
	{
		if !self.listening || self.session.is_guarded() {
			return;
		}
		if self.scheduler.schedule().is_some() {
			// Zero delays and hosts without a runtime get the tick right away.
			self.poll_sync(doc);
		}
	}

	/// Mode change notification. Leaving for normal mode ends the session.
	pub fn on_mode_changed<D>(&mut self, doc: &mut D, mode: Mode)
	where
		D: Document + ?Sized,
	{
		self.mode = mode;
		if !self.listening || self.session.is_guarded() || mode != Mode::Normal {
			return;
		}
		self.force_update(doc, None);
		self.drop_session(doc);
	}

	/// Runs a due debounced synchronization. Returns true when one ran.
	pub fn poll_sync<D>(&mut self, doc: &mut D) -> bool
	where
		D: Document + ?Sized,
	{
		if !self.scheduler.take_due() {
			return false;
		}
		self.run_sync(doc)
	}

	/// Waits for the next debounced tick, consuming it. Follow with
	/// [`sync_now`](Self::sync_now).
	pub async fn next_tick(&mut self) -> Option<u64> {
		self.scheduler.next_tick().await
	}

	/// Synchronizes the focused tabstop immediately.
	pub fn sync_now<D>(&mut self, doc: &mut D) -> bool
	where
		D: Document + ?Sized,
	{
		self.scheduler.cancel();
		self.run_sync(doc)
	}

	/// Leaves the innermost snippet.
	pub fn drop_session<D>(&mut self, doc: &mut D)
	where
		D: Document + ?Sized,
	{
		self.session.drop(doc);
		self.settle();
	}

	fn run_sync<D>(&mut self, doc: &mut D) -> bool
	where
		D: Document + ?Sized,
	{
		if !self.session.is_active() || self.session.is_guarded() {
			return false;
		}
		let tabstop = self.session.current_node().map(|node| node.tabstop);
		tracing::trace!(tabstop = ?tabstop, generation = self.scheduler.generation(), "debounced sync");
		self.session.update(doc, tabstop);
		self.settle();
		true
	}

	fn force_update<D>(&mut self, doc: &mut D, tabstop: Option<u32>)
	where
		D: Document + ?Sized,
	{
		self.scheduler.cancel();
		self.session.update(doc, tabstop);
	}

	/// Stops listening once the session ended.
	fn settle(&mut self) {
		if self.listening && !self.session.is_active() {
			self.listening = false;
			self.scheduler.cancel();
			tracing::debug!("snippet session ended");
		}
	}
}

fn direction(dir: i64) -> Result<SeqDirection, SnippetError> {
	SeqDirection::from_step(dir).ok_or(SnippetError::InvalidDirection(dir))
}
