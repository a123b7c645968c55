//! Debounced synchronization ticks.
//!
//! Every request supersedes the previous one: the pending sleeper is
//! cancelled and the generation advances, so a tick that was already queued
//! is recognized as stale when it is drained.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Generation-stamped debounce timer.
#[derive(Debug)]
pub struct SyncScheduler {
	delay: Option<Duration>,
	generation: u64,
	pending: Option<CancellationToken>,
	tx: mpsc::UnboundedSender<u64>,
	rx: mpsc::UnboundedReceiver<u64>,
}

impl SyncScheduler {
	/// `delay` of `None` disables scheduling altogether.
	pub fn new(delay: Option<Duration>) -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		Self {
			delay,
			generation: 0,
			pending: None,
			tx,
			rx,
		}
	}

	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// Requests a tick after the delay, superseding any pending request.
	///
	/// Outside a tokio runtime, or with a zero delay, the tick is posted
	/// right away. Returns the generation of the request.
	pub fn schedule(&mut self) -> Option<u64> {
		let delay = self.delay?;
		let generation = self.supersede();

		let handle = match tokio::runtime::Handle::try_current() {
			Ok(handle) if !delay.is_zero() => handle,
			_ => {
				let _ = self.tx.send(generation);
				return Some(generation);
			}
		};

		let cancel = CancellationToken::new();
		self.pending = Some(cancel.clone());
		let tx = self.tx.clone();
		handle.spawn(async move {
			tokio::select! {
				_ = cancel.cancelled() => {}
				_ = tokio::time::sleep(delay) => {
					let _ = tx.send(generation);
				}
			}
		});
		tracing::trace!(generation, delay_ms = delay.as_millis() as u64, "sync scheduled");
		Some(generation)
	}

	/// Drops any pending request.
	pub fn cancel(&mut self) {
		self.supersede();
	}

	/// Drains queued ticks. Returns true when the latest request is due.
	pub fn take_due(&mut self) -> bool {
		let mut due = false;
		while let Ok(generation) = self.rx.try_recv() {
			due |= generation == self.generation;
		}
		if due {
			self.pending = None;
		}
		due
	}

	/// Waits for the latest request to become due and returns its generation.
	pub async fn next_tick(&mut self) -> Option<u64> {
		loop {
			let generation = self.rx.recv().await?;
			if generation == self.generation {
				self.pending = None;
				return Some(generation);
			}
			tracing::trace!(generation, current = self.generation, "stale sync tick");
		}
	}

	fn supersede(&mut self) -> u64 {
		if let Some(pending) = self.pending.take() {
			pending.cancel();
		}
		self.generation = self.generation.wrapping_add(1);
		self.generation
	}
}
