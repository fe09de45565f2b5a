use std::fmt::{Display, Formatter};
use std::sync::Arc;

use tokio::sync::{broadcast, oneshot};
use tokio::time::Instant;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CancelReason {
	Deadline,
	Cancel,
}

impl Display for CancelReason {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Deadline => write!(f, "Deadline"),
			Self::Cancel => write!(f, "Cancel"),
		}
	}
}

struct RawContext {
	// Dropped together with the last clone of the context, which is what
	// `Handler::cancel` waits for.
	_alive: oneshot::Sender<()>,
	deadline: Option<Instant>,
	cancel: broadcast::Receiver<()>,
}

/// A cloneable shutdown signal handed to every long running task.
///
/// The paired [`Handler`] cancels the context and then waits until every
/// clone has been dropped.
#[derive(Clone)]
pub struct Context(Arc<RawContext>);

pub struct Handler {
	alive: oneshot::Receiver<()>,
	cancel: broadcast::Sender<()>,
}

impl Context {
	#[must_use]
	pub fn new() -> (Self, Handler) {
		Self::build(None)
	}

	#[must_use]
	pub fn with_deadline(deadline: Instant) -> (Self, Handler) {
		Self::build(Some(deadline))
	}

	#[must_use]
	pub fn with_timeout(timeout: std::time::Duration) -> (Self, Handler) {
		Self::with_deadline(Instant::now() + timeout)
	}

	fn build(deadline: Option<Instant>) -> (Self, Handler) {
		let (alive_send, alive_recv) = oneshot::channel();
		let (cancel_send, cancel_recv) = broadcast::channel(1);

		(
			Self(Arc::new(RawContext {
				_alive: alive_send,
				deadline,
				cancel: cancel_recv,
			})),
			Handler {
				alive: alive_recv,
				cancel: cancel_send,
			},
		)
	}

	/// Resolves once the context is cancelled or its deadline passes.
	pub async fn done(&self) -> CancelReason {
		let mut cancel = self.0.cancel.resubscribe();

		match self.0.deadline {
			Some(deadline) => {
				tokio::select! {
					_ = tokio::time::sleep_until(deadline) => CancelReason::Deadline,
					_ = cancel.recv() => CancelReason::Cancel,
				}
			}
			None => {
				let _ = cancel.recv().await;
				CancelReason::Cancel
			}
		}
	}
}

impl Handler {
	/// Waits until every clone of the context has been dropped.
	pub async fn done(&mut self) {
		let _ = (&mut self.alive).await;
	}

	/// Cancels the context and waits until every clone has been dropped.
	pub async fn cancel(self) {
		drop(self.cancel);

		let _ = self.alive.await;
	}
}
