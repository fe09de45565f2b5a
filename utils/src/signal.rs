use tokio::signal::unix::SignalKind;
use tokio::sync::mpsc;

/// Fans several unix signals into a single receiver.
pub struct SignalHandler {
	send: mpsc::Sender<SignalKind>,
	recv: mpsc::Receiver<SignalKind>,
}

impl Default for SignalHandler {
	fn default() -> Self {
		let (send, recv) = mpsc::channel(1);
		Self { send, recv }
	}
}

impl SignalHandler {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_signal(self, kind: SignalKind) -> Self {
		let mut signal = tokio::signal::unix::signal(kind).expect("failed to create signal");

		let send = self.send.clone();
		tokio::spawn(async move {
			while signal.recv().await.is_some() {
				if send.send(kind).await.is_err() {
					break;
				}
			}
		});

		self
	}

	pub async fn recv(&mut self) -> SignalKind {
		self.recv.recv().await.expect("signal channel closed")
	}
}
