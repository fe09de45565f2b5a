use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use tokio::signal::unix::SignalKind;
use tokio::{select, time};
use utils::context::Context;
use utils::signal::SignalHandler;

pub use self::config::Config;
pub use self::global::Global;

pub mod config;
pub mod global;
pub mod logging;

/// How long running tasks get to wind down after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(60);

/// Runs a service: parses the config, initialises logging, builds the global
/// state and drives `process` until it exits or a SIGINT/SIGTERM arrives.
///
/// On shutdown the root context is cancelled and every holder of it gets
/// [`SHUTDOWN_GRACE`] to finish; a second signal skips the wait.
pub async fn bootstrap<C: Config, G: Global<C>, F: Future<Output = anyhow::Result<()>> + Send + 'static>(
	process: impl FnOnce(Arc<G>) -> F,
) -> anyhow::Result<()> {
	let (ctx, handler) = Context::new();

	let config = match C::parse().and_then(|mut config| {
		config.pre_hook()?;
		Ok(config)
	}) {
		Ok(config) => config,
		Err(err) => {
			logging::init("trace", Default::default()).context("failed to init logging")?;
			return Err(err.context("failed to parse config"));
		}
	};

	logging::init(&config.logging().level, config.logging().mode).context("failed to init logging")?;

	tracing::info!(name = config.name(), "starting up");

	let global = Arc::new(G::new(ctx, config).await.context("failed to create global state")?);

	tracing::debug!("global state created, starting process");

	let process_future = tokio::spawn(process(global));

	let mut signal_handler = SignalHandler::new()
		.with_signal(SignalKind::interrupt())
		.with_signal(SignalKind::terminate());

	let result = select! {
		_ = signal_handler.recv() => {
			tracing::info!("shutting down");
			Ok(())
		}
		r = process_future => match r {
			Ok(Ok(())) => {
				tracing::warn!("process exited before shutdown was requested");
				Ok(())
			}
			Ok(Err(err)) => Err(err.context("process stopped unexpectedly")),
			Err(err) => Err(anyhow::Error::from(err).context("process task failed")),
		},
	};

	tracing::info!("waiting for tasks to finish");

	select! {
		_ = time::sleep(SHUTDOWN_GRACE) => tracing::warn!("force shutting down"),
		_ = signal_handler.recv() => tracing::warn!("force shutting down"),
		_ = handler.cancel() => tracing::info!("shutting down"),
	}

	result
}
