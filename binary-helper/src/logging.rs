use std::str::FromStr;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

static RELOAD_HANDLE: OnceCell<reload::Handle<EnvFilter, Registry>> = OnceCell::new();

/// Output format of the log lines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	#[default]
	Default,
	Json,
	Pretty,
	Compact,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
	#[error("invalid logging level: {0}")]
	InvalidLevel(#[from] tracing_subscriber::filter::ParseError),
	#[error("failed to init logger: {0}")]
	Init(#[from] tracing_subscriber::util::TryInitError),
	#[error("failed to reload logger: {0}")]
	Reload(#[from] reload::Error),
}

/// Installs the global subscriber on the first call. Later calls only swap
/// the level filter; the mode is fixed once installed.
pub fn init(level: &str, mode: Mode) -> Result<(), LoggingError> {
	let handle = RELOAD_HANDLE.get_or_try_init(|| {
		let (filter, handle) = reload::Layer::new(EnvFilter::from_str(level)?);
		let registry = tracing_subscriber::registry().with(filter);

		match mode {
			Mode::Default => registry.with(fmt::layer().with_file(true).with_line_number(true)).try_init()?,
			Mode::Json => registry
				.with(fmt::layer().json().with_file(true).with_line_number(true))
				.try_init()?,
			Mode::Pretty => registry
				.with(fmt::layer().pretty().with_file(true).with_line_number(true))
				.try_init()?,
			Mode::Compact => registry
				.with(fmt::layer().compact().with_file(true).with_line_number(true))
				.try_init()?,
		}

		Ok::<_, LoggingError>(handle)
	})?;

	handle.reload(EnvFilter::from_str(level)?)?;

	Ok(())
}
