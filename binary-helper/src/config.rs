use std::path::Path;

use anyhow::Context as _;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;

use crate::logging;

/// File read when no config file is given explicitly. It is optional.
const DEFAULT_CONFIG_FILE: &str = "config.toml";

pub trait Config {
	fn parse() -> anyhow::Result<Self>
	where
		Self: Sized;

	fn logging(&self) -> &LoggingConfig;

	fn name(&self) -> &str;

	fn pre_hook(&mut self) -> anyhow::Result<()> {
		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// The log level to use, this is a tracing env filter
	pub level: String,

	/// What logging mode we should use
	pub mode: logging::Mode,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			mode: logging::Mode::Default,
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
	/// The database URL to use
	pub uri: String,

	/// Upper bound on pooled connections
	pub max_connections: usize,

	/// Apply pending migrations on startup
	pub migrate: bool,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			uri: "postgres://localhost:5432/schools".to_string(),
			max_connections: 10,
			migrate: true,
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, bound = "")]
pub struct AppConfig<T: ConfigExtension> {
	/// The name of the application
	pub name: String,

	/// The path to the config file
	pub config_file: Option<String>,

	/// The logging configuration
	pub logging: LoggingConfig,

	/// The database configuration
	pub database: DatabaseConfig,

	#[serde(flatten)]
	pub extra: T,
}

pub trait ConfigExtension: serde::Serialize + serde::de::DeserializeOwned + Default {
	const APP_NAME: &'static str;

	/// Prefix of the environment variables overriding config keys, nested
	/// keys are separated by `__`.
	const ENV_PREFIX: &'static str;

	fn config_default() -> AppConfig<Self> {
		AppConfig {
			name: Self::APP_NAME.to_owned(),
			config_file: None,
			logging: Default::default(),
			database: Default::default(),
			extra: Self::default(),
		}
	}

	fn pre_hook(_config: &mut AppConfig<Self>) -> anyhow::Result<()> {
		Ok(())
	}
}

impl<T: ConfigExtension> Default for AppConfig<T> {
	fn default() -> Self {
		T::config_default()
	}
}

#[derive(Debug, clap::Parser)]
#[command(version, about, long_about = None)]
struct Args {
	/// Path to a toml, yaml or json config file
	#[arg(long)]
	config_file: Option<String>,
}

fn file_provider(path: &Path) -> anyhow::Result<Figment> {
	let figment = Figment::new();

	Ok(match path.extension().and_then(|ext| ext.to_str()) {
		Some("toml") => figment.merge(Toml::file(path)),
		Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
		Some("json") => figment.merge(Json::file(path)),
		_ => anyhow::bail!("unsupported config file format: {}", path.display()),
	})
}

impl<T: ConfigExtension> AppConfig<T> {
	/// Layers defaults, then the config file, then the environment.
	///
	/// `config_file` falls back to `{ENV_PREFIX}CONFIG_FILE` and then to
	/// `config.toml` in the working directory, which may be missing.
	pub fn figment(config_file: Option<String>) -> anyhow::Result<Figment> {
		let explicit = config_file.or_else(|| std::env::var(format!("{}CONFIG_FILE", T::ENV_PREFIX)).ok());

		let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

		match &explicit {
			Some(path) => {
				let path = Path::new(path);
				if !path.is_file() {
					anyhow::bail!("config file not found: {}", path.display());
				}

				figment = figment.merge(file_provider(path)?);
			}
			None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
				figment = figment.merge(file_provider(Path::new(DEFAULT_CONFIG_FILE))?);
			}
			None => {}
		}

		Ok(figment.merge(Env::prefixed(T::ENV_PREFIX).split("__")))
	}

	pub fn parse_from<I, S>(args: I) -> anyhow::Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<std::ffi::OsString> + Clone,
	{
		let args = <Args as clap::Parser>::try_parse_from(args)?;

		Self::figment(args.config_file)?
			.extract::<Self>()
			.context("invalid configuration")
	}
}

impl<T: ConfigExtension> Config for AppConfig<T> {
	fn parse() -> anyhow::Result<Self> {
		Self::parse_from(std::env::args_os())
	}

	fn logging(&self) -> &LoggingConfig {
		&self.logging
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn pre_hook(&mut self) -> anyhow::Result<()> {
		T::pre_hook(self)
	}
}
