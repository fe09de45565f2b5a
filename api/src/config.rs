use std::net::{Ipv6Addr, SocketAddr};
use std::path::PathBuf;

use crate::drive::PUBLIC_PREFIX;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ApiConfig {
	/// Bind address for the API
	pub bind_address: SocketAddr,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			bind_address: SocketAddr::from((Ipv6Addr::UNSPECIFIED, 4000)),
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UploadConfig {
	/// Directory uploaded images are written to, served under `/schoolImages`
	pub directory: PathBuf,

	/// Largest accepted image in bytes
	pub max_image_size: u64,
}

impl Default for UploadConfig {
	fn default() -> Self {
		Self {
			directory: PathBuf::from(format!("public{PUBLIC_PREFIX}")),
			max_image_size: 10 * 1024 * 1024,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExtConfig {
	pub api: ApiConfig,
	pub upload: UploadConfig,
}

impl binary_helper::config::ConfigExtension for ExtConfig {
	const APP_NAME: &'static str = "school-api";
	const ENV_PREFIX: &'static str = "SCHOOLS_";

	fn pre_hook(config: &mut AppConfig) -> anyhow::Result<()> {
		if config.extra.upload.max_image_size == 0 {
			anyhow::bail!("upload.max_image_size must be greater than zero");
		}

		Ok(())
	}
}

pub type AppConfig = binary_helper::config::AppConfig<ExtConfig>;
