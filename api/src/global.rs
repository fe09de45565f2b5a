use binary_helper::global::{GlobalConfig, GlobalConfigProvider, GlobalCtx};

use crate::config::{ApiConfig, UploadConfig};
use crate::drive::LocalDrive;
use crate::repository::SchoolRepository;

pub trait SchoolState {
	fn repository(&self) -> &dyn SchoolRepository;

	fn drive(&self) -> &LocalDrive;
}

pub trait SchoolGlobal:
	GlobalCtx + GlobalConfigProvider<ApiConfig> + GlobalConfigProvider<UploadConfig> + GlobalConfig + SchoolState + Send + Sync + 'static
{
}

impl<T> SchoolGlobal for T where
	T: GlobalCtx
		+ GlobalConfigProvider<ApiConfig>
		+ GlobalConfigProvider<UploadConfig>
		+ GlobalConfig
		+ SchoolState
		+ Send
		+ Sync
		+ 'static
{
}
