use std::sync::Arc;

use anyhow::Context as _;
use binary_helper::global::{setup_database, GlobalConfigProvider};
use binary_helper::{bootstrap, impl_global_traits};
use school_api::config::{ApiConfig, AppConfig, UploadConfig};
use school_api::drive::LocalDrive;
use school_api::global::SchoolState;
use school_api::repository::{PgSchoolRepository, SchoolRepository};
use utils::context::Context;
use utils::database::Pool;

struct GlobalState {
	ctx: Context,
	db: Arc<Pool>,
	config: AppConfig,
	repository: PgSchoolRepository,
	drive: LocalDrive,
}

impl_global_traits!(GlobalState);

impl GlobalConfigProvider<ApiConfig> for GlobalState {
	#[inline(always)]
	fn provide_config(&self) -> &ApiConfig {
		&self.config.extra.api
	}
}

impl GlobalConfigProvider<UploadConfig> for GlobalState {
	#[inline(always)]
	fn provide_config(&self) -> &UploadConfig {
		&self.config.extra.upload
	}
}

impl SchoolState for GlobalState {
	#[inline(always)]
	fn repository(&self) -> &dyn SchoolRepository {
		&self.repository
	}

	#[inline(always)]
	fn drive(&self) -> &LocalDrive {
		&self.drive
	}
}

impl binary_helper::Global<AppConfig> for GlobalState {
	async fn new(ctx: Context, config: AppConfig) -> anyhow::Result<Self> {
		let db = setup_database(&config.database).await?;
		let repository = PgSchoolRepository::new(db.clone());
		let drive = LocalDrive::new(&config.extra.upload.directory)
			.await
			.context("failed to set up upload directory")?;

		Ok(Self {
			ctx,
			db,
			config,
			repository,
			drive,
		})
	}
}

#[tokio::main]
pub async fn main() {
	if let Err(err) = bootstrap::<AppConfig, GlobalState, _>(|global| async move {
		if global.config.database.migrate {
			school_api::migration::run_migrations(&global)
				.await
				.context("failed to run migrations")?;
		}

		school_api::api::run(global).await.context("api stopped unexpectedly")
	})
	.await
	{
		tracing::error!("{:#}", err);
		std::process::exit(1);
	}
}
