use std::sync::{Arc, Weak};
use std::time::Duration;

use anyhow::Context as _;
use hyper::StatusCode;
use utils::context::Context;
use utils::database::deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use utils::database::tokio_postgres::config::SslMode;
use utils::database::tokio_postgres::NoTls;
use utils::http::RouteError;
use utils::prelude::FutureTimeout;

use crate::config::{Config, DatabaseConfig};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Implements the accessor traits for a global state struct that has `ctx`
/// and `db` fields.
#[macro_export]
macro_rules! impl_global_traits {
	($struct:ty) => {
		impl $crate::global::GlobalCtx for $struct {
			#[inline(always)]
			fn ctx(&self) -> &::utils::context::Context {
				&self.ctx
			}
		}

		impl $crate::global::GlobalDb for $struct {
			#[inline(always)]
			fn db(&self) -> &::std::sync::Arc<::utils::database::Pool> {
				&self.db
			}
		}

		impl $crate::global::GlobalConfig for $struct {}
	};
}

#[allow(async_fn_in_trait)]
pub trait Global<C: Config> {
	async fn new(ctx: Context, config: C) -> anyhow::Result<Self>
	where
		Self: Sized;
}

pub trait GlobalCtx {
	fn ctx(&self) -> &Context;
}

pub trait GlobalConfig {
	#[inline(always)]
	fn config<C>(&self) -> &C
	where
		Self: GlobalConfigProvider<C>,
	{
		GlobalConfigProvider::provide_config(self)
	}
}

pub trait GlobalConfigProvider<C> {
	fn provide_config(&self) -> &C;
}

pub trait GlobalDb {
	fn db(&self) -> &Arc<Pool>;
}

#[tracing::instrument(skip(config), fields(max_connections = config.max_connections), err)]
pub async fn setup_database(config: &DatabaseConfig) -> anyhow::Result<Arc<Pool>> {
	let mut pg_config = config
		.uri
		.parse::<utils::database::tokio_postgres::Config>()
		.context("invalid database uri")?;

	pg_config.ssl_mode(SslMode::Disable);

	let manager = Manager::from_config(
		pg_config,
		NoTls,
		ManagerConfig {
			recycling_method: RecyclingMethod::Fast,
		},
	);

	let pool = Pool::builder(manager)
		.max_size(config.max_connections)
		.runtime(Runtime::Tokio1)
		.build()
		.context("failed to create database pool")?;

	let conn = pool
		.get()
		.timeout(CONNECT_TIMEOUT)
		.await
		.context("timed out connecting to database")?
		.context("failed to connect to database")?;
	drop(conn);

	tracing::debug!("database pool ready");

	Ok(Arc::new(pool))
}

pub trait RequestGlobalExt<E> {
	fn get_global<G: Sync + Send + 'static>(&self) -> std::result::Result<Arc<G>, RouteError<E>>;
}

impl<E, B> RequestGlobalExt<E> for hyper::Request<B> {
	fn get_global<G: Sync + Send + 'static>(&self) -> std::result::Result<Arc<G>, RouteError<E>> {
		Ok(self
			.extensions()
			.get::<Weak<G>>()
			.ok_or((StatusCode::INTERNAL_SERVER_ERROR, "global state not set"))?
			.upgrade()
			.ok_or((StatusCode::INTERNAL_SERVER_ERROR, "failed to upgrade global state"))?)
	}
}
