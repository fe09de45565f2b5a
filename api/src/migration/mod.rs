use std::sync::Arc;

use anyhow::Context;
use binary_helper::global::GlobalDb;
use utils::database::deadpool_postgres::Transaction;

#[path = "0001_schools.rs"]
mod schools;

#[async_trait::async_trait]
trait Migration: Send + Sync {
	fn name(&self) -> &'static str;
	fn version(&self) -> i32;

	async fn up(&self, tx: &Transaction<'_>) -> anyhow::Result<()>;
}

const MIGRATIONS: &[&dyn Migration] = &[&schools::CreateSchools];

#[tracing::instrument(skip(global))]
async fn current_version<G: GlobalDb>(global: &Arc<G>) -> anyhow::Result<usize> {
	utils::database::query("CREATE TABLE IF NOT EXISTS schools_migrations (version INTEGER NOT NULL)")
		.build()
		.execute(global.db())
		.await
		.context("failed to create migration table")?;

	utils::database::query(
		"INSERT INTO schools_migrations (version) SELECT 0 WHERE NOT EXISTS (SELECT 1 FROM schools_migrations)",
	)
	.build()
	.execute(global.db())
	.await
	.context("failed to insert initial migration version")?;

	let version = utils::database::query("SELECT version FROM schools_migrations")
		.build_query_scalar::<i32>()
		.fetch_one(global.db())
		.await
		.context("failed to read migration version")?;

	usize::try_from(version).context("negative migration version")
}

#[tracing::instrument(skip(global, migration), fields(name = migration.name(), version = migration.version()))]
async fn run_migration<G: GlobalDb>(global: &Arc<G>, migration: &dyn Migration) -> anyhow::Result<()> {
	tracing::info!("applying migration");

	let mut client = global.db().get().await.context("failed to get database connection")?;
	let tx = client.transaction().await.context("failed to start transaction")?;

	migration.up(&tx).await.context("failed to apply migration")?;

	utils::database::query("UPDATE schools_migrations SET version = ")
		.push_bind(migration.version())
		.build()
		.execute(&tx)
		.await
		.context("failed to update migration version")?;

	tx.commit().await.context("failed to commit transaction")?;

	tracing::info!("migration applied");

	Ok(())
}

/// Applies every migration newer than the version recorded in the database,
/// each in its own transaction.
#[tracing::instrument(skip(global))]
pub async fn run_migrations<G: GlobalDb>(global: &Arc<G>) -> anyhow::Result<()> {
	let version = current_version(global).await?;

	if version > MIGRATIONS.len() {
		anyhow::bail!(
			"database is at version {}, but only {} migrations are known",
			version,
			MIGRATIONS.len()
		);
	}

	for migration in &MIGRATIONS[version..] {
		run_migration(global, *migration).await?;
	}

	Ok(())
}
