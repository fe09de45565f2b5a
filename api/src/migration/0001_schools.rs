use utils::database::deadpool_postgres::Transaction;

use super::Migration;

pub struct CreateSchools;

#[async_trait::async_trait]
impl Migration for CreateSchools {
	fn name(&self) -> &'static str {
		"CreateSchools"
	}

	fn version(&self) -> i32 {
		1
	}

	async fn up(&self, tx: &Transaction<'_>) -> anyhow::Result<()> {
		utils::database::query(
			"CREATE TABLE schools (
				id BIGSERIAL PRIMARY KEY,
				name TEXT NOT NULL,
				address TEXT NOT NULL,
				city TEXT NOT NULL,
				state TEXT NOT NULL,
				contact BIGINT NOT NULL,
				email_id TEXT NOT NULL,
				image TEXT
			);",
		)
		.build()
		.execute(tx)
		.await?;

		Ok(())
	}
}
