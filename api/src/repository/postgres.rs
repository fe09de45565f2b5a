use std::sync::Arc;

use utils::database::Pool;

use super::{RepositoryError, SchoolRepository};
use crate::database::{NewSchool, SchoolSummary};

pub struct PgSchoolRepository {
	db: Arc<Pool>,
}

impl PgSchoolRepository {
	pub fn new(db: Arc<Pool>) -> Self {
		Self { db }
	}

	fn pool(&self) -> Result<&Pool, RepositoryError> {
		if self.db.is_closed() {
			return Err(RepositoryError::Closed);
		}

		Ok(&self.db)
	}
}

#[async_trait::async_trait]
impl SchoolRepository for PgSchoolRepository {
	#[tracing::instrument(skip_all, fields(name = %school.name), err)]
	async fn insert(&self, school: &NewSchool) -> Result<(), RepositoryError> {
		utils::database::query(
			"INSERT INTO schools (name, address, city, state, contact, email_id, image) VALUES ($1, $2, $3, $4, $5, $6, $7)",
		)
		.bind(&school.name)
		.bind(&school.address)
		.bind(&school.city)
		.bind(&school.state)
		.bind(school.contact)
		.bind(&school.email_id)
		.bind(&school.image)
		.build()
		.execute(self.pool()?)
		.await?;

		Ok(())
	}

	#[tracing::instrument(skip_all, err)]
	async fn list(&self) -> Result<Vec<SchoolSummary>, RepositoryError> {
		Ok(
			utils::database::query("SELECT id, name, address, city, image FROM schools ORDER BY id DESC")
				.build_query_as::<SchoolSummary>()
				.fetch_all(self.pool()?)
				.await?,
		)
	}

	async fn close(&self) {
		tracing::debug!("closing database pool");
		self.db.close();
	}
}
