use crate::database::{NewSchool, SchoolSummary};

mod postgres;

pub use self::postgres::PgSchoolRepository;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
	#[error("database: {0}")]
	Database(#[from] utils::database::Error),
	#[error("repository is closed")]
	Closed,
}

/// Storage for school records. Records are only ever inserted and listed.
#[async_trait::async_trait]
pub trait SchoolRepository: Send + Sync + 'static {
	async fn insert(&self, school: &NewSchool) -> Result<(), RepositoryError>;

	/// Every record, newest first.
	async fn list(&self) -> Result<Vec<SchoolSummary>, RepositoryError>;

	/// Releases the underlying connections; later calls fail with
	/// [`RepositoryError::Closed`].
	async fn close(&self);
}
