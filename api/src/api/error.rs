use utils::http::RouteError;

use crate::drive::DriveError;
use crate::repository::RepositoryError;

pub type Result<T, E = RouteError<ApiError>> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
	#[error("failed to parse multipart body: {0}")]
	Multipart(#[from] multer::Error),
	#[error("drive: {0}")]
	Drive(#[from] DriveError),
	#[error("repository: {0}")]
	Repository(#[from] RepositoryError),
}
