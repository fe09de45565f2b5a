use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::io::AsyncWriteExt;

/// URL prefix uploaded images are served under.
pub const PUBLIC_PREFIX: &str = "/schoolImages";

const MAX_NAME_LEN: usize = 125;

/// Stored names are `{unix_millis}_{name}`; on a collision the timestamp is
/// bumped until a free name is found.
const MAX_NAME_ATTEMPTS: i64 = 16;

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
	#[error("io: {0}")]
	Io(#[from] io::Error),
	#[error("invalid file name: {0}")]
	InvalidName(String),
	#[error("no free file name for {0}")]
	NameExhausted(String),
}

/// Reduces a client supplied file name to a safe local one: only the last
/// path component survives and anything outside `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize(name: &str) -> String {
	let name = name.rsplit(['/', '\\']).next().unwrap_or_default();

	let sanitized = name
		.chars()
		.map(|c| match c {
			'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => c,
			_ => '_',
		})
		.take(MAX_NAME_LEN)
		.collect::<String>();

	if sanitized.trim_matches(['.', '_']).is_empty() {
		"image".to_owned()
	} else {
		sanitized
	}
}

/// Image storage on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalDrive {
	path: PathBuf,
}

impl LocalDrive {
	#[tracing::instrument(name = "LocalDrive::new", err)]
	pub async fn new(path: &Path) -> Result<Self, DriveError> {
		tracing::debug!("setting up local drive");

		tokio::fs::create_dir_all(path).await?;

		Ok(Self { path: path.to_owned() })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn resolve(&self, name: &str) -> Result<PathBuf, DriveError> {
		if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\', '\0']) {
			return Err(DriveError::InvalidName(name.to_owned()));
		}

		Ok(self.path.join(name))
	}

	#[tracing::instrument(skip(self), name = "LocalDrive::read", err)]
	pub async fn read(&self, name: &str) -> Result<Bytes, DriveError> {
		tracing::debug!("reading file");

		Ok(tokio::fs::read(self.resolve(name)?).await?.into())
	}

	/// Writes `data` under a new name; an existing file is never replaced.
	#[tracing::instrument(skip(self, data), name = "LocalDrive::write", err, fields(size = data.len()))]
	pub async fn write(&self, name: &str, data: &[u8]) -> Result<(), DriveError> {
		tracing::debug!("writing file");

		let mut file = tokio::fs::OpenOptions::new()
			.write(true)
			.create_new(true)
			.open(self.resolve(name)?)
			.await?;

		file.write_all(data).await?;
		file.flush().await?;

		Ok(())
	}

	#[tracing::instrument(skip(self), name = "LocalDrive::delete", err)]
	pub async fn delete(&self, name: &str) -> Result<(), DriveError> {
		tracing::debug!("deleting file");

		tokio::fs::remove_file(self.resolve(name)?).await?;
		Ok(())
	}
}

/// An image written by [`store_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
	/// Name of the file inside the drive.
	pub file_name: String,
	/// Public path, `/schoolImages/{file_name}`.
	pub path: String,
}

/// Writes an uploaded image and returns where it can be fetched from.
/// Nothing is written for an empty payload.
pub async fn store_image(drive: &LocalDrive, original_name: &str, data: &[u8]) -> Result<Option<StoredImage>, DriveError> {
	if data.is_empty() {
		return Ok(None);
	}

	let name = sanitize(original_name);
	let millis = chrono::Utc::now().timestamp_millis();

	for attempt in 0..MAX_NAME_ATTEMPTS {
		let file_name = format!("{}_{name}", millis + attempt);

		match drive.write(&file_name, data).await {
			Ok(()) => {
				return Ok(Some(StoredImage {
					path: format!("{PUBLIC_PREFIX}/{file_name}"),
					file_name,
				}));
			}
			Err(DriveError::Io(err)) if err.kind() == io::ErrorKind::AlreadyExists => continue,
			Err(err) => return Err(err),
		}
	}

	Err(DriveError::NameExhausted(name))
}
