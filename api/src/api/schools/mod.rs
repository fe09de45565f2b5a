use std::sync::Arc;

use binary_helper::global::RequestGlobalExt;
use bytes::Bytes;
use hyper::{Request, Response, StatusCode};
use serde_json::json;
use utils::http::ext::ResultExt;
use utils::http::router::builder::RouterBuilder;
use utils::http::router::Router;
use utils::http::RouteError;
use utils::make_response;

use super::error::{ApiError, Result};
use super::Body;
use crate::config::UploadConfig;
use crate::drive;
use crate::global::SchoolGlobal;
use crate::validation;

pub mod form;

pub fn routes<G: SchoolGlobal, B>(_: &Arc<G>) -> RouterBuilder<B, Body, RouteError<ApiError>>
where
	B: hyper::body::Body<Data = Bytes> + Send + 'static,
	B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
	Router::builder().get("/", list::<G, B>).post("/", create::<G, B>)
}

/// Registers a school from a multipart form with an optional `image` file.
///
/// The image is written before the row is inserted; when the insert fails
/// the image is deleted again.
async fn create<G: SchoolGlobal, B>(req: Request<B>) -> Result<Response<Body>>
where
	B: hyper::body::Body<Data = Bytes> + Send + 'static,
	B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
	let global = req.get_global::<G>()?;

	let max_image_size = global.config::<UploadConfig>().max_image_size;
	let form = form::parse(req, max_image_size).await?;

	let mut school = match validation::validate(&form.fields) {
		Ok(school) => school,
		Err(details) => {
			tracing::debug!(fields = ?details.iter().map(|e| e.field).collect::<Vec<_>>(), "validation failed");

			return Err(make_response!(
				StatusCode::BAD_REQUEST,
				json!({
					"error": "Validation failed",
					"details": details,
				})
			)
			.into());
		}
	};

	let stored = match &form.image {
		Some(image) => drive::store_image(global.drive(), &image.file_name, &image.data)
			.await
			.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "Failed to add school"))?,
		None => None,
	};

	if let Some(stored) = &stored {
		school.image.clone_from(&stored.path);
	}

	if let Err(err) = global.repository().insert(&school).await {
		if let Some(stored) = &stored {
			if let Err(err) = global.drive().delete(&stored.file_name).await {
				tracing::warn!(file = %stored.file_name, error = %err, "failed to remove image of a rejected school, upload leaked");
			}
		}

		return Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to add school", err).into());
	}

	tracing::info!(name = %school.name, image = %school.image, "school added");

	Ok(make_response!(
		StatusCode::OK,
		json!({
			"message": "School added successfully",
		})
	))
}

async fn list<G: SchoolGlobal, B>(req: Request<B>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;

	let schools = global
		.repository()
		.list()
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch schools"))?;

	Ok(make_response!(
		StatusCode::OK,
		json!({
			"schools": schools,
		})
	))
}
