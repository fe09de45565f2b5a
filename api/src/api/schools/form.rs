use std::collections::HashMap;

use bytes::Bytes;
use hyper::{Request, StatusCode};
use multer::{Constraints, SizeLimit};
use utils::http::ext::{OptionExt, ResultExt};
use utils::http::router::compat::BodyExt;
use utils::http::RouteError;

use crate::api::error::{ApiError, Result};
use crate::validation::FIELDS;

/// Form field carrying the optional image.
pub const IMAGE_FIELD: &str = "image";

const TEXT_FIELD_LIMIT: u64 = 4 * 1024;

/// Room for the text fields and multipart framing on top of the image.
const STREAM_OVERHEAD: u64 = 64 * 1024;

#[derive(Debug, Default)]
pub struct SchoolForm {
	/// Text fields by name. Only the first occurrence of a field is kept.
	pub fields: HashMap<String, String>,
	pub image: Option<UploadedImage>,
}

#[derive(Debug)]
pub struct UploadedImage {
	pub file_name: String,
	pub data: Bytes,
}

fn multipart_error(err: multer::Error) -> RouteError<ApiError> {
	match err {
		multer::Error::FieldSizeExceeded { .. } | multer::Error::StreamSizeExceeded { .. } => {
			(StatusCode::BAD_REQUEST, "form field too large", err).into()
		}
		err => (StatusCode::BAD_REQUEST, "invalid multipart body", err).into(),
	}
}

/// Reads a `multipart/form-data` submission. Unknown fields are skipped.
pub async fn parse<B>(req: Request<B>, max_image_size: u64) -> Result<SchoolForm>
where
	B: hyper::body::Body<Data = Bytes> + Send + 'static,
	B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
	let content_type = req
		.headers()
		.get(hyper::header::CONTENT_TYPE)
		.map_err_route((StatusCode::BAD_REQUEST, "missing content-type header"))?;
	let content_type = content_type
		.to_str()
		.map_ignore_err_route((StatusCode::BAD_REQUEST, "invalid content-type header"))?;

	let boundary = multer::parse_boundary(content_type)
		.map_ignore_err_route((StatusCode::BAD_REQUEST, "expected a multipart/form-data body"))?;

	let size_limit = FIELDS.iter().fold(
		SizeLimit::new()
			.whole_stream(max_image_size + STREAM_OVERHEAD)
			.per_field(TEXT_FIELD_LIMIT)
			.for_field(IMAGE_FIELD, max_image_size),
		|limit, field| limit.for_field(*field, TEXT_FIELD_LIMIT),
	);

	let mut multipart =
		multer::Multipart::with_constraints(req.into_body().into_stream(), boundary, Constraints::new().size_limit(size_limit));

	let mut form = SchoolForm::default();

	while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
		let Some(name) = field.name().map(str::to_owned) else {
			continue;
		};

		if name == IMAGE_FIELD {
			// Only file parts carry an upload; a plain text value is not one.
			let Some(file_name) = field.file_name().map(str::to_owned) else {
				tracing::debug!("ignoring image field without a file name");
				continue;
			};
			let data = field.bytes().await.map_err(multipart_error)?;

			if form.image.is_none() {
				form.image = Some(UploadedImage { file_name, data });
			}
		} else if FIELDS.contains(&name.as_str()) {
			let text = field.text().await.map_err(multipart_error)?;
			form.fields.entry(name).or_insert(text);
		} else {
			tracing::debug!(field = %name, "ignoring unknown form field");
		}
	}

	Ok(form)
}
