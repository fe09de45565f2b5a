use std::io;
use std::sync::Arc;

use binary_helper::global::RequestGlobalExt;
use http_body_util::Full;
use hyper::header::{CONTENT_SECURITY_POLICY, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use hyper::{Request, Response, StatusCode};
use utils::http::ext::{OptionExt, ResultExt};
use utils::http::router::builder::RouterBuilder;
use utils::http::router::ext::RequestExt;
use utils::http::router::Router;
use utils::http::RouteError;

use super::error::{ApiError, Result};
use super::Body;
use crate::drive::DriveError;
use crate::global::SchoolGlobal;

pub fn routes<G: SchoolGlobal, B: Send + 'static>(_: &Arc<G>) -> RouterBuilder<B, Body, RouteError<ApiError>> {
	Router::builder().get("/:file", serve::<G, B>)
}

/// Uploads are untrusted, so nothing served here may run scripts.
const IMAGE_CSP: &str = "default-src 'none'; sandbox";

/// Content type by extension, for the raster formats browsers render inline.
/// Scriptable formats such as SVG are served as opaque bytes.
fn content_type(name: &str) -> &'static str {
	let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());

	match ext.as_deref() {
		Some("png") => "image/png",
		Some("jpg") | Some("jpeg") => "image/jpeg",
		Some("gif") => "image/gif",
		Some("webp") => "image/webp",
		Some("avif") => "image/avif",
		Some("bmp") => "image/bmp",
		Some("ico") => "image/x-icon",
		_ => "application/octet-stream",
	}
}

async fn serve<G: SchoolGlobal, B>(req: Request<B>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;

	let name = req.param("file").map_err_route((StatusCode::NOT_FOUND, "not found"))?;

	let data = match global.drive().read(name).await {
		Ok(data) => data,
		Err(DriveError::InvalidName(_)) => return Err((StatusCode::NOT_FOUND, "not found").into()),
		Err(DriveError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
			return Err((StatusCode::NOT_FOUND, "not found").into());
		}
		Err(err) => return Err((StatusCode::INTERNAL_SERVER_ERROR, "failed to read image", err).into()),
	};

	Response::builder()
		.status(StatusCode::OK)
		.header(CONTENT_TYPE, content_type(name))
		.header(X_CONTENT_TYPE_OPTIONS, "nosniff")
		.header(CONTENT_SECURITY_POLICY, IMAGE_CSP)
		.body(Full::new(data))
		.map_ignore_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to build response"))
}
