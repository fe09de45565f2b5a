use hyper::{Request, Response, StatusCode};
use serde_json::json;
use utils::make_response;

use super::error::Result;
use super::Body;

pub async fn health<B>(_: Request<B>) -> Result<Response<Body>> {
	Ok(make_response!(StatusCode::OK, json!({ "status": "ok" })))
}
