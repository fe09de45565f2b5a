use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode};
use utils::http::router::Router;
use utils::prelude::FutureTimeout;
use utils::http::RouteError;

use crate::api::error::ApiError;
use crate::api::{routes, run, Body};
use crate::config::AppConfig;
use crate::tests::global::{mock_global_state, GlobalState};

mod images;
mod schools;

const BOUNDARY: &str = "school-form-boundary";

pub fn router(global: &Arc<GlobalState>) -> Router<Full<Bytes>, Body, RouteError<ApiError>> {
	routes::<GlobalState, Full<Bytes>>(global)
}

/// Encodes text fields and an optional `(file name, data)` image part.
pub fn multipart(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
	let mut body = Vec::new();

	for (name, value) in fields {
		body.extend_from_slice(
			format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
		);
	}

	if let Some((file_name, data)) = image {
		body.extend_from_slice(
			format!(
				"--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
			)
			.as_bytes(),
		);
		body.extend_from_slice(data);
		body.extend_from_slice(b"\r\n");
	}

	body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
	body
}

pub fn valid_fields() -> Vec<(&'static str, &'static str)> {
	vec![
		("name", "Oak Elementary"),
		("address", "1 Oak St"),
		("city", "Springfield"),
		("state", "IL"),
		("contact", "5551234567"),
		("email_id", "info@oak.edu"),
	]
}

pub fn post_form(body: Vec<u8>) -> Request<Full<Bytes>> {
	Request::builder()
		.method("POST")
		.uri("/api/schools")
		.header("Content-Type", format!("multipart/form-data; boundary={BOUNDARY}"))
		.body(Full::new(Bytes::from(body)))
		.unwrap()
}

pub fn get(uri: &str) -> Request<Full<Bytes>> {
	Request::builder().uri(uri).body(Full::new(Bytes::new())).unwrap()
}

pub async fn body_bytes(res: Response<Body>) -> Bytes {
	res.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(res: Response<Body>) -> serde_json::Value {
	serde_json::from_slice(&body_bytes(res).await).unwrap()
}

#[tokio::test]
async fn test_health() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	let res = router.handle(get("/api/health")).await.unwrap();
	assert_eq!(res.status(), StatusCode::OK);
	assert_eq!(body_json(res).await, serde_json::json!({ "status": "ok" }));

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_unknown_route() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	for req in [
		get("/api/unknown"),
		get("/"),
		Request::builder()
			.method("DELETE")
			.uri("/api/schools")
			.body(Full::new(Bytes::new()))
			.unwrap(),
	] {
		let res = router.handle(req).await.unwrap();
		assert_eq!(res.status(), StatusCode::NOT_FOUND);
		assert_eq!(body_json(res).await, serde_json::json!({ "error": "not found" }));
	}

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_api_serves_over_tcp() {
	let port = portpicker::pick_unused_port().expect("failed to pick port");

	let mut config = AppConfig::default();
	config.extra.api.bind_address = SocketAddr::from(([127, 0, 0, 1], port));

	let (global, handler) = mock_global_state(config).await;

	let handle = tokio::spawn(run(global.clone()));

	// Give the listener time to bind.
	tokio::time::sleep(Duration::from_millis(300)).await;

	let client = reqwest::Client::new();
	let base = format!("http://127.0.0.1:{port}");

	let mut form = reqwest::multipart::Form::new();
	for (name, value) in valid_fields() {
		form = form.text(name, value);
	}
	form = form.part(
		"image",
		reqwest::multipart::Part::bytes(b"\x89PNG fake".to_vec()).file_name("logo.png"),
	);

	let resp = client
		.post(format!("{base}/api/schools"))
		.multipart(form)
		.send()
		.await
		.expect("failed to add school");
	assert_eq!(resp.status(), StatusCode::OK);
	assert_eq!(
		resp.json::<serde_json::Value>().await.unwrap(),
		serde_json::json!({ "message": "School added successfully" })
	);

	let resp = client
		.get(format!("{base}/api/schools"))
		.send()
		.await
		.expect("failed to list schools");
	assert_eq!(resp.status(), StatusCode::OK);
	let list = resp.json::<serde_json::Value>().await.unwrap();
	let image = list["schools"][0]["image"].as_str().unwrap().to_owned();
	assert!(image.starts_with("/schoolImages/"));
	assert!(image.ends_with("_logo.png"));

	let resp = client.get(format!("{base}{image}")).send().await.expect("failed to fetch image");
	assert_eq!(resp.status(), StatusCode::OK);
	assert_eq!(resp.headers()["content-type"], "image/png");
	assert_eq!(resp.bytes().await.unwrap().as_ref(), b"\x89PNG fake");

	// Keep-alive connections would otherwise outlive the test.
	drop(client);
	drop(global);

	handler
		.cancel()
		.timeout(Duration::from_secs(1))
		.await
		.expect("failed to cancel context");
	handle
		.timeout(Duration::from_secs(1))
		.await
		.expect("failed to cancel api")
		.expect("api failed")
		.expect("api failed");
}

#[tokio::test]
async fn test_api_bad_bind() {
	let port = portpicker::pick_unused_port().expect("failed to pick port");
	let taken = std::net::TcpListener::bind(("127.0.0.1", port)).expect("failed to bind");

	let mut config = AppConfig::default();
	config.extra.api.bind_address = taken.local_addr().unwrap();

	let (global, handler) = mock_global_state(config).await;

	assert!(run(global).await.is_err());

	handler
		.cancel()
		.timeout(Duration::from_secs(1))
		.await
		.expect("failed to cancel context");
}
