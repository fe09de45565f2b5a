use bytes::Bytes;
use http_body_util::Full;
use hyper::{Request, StatusCode};
use serde_json::json;

use super::{body_json, get, multipart, post_form, router, valid_fields};
use crate::config::AppConfig;
use crate::global::SchoolState;
use crate::repository::SchoolRepository;
use crate::tests::global::mock_global_state;

fn upload_count(dir: &std::path::Path) -> usize {
	std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_create_without_image() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	let res = router.handle(post_form(multipart(&valid_fields(), None))).await.unwrap();
	assert_eq!(res.status(), StatusCode::OK);
	assert_eq!(body_json(res).await, json!({ "message": "School added successfully" }));

	let schools = global.repository.schools();
	assert_eq!(schools.len(), 1);
	assert_eq!(schools[0].name, "Oak Elementary");
	assert_eq!(schools[0].contact, 5551234567);
	assert_eq!(schools[0].email_id, "info@oak.edu");
	assert_eq!(schools[0].image, "");
	assert_eq!(upload_count(global.drive().path()), 0);

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_create_with_image() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	let res = router
		.handle(post_form(multipart(&valid_fields(), Some(("my logo.png", b"png bytes".as_slice())))))
		.await
		.unwrap();
	assert_eq!(res.status(), StatusCode::OK);

	let schools = global.repository.schools();
	let image = &schools[0].image;
	assert!(image.starts_with("/schoolImages/"), "{image}");
	assert!(image.ends_with("_my_logo.png"), "{image}");

	let file_name = image.trim_start_matches("/schoolImages/");
	let stored = std::fs::read(global.drive().path().join(file_name)).unwrap();
	assert_eq!(stored, b"png bytes".as_slice());

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_empty_image_is_ignored() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	let res = router
		.handle(post_form(multipart(&valid_fields(), Some(("", &[0u8; 0][..])))))
		.await
		.unwrap();
	assert_eq!(res.status(), StatusCode::OK);
	assert_eq!(global.repository.schools()[0].image, "");
	assert_eq!(upload_count(global.drive().path()), 0);

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_text_image_field_is_ignored() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	let mut fields = valid_fields();
	fields.push(("image", "just some text"));

	let res = router.handle(post_form(multipart(&fields, None))).await.unwrap();
	assert_eq!(res.status(), StatusCode::OK);
	assert_eq!(global.repository.schools()[0].image, "");
	assert_eq!(upload_count(global.drive().path()), 0);

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_missing_fields() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	let fields = valid_fields()
		.into_iter()
		.filter(|(name, _)| *name != "city")
		.map(|(name, value)| if name == "name" { (name, "  ") } else { (name, value) })
		.collect::<Vec<_>>();

	let res = router.handle(post_form(multipart(&fields, None))).await.unwrap();
	assert_eq!(res.status(), StatusCode::BAD_REQUEST);

	let body = body_json(res).await;
	assert_eq!(body["error"], "Validation failed");
	assert_eq!(body["details"][0]["field"], "name");
	assert_eq!(body["details"][0]["code"], "required");
	assert_eq!(body["details"][0]["path"], json!(["name"]));
	assert_eq!(body["details"][1]["field"], "city");
	assert_eq!(body["details"].as_array().unwrap().len(), 2);

	assert!(global.repository.schools().is_empty());

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_invalid_email_and_contact() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	let fields = valid_fields()
		.into_iter()
		.map(|(name, value)| match name {
			"email_id" => (name, "not-an-email"),
			"contact" => (name, "555-1234"),
			_ => (name, value),
		})
		.collect::<Vec<_>>();

	let res = router
		.handle(post_form(multipart(&fields, Some(("logo.png", b"data".as_slice())))))
		.await
		.unwrap();
	assert_eq!(res.status(), StatusCode::BAD_REQUEST);

	let body = body_json(res).await;
	assert_eq!(body["details"][0]["code"], "invalid_contact");
	assert_eq!(body["details"][1]["code"], "invalid_email");

	// A rejected submission leaves nothing behind.
	assert!(global.repository.schools().is_empty());
	assert_eq!(upload_count(global.drive().path()), 0);

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_duplicate_fields_keep_first() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	let mut fields = valid_fields();
	fields.push(("name", "Second Name"));
	fields.push(("website", "https://oak.edu"));

	let res = router.handle(post_form(multipart(&fields, None))).await.unwrap();
	assert_eq!(res.status(), StatusCode::OK);
	assert_eq!(global.repository.schools()[0].name, "Oak Elementary");

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_not_multipart() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	let req = Request::builder()
		.method("POST")
		.uri("/api/schools")
		.header("Content-Type", "application/json")
		.body(Full::new(Bytes::from_static(br#"{"name":"Oak"}"#)))
		.unwrap();

	let res = router.handle(req).await.unwrap();
	assert_eq!(res.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(res).await, json!({ "error": "expected a multipart/form-data body" }));

	let req = Request::builder()
		.method("POST")
		.uri("/api/schools")
		.body(Full::new(Bytes::new()))
		.unwrap();

	let res = router.handle(req).await.unwrap();
	assert_eq!(res.status(), StatusCode::BAD_REQUEST);

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_oversized_image() {
	let mut config = AppConfig::default();
	config.extra.upload.max_image_size = 16;

	let (global, handler) = mock_global_state(config).await;
	let router = router(&global);

	let res = router
		.handle(post_form(multipart(&valid_fields(), Some(("big.png", &[7u8; 64][..])))))
		.await
		.unwrap();
	assert_eq!(res.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(res).await, json!({ "error": "form field too large" }));

	assert!(global.repository.schools().is_empty());
	assert_eq!(upload_count(global.drive().path()), 0);

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_insert_failure_removes_image() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	global.repository.close().await;

	let res = router
		.handle(post_form(multipart(&valid_fields(), Some(("logo.png", b"data".as_slice())))))
		.await
		.unwrap();
	assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body_json(res).await, json!({ "error": "Failed to add school" }));

	assert_eq!(upload_count(global.drive().path()), 0);

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_list_newest_first() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	let res = router.handle(get("/api/schools")).await.unwrap();
	assert_eq!(res.status(), StatusCode::OK);
	assert_eq!(body_json(res).await, json!({ "schools": [] }));

	for name in ["First", "Second"] {
		let fields = valid_fields()
			.into_iter()
			.map(|(field, value)| if field == "name" { (field, name) } else { (field, value) })
			.collect::<Vec<_>>();

		let res = router.handle(post_form(multipart(&fields, None))).await.unwrap();
		assert_eq!(res.status(), StatusCode::OK);
	}

	let res = router.handle(get("/api/schools")).await.unwrap();
	assert_eq!(
		body_json(res).await,
		json!({
			"schools": [
				{ "id": 2, "name": "Second", "address": "1 Oak St", "city": "Springfield", "image": "" },
				{ "id": 1, "name": "First", "address": "1 Oak St", "city": "Springfield", "image": "" },
			]
		})
	);

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_list_failure() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	global.repository.close().await;

	let res = router.handle(get("/api/schools")).await.unwrap();
	assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body_json(res).await, json!({ "error": "Failed to fetch schools" }));

	drop(router);
	drop(global);
	handler.cancel().await;
}
