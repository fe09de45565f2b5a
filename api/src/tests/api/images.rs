use hyper::StatusCode;
use serde_json::json;

use super::{body_bytes, body_json, get, multipart, post_form, router, valid_fields};
use crate::config::AppConfig;
use crate::global::SchoolState;
use crate::tests::global::mock_global_state;

#[tokio::test]
async fn test_serve_image() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	global.drive().write("1700000000000_logo.jpg", b"jpeg").await.unwrap();

	let res = router.handle(get("/schoolImages/1700000000000_logo.jpg")).await.unwrap();
	assert_eq!(res.status(), StatusCode::OK);
	assert_eq!(res.headers()["Content-Type"], "image/jpeg");
	assert_eq!(res.headers()["X-Content-Type-Options"], "nosniff");
	assert_eq!(res.headers()["Content-Security-Policy"], "default-src 'none'; sandbox");
	assert_eq!(body_bytes(res).await.as_ref(), b"jpeg");

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_missing_image() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	let res = router.handle(get("/schoolImages/nothing.png")).await.unwrap();
	assert_eq!(res.status(), StatusCode::NOT_FOUND);
	assert_eq!(body_json(res).await, json!({ "error": "not found" }));

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_path_traversal() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	// Sits next to the upload directory, inside the temporary directory.
	let outside = global.drive().path().parent().unwrap().join("secret.txt");
	std::fs::write(&outside, b"secret").unwrap();

	for uri in [
		"/schoolImages/..%2Fsecret.txt",
		"/schoolImages/../secret.txt",
		"/schoolImages/.hidden",
	] {
		let res = router.handle(get(uri)).await.unwrap();
		assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
	}

	drop(router);
	drop(global);
	handler.cancel().await;
}

#[tokio::test]
async fn test_uploaded_svg_is_not_rendered() {
	let (global, handler) = mock_global_state(AppConfig::default()).await;
	let router = router(&global);

	let svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\"><script>alert(document.cookie)</script></svg>";
	let res = router
		.handle(post_form(multipart(&valid_fields(), Some(("x.svg", svg.as_slice())))))
		.await
		.unwrap();
	assert_eq!(res.status(), StatusCode::OK);

	let path = global.repository.schools()[0].image.clone();
	assert!(path.ends_with("_x.svg"), "{path}");

	let res = router.handle(get(&path)).await.unwrap();
	assert_eq!(res.status(), StatusCode::OK);
	assert_eq!(res.headers()["Content-Type"], "application/octet-stream");
	assert_eq!(res.headers()["Content-Security-Policy"], "default-src 'none'; sandbox");
	assert_eq!(res.headers()["X-Content-Type-Options"], "nosniff");
	assert_eq!(body_bytes(res).await.as_ref(), svg.as_slice());

	drop(router);
	drop(global);
	handler.cancel().await;
}
