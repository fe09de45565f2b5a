use std::sync::Arc;

use bytes::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::net::TcpSocket;
use tokio::select;
use utils::http::router::Router;
use utils::http::RouteError;
use utils::make_response;

use self::error::ApiError;
use crate::config::ApiConfig;
use crate::drive::PUBLIC_PREFIX;
use crate::global::SchoolGlobal;

pub mod error;
mod health;
mod images;
mod middleware;
pub mod schools;

pub type Body = utils::http::Body;

pub fn routes<G: SchoolGlobal, B>(global: &Arc<G>) -> Router<B, Body, RouteError<ApiError>>
where
	B: hyper::body::Body<Data = Bytes> + Send + 'static,
	B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
	let weak = Arc::downgrade(global);
	Router::builder()
		.data(weak)
		.error_handler(utils::http::error_handler::<ApiError>)
		.middleware(middleware::trace())
		.scope(
			"/api",
			Router::builder()
				.get("/health", health::health)
				.scope("/schools", schools::routes(global)),
		)
		.scope(PUBLIC_PREFIX, images::routes(global))
		.not_found(|_| async move {
			Ok(make_response!(
				hyper::StatusCode::NOT_FOUND,
				json!({
					"error": "not found",
				})
			))
		})
		.build()
}

pub async fn run<G: SchoolGlobal>(global: Arc<G>) -> anyhow::Result<()> {
	let config = global.config::<ApiConfig>();

	tracing::info!("listening on {}", config.bind_address);
	let socket = if config.bind_address.is_ipv6() {
		TcpSocket::new_v6()?
	} else {
		TcpSocket::new_v4()?
	};

	socket.set_reuseaddr(true)?;
	socket.bind(config.bind_address)?;
	let listener = socket.listen(1024)?;

	// Connections only hold a weak reference to the global state, so open
	// keep-alive connections do not hold up shutdown.
	let router = Arc::new(routes(&global));
	let service = service_fn(move |req| {
		let this = router.clone();
		async move { this.handle(req).await }
	});

	loop {
		select! {
			_ = global.ctx().done() => {
				break;
			},
			r = listener.accept() => {
				let (socket, addr) = r?;

				let service = service.clone();

				tracing::debug!("accepted connection from {}", addr);

				tokio::spawn(async move {
					if let Err(err) = http1::Builder::new().serve_connection(TokioIo::new(socket), service).await {
						tracing::debug!(error = %err, "connection closed with error");
					}
				});
			},
		}
	}

	tracing::info!("shutting down api");

	global.repository().close().await;

	Ok(())
}
