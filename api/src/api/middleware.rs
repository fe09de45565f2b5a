use std::time::Instant;

use hyper::Request;
use tracing::Instrument;
use utils::http::router::middleware::{middleware_fn, Middleware, NextFn};
use utils::http::RouteError;

use super::error::ApiError;
use super::Body;

/// Opens a span per request and logs the outcome once the handler and every
/// inner middleware are done.
pub fn trace<B: Send + 'static>() -> impl Middleware<B, Body, RouteError<ApiError>> {
	middleware_fn(|req: Request<B>, next: NextFn<B, Body, RouteError<ApiError>>| {
		let span = tracing::debug_span!("request", method = %req.method(), path = %req.uri().path());
		let start = Instant::now();

		async move {
			let result = next(req).await;

			let status = match &result {
				Ok(res) => res.status(),
				Err(err) => err.status(),
			};

			tracing::debug!(status = status.as_u16(), elapsed = ?start.elapsed(), "request finished");

			result
		}
		.instrument(span)
	})
}
