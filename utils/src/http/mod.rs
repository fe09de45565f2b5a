use std::fmt::{Debug, Display};
use std::panic::Location;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use serde_json::json;

pub mod router;

/// Response body type used by every router in the workspace.
pub type Body = Full<Bytes>;

#[doc(hidden)]
pub mod __private {
	pub use bytes::Bytes;
	pub use http_body_util::Full;
	pub use hyper;
}

/// Builds a JSON response from a status and anything that implements
/// `ToString` (usually a `serde_json::Value`).
#[macro_export]
macro_rules! make_response {
	($status:expr, $body:expr) => {
		$crate::http::__private::hyper::Response::builder()
			.status($status)
			.header("Content-Type", "application/json")
			.body($crate::http::__private::Full::new($crate::http::__private::Bytes::from(
				$body.to_string(),
			)))
			.expect("failed to build response")
	};
}

pub async fn error_handler<E: std::error::Error + 'static>(req: hyper::Request<()>, err: RouteError<E>) -> hyper::Response<Body> {
	let location = err.location();

	err.span().in_scope(|| match err.should_log() {
		ShouldLog::Yes => {
			tracing::error!(path = %req.uri(), method = %req.method(), location = location.to_string(), error = ?err, "http error")
		}
		ShouldLog::Debug => {
			tracing::debug!(path = %req.uri(), method = %req.method(), location = location.to_string(), error = ?err, "http error")
		}
		ShouldLog::No => (),
	});

	err.response()
}

/// An error returned by a route handler.
///
/// The response sent to the client is prepared when the error is created and
/// never contains the source error, which is only logged.
pub struct RouteError<E> {
	source: Option<E>,
	location: &'static Location<'static>,
	span: tracing::Span,
	response: hyper::Response<Body>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShouldLog {
	Yes,
	Debug,
	No,
}

impl<E> RouteError<E> {
	pub fn span(&self) -> &tracing::Span {
		&self.span
	}

	pub fn location(&self) -> &'static Location<'static> {
		self.location
	}

	pub fn status(&self) -> StatusCode {
		self.response.status()
	}

	pub fn response(self) -> hyper::Response<Body> {
		self.response
	}

	pub fn should_log(&self) -> ShouldLog {
		if self.response.status().is_server_error() {
			ShouldLog::Yes
		} else if self.source.is_some() {
			ShouldLog::Debug
		} else {
			ShouldLog::No
		}
	}

	pub fn with_source(mut self, source: Option<E>) -> Self {
		self.source = source;
		self
	}

	pub fn with_location(mut self, location: &'static Location<'static>) -> Self {
		self.location = location;
		self
	}

	#[track_caller]
	fn new(response: hyper::Response<Body>) -> Self {
		Self {
			source: None,
			span: tracing::Span::current(),
			location: Location::caller(),
			response,
		}
	}
}

impl<E> From<hyper::Response<Body>> for RouteError<E> {
	#[track_caller]
	fn from(res: hyper::Response<Body>) -> Self {
		Self::new(res)
	}
}

impl<E, S: AsRef<str>> From<(StatusCode, S)> for RouteError<E> {
	#[track_caller]
	fn from((status, message): (StatusCode, S)) -> Self {
		Self::new(make_response!(status, json!({ "error": message.as_ref() })))
	}
}

impl<E, S: AsRef<str>, T> From<(StatusCode, S, T)> for RouteError<E>
where
	T: Into<E>,
{
	#[track_caller]
	fn from((status, message, source): (StatusCode, S, T)) -> Self {
		Self::new(make_response!(status, json!({ "error": message.as_ref() }))).with_source(Some(source.into()))
	}
}

impl<E> From<&'_ str> for RouteError<E> {
	#[track_caller]
	fn from(message: &'_ str) -> Self {
		Self::from((StatusCode::INTERNAL_SERVER_ERROR, message))
	}
}

impl<E: Debug> Debug for RouteError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.source {
			Some(err) => write!(f, "RouteError: {:?}", err),
			None => write!(f, "RouteError: Unknown Source"),
		}
	}
}

impl<E: Display> Display for RouteError<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.source {
			Some(err) => write!(f, "RouteError: {}", err),
			None => write!(f, "RouteError: Unknown Source"),
		}
	}
}

impl<E: std::error::Error + 'static> std::error::Error for RouteError<E> {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.source.as_ref().map(|err| err as &(dyn std::error::Error + 'static))
	}
}

pub mod ext {
	use std::panic::Location;

	use super::RouteError;

	pub trait ResultExt<T, E, E2>: Sized {
		/// Replaces the error with the given route error, keeping the original
		/// as the source so it can be logged.
		fn map_err_route<C>(self, ctx: C) -> std::result::Result<T, RouteError<E2>>
		where
			RouteError<E2>: From<C>,
			E2: From<E>;

		/// Replaces the error with the given route error and discards the
		/// original.
		fn map_ignore_err_route<C>(self, ctx: C) -> std::result::Result<T, RouteError<E2>>
		where
			RouteError<E2>: From<C>;
	}

	impl<T, E, E2> ResultExt<T, E, E2> for std::result::Result<T, E> {
		#[track_caller]
		fn map_err_route<C>(self, ctx: C) -> std::result::Result<T, RouteError<E2>>
		where
			RouteError<E2>: From<C>,
			E2: From<E>,
		{
			match self {
				Ok(val) => Ok(val),
				Err(err) => Err(RouteError::from(ctx)
					.with_source(Some(err.into()))
					.with_location(Location::caller())),
			}
		}

		#[track_caller]
		fn map_ignore_err_route<C>(self, ctx: C) -> std::result::Result<T, RouteError<E2>>
		where
			RouteError<E2>: From<C>,
		{
			match self {
				Ok(val) => Ok(val),
				Err(_) => Err(RouteError::from(ctx).with_location(Location::caller())),
			}
		}
	}

	pub trait OptionExt<T, E>: Sized {
		fn map_err_route<C>(self, ctx: C) -> std::result::Result<T, RouteError<E>>
		where
			RouteError<E>: From<C>;
	}

	impl<T, E> OptionExt<T, E> for std::option::Option<T> {
		#[track_caller]
		fn map_err_route<C>(self, ctx: C) -> std::result::Result<T, RouteError<E>>
		where
			RouteError<E>: From<C>,
		{
			match self {
				Some(val) => Ok(val),
				None => Err(RouteError::from(ctx).with_location(Location::caller())),
			}
		}
	}
}
