use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use super::middleware::{Middleware, NextFn};
use super::route::{Route, RouteInfo, RouterItem};
use super::Router;

/// Middlewares run outermost first in this order, regardless of the order
/// they were registered in: request data must be present before anything
/// else runs, and the error handler must see the errors of every generic
/// middleware.
#[derive(Debug, Ord, PartialOrd, Eq, PartialEq, Clone, Copy)]
enum MiddlewareKind {
	Data,
	Error,
	Generic,
}

pub struct RouterBuilder<I, O, E> {
	tree: Vec<(&'static str, RouterItem<I, O, E>)>,
	middlewares: Vec<(Arc<dyn Middleware<I, O, E>>, MiddlewareKind)>,
}

impl<I, O, E> Debug for RouterBuilder<I, O, E> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouterBuilder").field("tree", &self.tree).finish()
	}
}

impl<I: Send + 'static, O: Send + 'static, E: Send + 'static> Default for RouterBuilder<I, O, E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<I: Send + 'static, O: Send + 'static, E: Send + 'static> RouterBuilder<I, O, E> {
	pub fn new() -> Self {
		Self {
			tree: Vec::new(),
			middlewares: Vec::new(),
		}
	}

	pub fn middleware(mut self, middleware: impl Middleware<I, O, E>) -> Self {
		self.middlewares.push((Arc::new(middleware), MiddlewareKind::Generic));
		self
	}

	/// Inserts a clone of `data` into the extensions of every request routed
	/// through this builder.
	pub fn data<T: Clone + Send + Sync + 'static>(mut self, data: T) -> Self {
		self.middlewares.push((
			Arc::new(move |mut req: hyper::Request<I>, next: NextFn<I, O, E>| {
				req.extensions_mut().insert(data.clone());
				next(req)
			}),
			MiddlewareKind::Data,
		));

		self
	}

	/// Turns handler and middleware errors into responses.
	pub fn error_handler<F: Future<Output = hyper::Response<O>> + Send + 'static>(
		mut self,
		handler: impl Fn(hyper::Request<()>, E) -> F + Send + Sync + 'static,
	) -> Self {
		let handler = Arc::new(handler);
		self.middlewares.push((
			Arc::new(move |req: hyper::Request<I>, next: NextFn<I, O, E>| {
				let handler = handler.clone();
				async move {
					let (parts, body) = req.into_parts();

					match next(hyper::Request::from_parts(parts.clone(), body)).await {
						Ok(res) => Ok::<_, E>(res),
						Err(err) => Ok(handler(hyper::Request::from_parts(parts, ()), err).await),
					}
				}
			}),
			MiddlewareKind::Error,
		));

		self
	}

	pub fn get<F: Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		self,
		path: &'static str,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.add_route(Some(hyper::Method::GET), path, handler)
	}

	pub fn post<F: Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		self,
		path: &'static str,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.add_route(Some(hyper::Method::POST), path, handler)
	}

	/// Matches the path for every method.
	pub fn any<F: Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		self,
		path: &'static str,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.add_route(None, path, handler)
	}

	pub fn add_route<F: Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		mut self,
		method: Option<hyper::Method>,
		path: &'static str,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.tree.push((
			path,
			RouterItem::Route(Route {
				method,
				handler: Arc::new(move |req| Box::pin(handler(req))),
			}),
		));
		self
	}

	pub fn scope(mut self, path: &'static str, router: RouterBuilder<I, O, E>) -> Self {
		self.tree.push((path, RouterItem::Router(router)));
		self
	}

	/// Catch-all for requests that match no other route.
	pub fn not_found<F: Future<Output = Result<hyper::Response<O>, E>> + Send + 'static>(
		self,
		handler: impl Fn(hyper::Request<I>) -> F + Send + Sync + 'static,
	) -> Self {
		self.add_route(None, "/*", handler)
	}

	fn build_scoped(mut self, parent_path: &str, target: &mut Router<I, O, E>, middlewares: &[usize]) {
		self.middlewares.sort_by_key(|(_, kind)| *kind);

		let middleware_idxs = middlewares
			.iter()
			.copied()
			.chain(self.middlewares.into_iter().map(|(middleware, _)| {
				target.middlewares.push(middleware);
				target.middlewares.len() - 1
			}))
			.collect::<Vec<_>>();

		let parent_path = parent_path.trim_matches('/');

		for (path, item) in self.tree {
			let path = path.trim_matches('/');
			let joined = format!(
				"{parent_path}{}{path}",
				if parent_path.is_empty() || path.is_empty() { "" } else { "/" }
			);

			match item {
				RouterItem::Route(route) => {
					target.routes.push(route.handler);

					let method = route.method.as_ref().map(|m| m.as_str()).unwrap_or("*");
					let full_path = format!("/{method}/{joined}");

					tracing::debug!(full_path, "adding route");

					target.tree.insert(
						&full_path,
						RouteInfo {
							route: target.routes.len() - 1,
							middleware: middleware_idxs.clone(),
						},
					);
				}
				RouterItem::Router(router) => router.build_scoped(&joined, target, &middleware_idxs),
			}
		}
	}

	pub fn build(self) -> Router<I, O, E> {
		let mut router = Router {
			routes: Vec::new(),
			middlewares: Vec::new(),
			tree: path_tree::PathTree::new(),
		};

		self.build_scoped("", &mut router, &[]);

		router
	}
}
