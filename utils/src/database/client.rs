use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;

use super::Error;

/// A connection borrowed for the duration of one statement.
#[doc(hidden)]
pub enum Connection<'a> {
	Pooled(deadpool_postgres::Client),
	Borrowed(&'a tokio_postgres::Client),
}

impl Deref for Connection<'_> {
	type Target = tokio_postgres::Client;

	fn deref(&self) -> &Self::Target {
		match self {
			Self::Pooled(client) => {
				let client: &tokio_postgres::Client = client;
				client
			}
			Self::Borrowed(client) => client,
		}
	}
}

/// Anything a query can run against: a pool, a pooled or raw client, or an
/// open transaction.
pub trait ClientLike: Send + Sync {
	#[doc(hidden)]
	fn connection(&self) -> impl Future<Output = Result<Connection<'_>, Error>> + Send;
}

impl ClientLike for deadpool_postgres::Pool {
	async fn connection(&self) -> Result<Connection<'_>, Error> {
		Ok(Connection::Pooled(self.get().await?))
	}
}

impl ClientLike for deadpool_postgres::Client {
	async fn connection(&self) -> Result<Connection<'_>, Error> {
		Ok(Connection::Borrowed(self))
	}
}

impl ClientLike for deadpool_postgres::Transaction<'_> {
	async fn connection(&self) -> Result<Connection<'_>, Error> {
		Ok(Connection::Borrowed(self.client()))
	}
}

impl ClientLike for tokio_postgres::Client {
	async fn connection(&self) -> Result<Connection<'_>, Error> {
		Ok(Connection::Borrowed(self))
	}
}

impl ClientLike for tokio_postgres::Transaction<'_> {
	async fn connection(&self) -> Result<Connection<'_>, Error> {
		Ok(Connection::Borrowed(self.client()))
	}
}

impl<T: ClientLike> ClientLike for Arc<T> {
	async fn connection(&self) -> Result<Connection<'_>, Error> {
		self.as_ref().connection().await
	}
}

impl<T: ClientLike> ClientLike for &T {
	async fn connection(&self) -> Result<Connection<'_>, Error> {
		(**self).connection().await
	}
}
