mod client;
mod query;

pub use client::ClientLike;
pub use deadpool_postgres::Pool;
pub use postgres_from_row::FromRow;
pub use query::*;
pub use {deadpool_postgres, postgres_from_row, postgres_types, tokio_postgres};

/// Errors returned by every query helper: either the pool failed to hand
/// out a connection or postgres rejected the statement.
pub type Error = deadpool_postgres::PoolError;
