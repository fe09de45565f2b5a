use std::marker::PhantomData;

use postgres_from_row::FromRow;
use postgres_types::{FromSql, ToSql};
use tokio_postgres::Row;

use super::{ClientLike, Error};

pub fn query<'a>(sql: impl ToString) -> QueryBuilder<'a> {
	QueryBuilder::new(sql)
}

/// Accumulates a statement and its positional parameters.
///
/// `push_bind` appends the next `$n` placeholder together with its value,
/// `bind` only records a value for a placeholder already written by hand.
#[derive(Default)]
pub struct QueryBuilder<'a> {
	sql: String,
	params: Vec<Box<dyn ToSql + Send + Sync + 'a>>,
}

impl<'a> QueryBuilder<'a> {
	pub fn new(sql: impl ToString) -> Self {
		Self {
			sql: sql.to_string(),
			params: Vec::new(),
		}
	}

	pub fn push(&mut self, sql: impl AsRef<str>) -> &mut Self {
		self.sql.push_str(sql.as_ref());
		self
	}

	pub fn push_bind(&mut self, param: impl ToSql + Send + Sync + 'a) -> &mut Self {
		self.params.push(Box::new(param));
		self.sql.push_str(&format!("${}", self.params.len()));
		self
	}

	pub fn bind(&mut self, param: impl ToSql + Send + Sync + 'a) -> &mut Self {
		self.params.push(Box::new(param));
		self
	}

	pub fn sql(&self) -> &str {
		&self.sql
	}

	pub fn param_count(&self) -> usize {
		self.params.len()
	}

	pub fn build(&self) -> Query<'_, Raw> {
		Query::new(self)
	}

	pub fn build_query_as<T: FromRow>(&self) -> Query<'_, As<T>> {
		Query::new(self)
	}

	pub fn build_query_scalar<T: for<'r> FromSql<'r>>(&self) -> Query<'_, Scalar<T>> {
		Query::new(self)
	}
}

/// Decides what a returned row is turned into.
pub trait RowParse {
	type Item;

	fn parse(row: Row) -> Result<Self::Item, tokio_postgres::Error>;
}

pub struct Raw;

pub struct As<T>(PhantomData<fn() -> T>);

pub struct Scalar<T>(PhantomData<fn() -> T>);

impl RowParse for Raw {
	type Item = Row;

	#[inline]
	fn parse(row: Row) -> Result<Row, tokio_postgres::Error> {
		Ok(row)
	}
}

impl<T: FromRow> RowParse for As<T> {
	type Item = T;

	#[inline]
	fn parse(row: Row) -> Result<T, tokio_postgres::Error> {
		T::try_from_row(&row)
	}
}

impl<T: for<'r> FromSql<'r>> RowParse for Scalar<T> {
	type Item = T;

	#[inline]
	fn parse(row: Row) -> Result<T, tokio_postgres::Error> {
		row.try_get(0)
	}
}

pub struct Query<'a, P> {
	sql: &'a str,
	params: &'a [Box<dyn ToSql + Send + Sync + 'a>],
	_parse: PhantomData<fn() -> P>,
}

impl<'a, P: RowParse> Query<'a, P> {
	fn new(builder: &'a QueryBuilder<'_>) -> Self {
		Self {
			sql: &builder.sql,
			params: &builder.params,
			_parse: PhantomData,
		}
	}

	fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
		self.params.iter().map(|param| param.as_ref() as _).collect()
	}

	pub async fn execute(self, conn: impl ClientLike) -> Result<u64, Error> {
		let client = conn.connection().await?;
		Ok(client.execute(self.sql, &self.params()).await?)
	}

	pub async fn fetch_all(self, conn: impl ClientLike) -> Result<Vec<P::Item>, Error> {
		let client = conn.connection().await?;

		Ok(client
			.query(self.sql, &self.params())
			.await?
			.into_iter()
			.map(P::parse)
			.collect::<Result<_, _>>()?)
	}

	pub async fn fetch_one(self, conn: impl ClientLike) -> Result<P::Item, Error> {
		let client = conn.connection().await?;
		Ok(P::parse(client.query_one(self.sql, &self.params()).await?)?)
	}

	pub async fn fetch_optional(self, conn: impl ClientLike) -> Result<Option<P::Item>, Error> {
		let client = conn.connection().await?;
		Ok(client.query_opt(self.sql, &self.params()).await?.map(P::parse).transpose()?)
	}
}
