/// A validated submission, ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchool {
	pub name: String,
	pub address: String,
	pub city: String,
	pub state: String,
	pub contact: i64,
	pub email_id: String,
	/// Public path of the uploaded image, empty when none was attached.
	pub image: String,
}

/// The columns returned by the listing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, postgres_from_row::FromRow)]
pub struct SchoolSummary {
	pub id: i64,
	pub name: String,
	pub address: String,
	pub city: String,
	pub image: Option<String>,
}
