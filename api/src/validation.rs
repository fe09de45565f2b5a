use std::collections::HashMap;

use crate::database::NewSchool;

/// Form fields a submission must carry, in the order errors are reported.
pub const FIELDS: [&str; 6] = ["name", "address", "city", "state", "contact", "email_id"];

/// `i64` holds every 15 digit number.
const MAX_CONTACT_DIGITS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
	Required,
	InvalidContact,
	InvalidEmail,
}

/// One rejected field. Serializes as
/// `{"code": ..., "field": ..., "path": [field], "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
	pub code: ErrorCode,
	pub field: &'static str,
	pub path: [&'static str; 1],
	pub message: String,
}

impl FieldError {
	fn new(code: ErrorCode, field: &'static str, message: impl Into<String>) -> Self {
		Self {
			code,
			field,
			path: [field],
			message: message.into(),
		}
	}
}

fn validate_contact(contact: &str) -> Result<i64, &'static str> {
	if contact.len() > MAX_CONTACT_DIGITS {
		return Err("contact must be at most 15 digits long");
	}

	if !contact.bytes().all(|b| b.is_ascii_digit()) {
		return Err("contact must only contain digits");
	}

	contact.parse().map_err(|_| "contact must be a number")
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
	if email.len() < 5 {
		return Err("email must be at least 5 characters long");
	}

	if email.len() > 100 {
		return Err("email must be at most 100 characters long");
	}

	if !email.contains('@') {
		return Err("email must contain an @");
	}

	if !email.contains('.') {
		return Err("email must contain a .");
	}

	if !email_address::EmailAddress::is_valid(email) {
		return Err("email is not a valid email address");
	}

	Ok(())
}

/// Checks a submitted form. Every field is checked and each failing field
/// contributes exactly one error; accepted values are kept as submitted.
pub fn validate(form: &HashMap<String, String>) -> Result<NewSchool, Vec<FieldError>> {
	let mut errors = Vec::new();

	let mut values = FIELDS.map(|field| match form.get(field) {
		Some(value) if !value.trim().is_empty() => Some(value.as_str()),
		_ => {
			errors.push(FieldError::new(ErrorCode::Required, field, format!("{field} is required")));
			None
		}
	});

	let contact = values[4].and_then(|contact| match validate_contact(contact) {
		Ok(contact) => Some(contact),
		Err(message) => {
			errors.push(FieldError::new(ErrorCode::InvalidContact, "contact", message));
			None
		}
	});

	if let Some(email) = values[5] {
		if let Err(message) = validate_email(email) {
			errors.push(FieldError::new(ErrorCode::InvalidEmail, "email_id", message));
			values[5] = None;
		}
	}

	match (values, contact) {
		([Some(name), Some(address), Some(city), Some(state), Some(_), Some(email_id)], Some(contact)) => Ok(NewSchool {
			name: name.to_owned(),
			address: address.to_owned(),
			city: city.to_owned(),
			state: state.to_owned(),
			contact,
			email_id: email_id.to_owned(),
			image: String::new(),
		}),
		_ => {
			errors.sort_by_key(|err| FIELDS.iter().position(|field| *field == err.field));
			Err(errors)
		}
	}
}
