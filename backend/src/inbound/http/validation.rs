//! Shared validation helpers for inbound HTTP adapters.
//!
//! Domain constructors report which request field failed; these helpers turn
//! that into an `invalid_request` error whose `details` name the field and a
//! stable sub-code.

use serde_json::json;

use crate::domain::{
    BookingValidationError, CredentialValidationError, DentistQueryError, DentistValidationError,
    Error, UserValidationError,
};

/// Validation sub-codes carried in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidValue,
    InvalidQuery,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::InvalidQuery => "invalid_query",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {field}"),
    )
}

/// Unwrap an optional body field or report it as missing.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn map_credential_error(err: CredentialValidationError) -> Error {
    match err.field() {
        Some(field) => field_error(field, ErrorCode::InvalidValue, err.to_string()),
        None => Error::invalid_request(err.to_string()),
    }
}

pub(crate) fn map_user_error(err: UserValidationError) -> Error {
    field_error(err.field(), ErrorCode::InvalidValue, err.to_string())
}

pub(crate) fn map_dentist_error(err: DentistValidationError) -> Error {
    field_error(err.field(), ErrorCode::InvalidValue, err.to_string())
}

pub(crate) fn map_booking_error(err: BookingValidationError) -> Error {
    let code = match err {
        BookingValidationError::MissingDate => ErrorCode::MissingField,
        BookingValidationError::InvalidDate { .. } => ErrorCode::InvalidValue,
    };
    field_error(err.field(), code, err.to_string())
}

pub(crate) fn map_query_error(err: DentistQueryError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "code": ErrorCode::InvalidQuery.as_str(),
    }))
}
