//! Local identifier validation.
//!
//! Identifiers are checked before a request is built so a malformed ID never
//! reaches the network.

use crate::error::{PopSignerError, Result};
use uuid::Uuid;

/// Anything that can be turned into a UUID resource identifier.
///
/// Implemented for [`Uuid`] itself and for string types, which are parsed.
pub trait IntoUuid {
    /// Convert into a UUID, failing if the input is not well-formed.
    fn into_uuid(self) -> std::result::Result<Uuid, uuid::Error>;
}

impl IntoUuid for Uuid {
    fn into_uuid(self) -> std::result::Result<Uuid, uuid::Error> {
        Ok(self)
    }
}

impl IntoUuid for &Uuid {
    fn into_uuid(self) -> std::result::Result<Uuid, uuid::Error> {
        Ok(*self)
    }
}

impl IntoUuid for &str {
    fn into_uuid(self) -> std::result::Result<Uuid, uuid::Error> {
        Uuid::parse_str(self.trim())
    }
}

impl IntoUuid for String {
    fn into_uuid(self) -> std::result::Result<Uuid, uuid::Error> {
        self.as_str().into_uuid()
    }
}

impl IntoUuid for &String {
    fn into_uuid(self) -> std::result::Result<Uuid, uuid::Error> {
        self.as_str().into_uuid()
    }
}

pub(crate) fn parse_uuid(id: impl IntoUuid, what: &str) -> Result<Uuid> {
    id.into_uuid()
        .map_err(|e| PopSignerError::InvalidRequest(format!("invalid {} ID: {}", what, e)))
}

/// Validate an opaque identifier that is spliced into a URL path.
pub(crate) fn path_segment<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(PopSignerError::InvalidRequest(format!(
            "{} must not be empty",
            what
        )));
    }
    if value == "." || value == ".." {
        return Err(PopSignerError::InvalidRequest(format!(
            "invalid {}: {:?}",
            what, value
        )));
    }
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid {
        return Err(PopSignerError::InvalidRequest(format!(
            "invalid {}: {:?}",
            what, value
        )));
    }
    Ok(value)
}
