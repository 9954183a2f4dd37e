//! Volunteer organization entity.
//!
//! Organizations share the email natural key with users but carry their own
//! profile fields. The (name, field) pair is unique across organizations;
//! that invariant lives in the database and surfaces as a conflict error.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::Email;

/// Validation errors returned by [`Organization::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrganizationValidationError {
    /// A required field was empty after trimming.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A field exceeded the stored column width.
    #[error("{field} must be at most {max} characters")]
    FieldTooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum accepted length.
        max: usize,
    },
}

/// Maximum stored length for an organization name.
pub const ORG_NAME_MAX: usize = 100;
/// Maximum stored length for an organization's field of work.
pub const ORG_FIELD_MAX: usize = 50;
/// Maximum stored length for an address or verification status.
pub const ORG_TEXT_MAX: usize = 255;

fn bounded(
    raw: &str,
    field: &'static str,
    max: usize,
) -> Result<String, OrganizationValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(OrganizationValidationError::EmptyField { field });
    }
    if trimmed.len() > max {
        return Err(OrganizationValidationError::FieldTooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// A registered volunteer organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Natural key.
    pub email: Email,
    /// Organization name; unique together with `field`.
    pub name: String,
    /// Field of work (e.g. disaster relief).
    pub field: String,
    /// Mailing address.
    pub address: String,
    /// Verification status recorded at signup.
    pub verification: String,
}

impl Organization {
    /// Construct an organization, validating the bounded text fields.
    pub fn new(
        email: Email,
        name: impl AsRef<str>,
        field: impl AsRef<str>,
        address: impl AsRef<str>,
        verification: impl AsRef<str>,
    ) -> Result<Self, OrganizationValidationError> {
        Ok(Self {
            email,
            name: bounded(name.as_ref(), "name", ORG_NAME_MAX)?,
            field: bounded(field.as_ref(), "field", ORG_FIELD_MAX)?,
            address: bounded(address.as_ref(), "address", ORG_TEXT_MAX)?,
            verification: bounded(verification.as_ref(), "verification", ORG_TEXT_MAX)?,
        })
    }
}

/// Columns of the organization table a projection request may select.
///
/// Requests name columns as strings; parsing them into this enum keeps the
/// projection endpoint free of SQL injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum OrganizationColumn {
    /// `email` column.
    Email,
    /// `name` column.
    Name,
    /// `field` column.
    Field,
    /// `address` column.
    Address,
    /// `verification` column.
    Verification,
}
