//! Fund aggregate: the base donation-campaign record plus its owner subtype.
//!
//! The store keeps funds in a base table and exactly one of two subtype
//! tables. The domain models that 1:1 polymorphism as a tagged variant
//! ([`FundOwnership`]) so reads hand callers one consistent value instead of
//! two rows glued together by foreign keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::Email;

/// Validation errors for fund field types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FundValidationError {
    /// SSN was not a nine-digit number.
    #[error("ssn must be a 9-digit number")]
    InvalidSsn,
    /// Tax identifier was not a nine-digit number.
    #[error("tax id must be a 9-digit number")]
    InvalidTaxId,
    /// Purpose or verification text was empty after trimming.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Surrogate fund identifier assigned by the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = i64, example = 7)]
pub struct FundId(pub i64);

impl fmt::Display for FundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const NINE_DIGIT_MAX: i64 = 999_999_999;

/// Nine-digit social security number identifying an individual fund owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "i64", into = "i64")]
#[schema(value_type = i64, example = 123_456_789)]
pub struct Ssn(i64);

impl Ssn {
    /// Validate and construct an [`Ssn`].
    pub fn new(raw: i64) -> Result<Self, FundValidationError> {
        if (0..=NINE_DIGIT_MAX).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(FundValidationError::InvalidSsn)
        }
    }

    /// Numeric value as stored.
    pub fn value(self) -> i64 {
        self.0
    }
}

impl From<Ssn> for i64 {
    fn from(value: Ssn) -> Self {
        value.0
    }
}

impl TryFrom<i64> for Ssn {
    type Error = FundValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Nine-digit tax identifier; unique across organization funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "i64", into = "i64")]
#[schema(value_type = i64, example = 987_654_321)]
pub struct TaxId(i64);

impl TaxId {
    /// Validate and construct a [`TaxId`].
    pub fn new(raw: i64) -> Result<Self, FundValidationError> {
        if (0..=NINE_DIGIT_MAX).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(FundValidationError::InvalidTaxId)
        }
    }

    /// Numeric value as stored.
    pub fn value(self) -> i64 {
        self.0
    }
}

impl From<TaxId> for i64 {
    fn from(value: TaxId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for TaxId {
    type Error = FundValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Base donation-campaign record.
///
/// Balances are integral minor units so arithmetic stays exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    /// Store-assigned identifier.
    pub id: FundId,
    /// What the campaign raises money for.
    pub purpose: String,
    /// Current balance in minor units.
    pub balance: i64,
    /// Verification status text.
    pub verification: String,
}

/// Fields for a new base fund row; the store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewFund {
    /// Campaign purpose.
    pub purpose: String,
    /// Opening balance in minor units.
    pub balance: i64,
    /// Verification status text.
    pub verification: String,
}

impl NewFund {
    /// Reject blank text fields before the row reaches the store.
    pub fn validated(self) -> Result<Self, FundValidationError> {
        if self.purpose.trim().is_empty() {
            return Err(FundValidationError::EmptyField { field: "purpose" });
        }
        if self.verification.trim().is_empty() {
            return Err(FundValidationError::EmptyField {
                field: "verification",
            });
        }
        Ok(self)
    }
}

/// The owner subtype attached to a fund, exactly one per fund row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum FundOwnership {
    /// Owned by an individual user.
    Individual {
        /// Owner's social security number.
        ssn: Ssn,
        /// Owning user's email.
        user_email: Email,
    },
    /// Owned by a volunteer organization.
    Organization {
        /// Organization's unique tax identifier.
        tax_id: TaxId,
        /// Owning organization's email.
        org_email: Email,
    },
}

/// A fund joined with its owner subtype row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnedFund {
    /// Base campaign record.
    #[serde(flatten)]
    pub fund: Fund,
    /// Owner subtype payload.
    #[serde(flatten)]
    pub ownership: FundOwnership,
}

/// Partial update for the base fund row. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FundPatch {
    /// Replacement purpose, when present.
    pub purpose: Option<String>,
    /// Replacement balance in minor units, when present.
    pub balance: Option<i64>,
    /// Replacement verification status, when present.
    pub verification: Option<String>,
}

impl FundPatch {
    /// True when no base-fund field is being changed.
    pub fn is_empty(&self) -> bool {
        self.purpose.is_none() && self.balance.is_none() && self.verification.is_none()
    }
}

/// Partial update for an individual subtype row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndividualFundPatch {
    /// Replacement SSN, when present.
    pub ssn: Option<Ssn>,
    /// Replacement owning user, when present.
    pub user_email: Option<Email>,
}

impl IndividualFundPatch {
    /// True when no subtype field is being changed.
    pub fn is_empty(&self) -> bool {
        self.ssn.is_none() && self.user_email.is_none()
    }
}

/// Partial update for an organization subtype row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationFundPatch {
    /// Replacement tax identifier, when present.
    pub tax_id: Option<TaxId>,
}

impl OrganizationFundPatch {
    /// True when no subtype field is being changed.
    pub fn is_empty(&self) -> bool {
        self.tax_id.is_none()
    }
}
