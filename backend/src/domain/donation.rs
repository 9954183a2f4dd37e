//! Donation entity linking a payer to a fund.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::fund::FundId;
use super::user::Email;

/// Validation errors for donation payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DonationValidationError {
    /// Neither a user nor an organization was named as the payer.
    #[error("a donation needs a user or organization donor")]
    MissingDonor,
    /// Both payer kinds were named at once.
    #[error("a donation cannot have both a user and an organization donor")]
    AmbiguousDonor,
    /// The amount was not positive.
    #[error("donation amount must be positive")]
    NonPositiveAmount,
}

/// Surrogate donation identifier assigned by the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = i64, example = 42)]
pub struct DonationId(pub i64);

/// The payer behind a donation: exactly one of the two principal kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum Donor {
    /// An individual user donated.
    User {
        /// Donating user's email.
        email: Email,
    },
    /// A volunteer organization donated.
    Organization {
        /// Donating organization's email.
        email: Email,
    },
}

impl Donor {
    /// Resolve the donor from the optional email pair the wire format uses.
    ///
    /// The storage schema keeps two nullable columns; exactly one must be
    /// set. Anything else is a validation failure, not a storable state.
    pub fn from_emails(
        user_email: Option<Email>,
        org_email: Option<Email>,
    ) -> Result<Self, DonationValidationError> {
        match (user_email, org_email) {
            (Some(email), None) => Ok(Self::User { email }),
            (None, Some(email)) => Ok(Self::Organization { email }),
            (None, None) => Err(DonationValidationError::MissingDonor),
            (Some(_), Some(_)) => Err(DonationValidationError::AmbiguousDonor),
        }
    }

    /// The user email column value for this donor.
    pub fn user_email(&self) -> Option<&Email> {
        match self {
            Self::User { email } => Some(email),
            Self::Organization { .. } => None,
        }
    }

    /// The organization email column value for this donor.
    pub fn org_email(&self) -> Option<&Email> {
        match self {
            Self::Organization { email } => Some(email),
            Self::User { .. } => None,
        }
    }
}

/// A recorded donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    /// Store-assigned identifier.
    pub id: DonationId,
    /// Amount in minor units; always positive.
    pub amount: i64,
    /// Calendar date the donation was made.
    pub donated_on: NaiveDate,
    /// Free-text note attached by the donor.
    pub content: String,
    /// Who paid.
    pub donor: Donor,
    /// Target campaign.
    pub fund_id: FundId,
}

/// Fields for a new donation; the store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewDonation {
    /// Amount in minor units; must be positive.
    pub amount: i64,
    /// Calendar date the donation was made.
    pub donated_on: NaiveDate,
    /// Free-text note attached by the donor.
    pub content: String,
    /// Who paid.
    pub donor: Donor,
    /// Target campaign.
    pub fund_id: FundId,
}

impl NewDonation {
    /// Validate amount positivity on top of the already-typed fields.
    pub fn validated(self) -> Result<Self, DonationValidationError> {
        if self.amount <= 0 {
            return Err(DonationValidationError::NonPositiveAmount);
        }
        Ok(self)
    }
}
