//! Domain ports for the persistence adapters.
//!
//! Each trait exposes strongly typed errors so adapters map their failures
//! into predictable variants instead of collapsing them to booleans or
//! sentinel values. The HTTP layer decides how each variant degrades.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use utoipa::ToSchema;

use super::donation::{Donation, DonationId, NewDonation};
use super::error::Error;
use super::fund::{
    Fund, FundId, FundPatch, IndividualFundPatch, NewFund, OrganizationFundPatch, OwnedFund, Ssn,
    TaxId,
};
use super::organization::{Organization, OrganizationColumn};
use super::user::{Email, PhoneNumber, User};

/// Errors surfaced by persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum RepositoryError {
    /// Pool checkout or connectivity failure.
    #[error("repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied description.
        message: String,
    },
    /// A uniqueness constraint rejected the write.
    #[error("conflicting record: {message}")]
    Conflict {
        /// Adapter-supplied description.
        message: String,
    },
    /// The targeted row does not exist (including dangling foreign keys).
    #[error("record not found: {message}")]
    NotFound {
        /// Adapter-supplied description.
        message: String,
    },
    /// Catch-all for query failures.
    #[error("repository query failed: {message}")]
    Query {
        /// Adapter-supplied description.
        message: String,
    },
}

impl RepositoryError {
    /// Helper for connection-level failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for uniqueness conflicts.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Helper for missing rows.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

impl From<RepositoryError> for Error {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Connection { message } => Self::service_unavailable(message),
            RepositoryError::Conflict { message } => Self::conflict(message),
            RepositoryError::NotFound { message } => Self::not_found(message),
            RepositoryError::Query { message } => Self::internal(message),
        }
    }
}

/// A principal's stored login secret, fetched for password verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    /// Principal's email as stored.
    pub email: Email,
    /// Salted password hash.
    pub password_hash: String,
}

/// Column a user search condition may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum UserSearchField {
    /// `email` column.
    Email,
    /// `name` column.
    Name,
    /// `phone_number` column.
    PhoneNumber,
}

/// Comparison applied by a search condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SearchOperator {
    /// Exact match.
    Equals,
    /// Exact mismatch.
    NotEquals,
    /// Substring match.
    Contains,
}

/// One `(field, operator, value)` condition of a user search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchCondition {
    /// Targeted column.
    pub field: UserSearchField,
    /// Comparison to apply.
    pub op: SearchOperator,
    /// Literal right-hand side; always bound, never interpolated.
    pub value: String,
}

/// How a search's conditions combine. No parentheses or mixed precedence:
/// requests pick one connective for the whole expression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SearchConnective {
    /// All conditions must hold.
    #[default]
    And,
    /// At least one condition must hold.
    Or,
}

/// Validation failure for [`UserSearch`].
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum UserSearchValidationError {
    /// The request named no conditions.
    #[error("a search needs at least one condition")]
    Empty,
}

/// Structured user search expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSearch {
    conditions: Vec<SearchCondition>,
    connective: SearchConnective,
}

impl UserSearch {
    /// Construct a search, requiring at least one condition.
    pub fn new(
        conditions: Vec<SearchCondition>,
        connective: SearchConnective,
    ) -> Result<Self, UserSearchValidationError> {
        if conditions.is_empty() {
            return Err(UserSearchValidationError::Empty);
        }
        Ok(Self {
            conditions,
            connective,
        })
    }

    /// Conditions in request order.
    pub fn conditions(&self) -> &[SearchCondition] {
        &self.conditions
    }

    /// Connective joining the conditions.
    pub fn connective(&self) -> SearchConnective {
        self.connective
    }
}

/// Persistence port for the users table.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch every user row.
    async fn fetch_all(&self) -> Result<Vec<User>, RepositoryError>;

    /// Look up a user by email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Fetch the stored password hash for a login attempt.
    async fn credential_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredential>, RepositoryError>;

    /// Drop the table if present and recreate it with its constraints.
    async fn initialize(&self) -> Result<(), RepositoryError>;

    /// Insert a new user with an already-hashed password.
    async fn insert(&self, user: &User, password_hash: &str) -> Result<(), RepositoryError>;

    /// Replace a user's phone number; `NotFound` when no row matched.
    async fn update_phone_number(
        &self,
        email: &Email,
        phone_number: &PhoneNumber,
    ) -> Result<(), RepositoryError>;

    /// Number of user rows.
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Run a structured search over the users table.
    async fn search(&self, search: &UserSearch) -> Result<Vec<User>, RepositoryError>;

    /// Check out and release a connection to probe database health.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Persistence port for the volunteer organizations table.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Fetch every organization row.
    async fn fetch_all(&self) -> Result<Vec<Organization>, RepositoryError>;

    /// Look up an organization by email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<Organization>, RepositoryError>;

    /// Fetch the stored password hash for a login attempt.
    async fn credential_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredential>, RepositoryError>;

    /// Drop the table if present and recreate it with its constraints.
    async fn initialize(&self) -> Result<(), RepositoryError>;

    /// Insert a new organization with an already-hashed password.
    async fn insert(
        &self,
        organization: &Organization,
        password_hash: &str,
    ) -> Result<(), RepositoryError>;

    /// Replace an organization's mutable details; `NotFound` when no row
    /// matched.
    async fn update_details(
        &self,
        email: &Email,
        address: &str,
        name: &str,
        field: &str,
    ) -> Result<(), RepositoryError>;

    /// Number of organization rows.
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Select only the requested columns for every organization row.
    async fn projection(
        &self,
        columns: &[OrganizationColumn],
    ) -> Result<Vec<serde_json::Map<String, serde_json::Value>>, RepositoryError>;
}

/// Persistence port for the base funds table.
#[async_trait]
pub trait FundRepository: Send + Sync {
    /// Fetch every fund row.
    async fn fetch_all(&self) -> Result<Vec<Fund>, RepositoryError>;

    /// Fetch funds whose balance exceeds the threshold.
    async fn with_balance_above(&self, threshold: i64) -> Result<Vec<Fund>, RepositoryError>;

    /// Drop the table if present and recreate it with its constraints.
    async fn initialize(&self) -> Result<(), RepositoryError>;

    /// Insert a base fund row, returning the generated identifier.
    async fn insert(&self, fund: &NewFund) -> Result<FundId, RepositoryError>;

    /// Replace a fund's balance; `NotFound` when no row matched.
    async fn update_balance(&self, id: FundId, balance: i64) -> Result<(), RepositoryError>;

    /// Delete a fund; cascades remove its subtype row and donations.
    async fn delete(&self, id: FundId) -> Result<(), RepositoryError>;

    /// Number of fund rows.
    async fn count(&self) -> Result<u64, RepositoryError>;
}

/// Persistence port for individual funds (subtype + joined base rows).
#[async_trait]
pub trait IndividualFundRepository: Send + Sync {
    /// Fetch every individual fund joined with its base row.
    async fn fetch_all(&self) -> Result<Vec<OwnedFund>, RepositoryError>;

    /// Drop the subtype table if present and recreate it with its
    /// constraints.
    async fn initialize(&self) -> Result<(), RepositoryError>;

    /// Insert the base fund row and the subtype row in one transaction,
    /// returning the generated fund identifier.
    async fn insert(
        &self,
        fund: &NewFund,
        ssn: Ssn,
        user_email: &Email,
    ) -> Result<FundId, RepositoryError>;

    /// Apply the two-table partial update atomically: both statements land
    /// or neither does.
    async fn update_fund_and_subtype(
        &self,
        id: FundId,
        fund: &FundPatch,
        subtype: &IndividualFundPatch,
    ) -> Result<(), RepositoryError>;

    /// Number of individual fund rows.
    async fn count(&self) -> Result<u64, RepositoryError>;
}

/// Persistence port for organization funds (subtype + joined base rows).
#[async_trait]
pub trait OrganizationFundRepository: Send + Sync {
    /// Fetch every organization fund joined with its base row.
    async fn fetch_all(&self) -> Result<Vec<OwnedFund>, RepositoryError>;

    /// Drop the subtype table if present and recreate it with its
    /// constraints.
    async fn initialize(&self) -> Result<(), RepositoryError>;

    /// Insert the base fund row and the subtype row in one transaction,
    /// returning the generated fund identifier.
    async fn insert(
        &self,
        fund: &NewFund,
        tax_id: TaxId,
        org_email: &Email,
    ) -> Result<FundId, RepositoryError>;

    /// Apply the two-table partial update atomically: both statements land
    /// or neither does.
    async fn update_fund_and_subtype(
        &self,
        id: FundId,
        fund: &FundPatch,
        subtype: &OrganizationFundPatch,
    ) -> Result<(), RepositoryError>;

    /// Number of organization fund rows.
    async fn count(&self) -> Result<u64, RepositoryError>;
}

/// Per-fund donation total used by the above-average report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FundDonationTotal {
    /// Campaign the total belongs to.
    pub fund_id: FundId,
    /// Sum of donation amounts in minor units.
    pub total: i64,
}

/// Persistence port for the donations table.
#[async_trait]
pub trait DonationRepository: Send + Sync {
    /// Fetch every donation row.
    async fn fetch_all(&self) -> Result<Vec<Donation>, RepositoryError>;

    /// Fetch donations made by one user.
    async fn for_user(&self, email: &Email) -> Result<Vec<Donation>, RepositoryError>;

    /// Drop the table if present and recreate it with its constraints.
    async fn initialize(&self) -> Result<(), RepositoryError>;

    /// Insert a donation, returning the generated identifier.
    async fn insert(&self, donation: &NewDonation) -> Result<DonationId, RepositoryError>;

    /// Replace every mutable field of a donation; `NotFound` when no row
    /// matched.
    async fn update(
        &self,
        id: DonationId,
        donation: &NewDonation,
    ) -> Result<(), RepositoryError>;

    /// Number of donation rows.
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Users who have donated to every fund (relational division).
    async fn donors_in_every_fund(&self) -> Result<Vec<Email>, RepositoryError>;

    /// Funds whose donation total exceeds the average total across funds.
    async fn funds_above_average(&self) -> Result<Vec<FundDonationTotal>, RepositoryError>;
}
