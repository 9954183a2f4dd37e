//! Authentication primitives: credentials, principals, and token claims.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to the auth service.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::organization::Organization;
use super::user::{Email, User};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `password` is non-empty and keeps caller-provided whitespace so
///   credential comparisons never surprise the caller.
///
/// The password is zeroized on drop.
#[derive(Debug, Clone)]
pub struct Credentials {
    email: Email,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials from a validated email and a raw password.
    pub fn new(email: Email, password: &str) -> Result<Self, CredentialsValidationError> {
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the principal lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password as provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// The two principal kinds the system authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    /// An individual user.
    User,
    /// A volunteer organization.
    Organization,
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Organization => f.write_str("organization"),
        }
    }
}

/// An authenticated actor resolved from a token subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum Principal {
    /// A user principal with its profile row.
    User {
        /// Profile as stored.
        user: User,
    },
    /// An organization principal with its profile row.
    Organization {
        /// Profile as stored.
        organization: Organization,
    },
}

impl Principal {
    /// Which kind of principal this is.
    pub fn kind(&self) -> PrincipalKind {
        match self {
            Self::User { .. } => PrincipalKind::User,
            Self::Organization { .. } => PrincipalKind::Organization,
        }
    }

    /// The principal's email, regardless of kind.
    pub fn email(&self) -> &Email {
        match self {
            Self::User { user } => &user.email,
            Self::Organization { organization } => &organization.email,
        }
    }
}

/// Claims carried by a signed token.
///
/// `typ` is written for organizations and omitted for users, matching
/// clients that treat an absent claim as the user kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the principal's email.
    pub sub: String,
    /// Principal kind; absent means user.
    #[serde(rename = "typ", skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<PrincipalKind>,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl TokenClaims {
    /// Principal kind encoded in the claims, defaulting to user.
    pub fn principal_kind(&self) -> PrincipalKind {
        self.kind.unwrap_or(PrincipalKind::User)
    }
}
