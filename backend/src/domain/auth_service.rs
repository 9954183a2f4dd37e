//! Authentication use-cases: signup, login, and token-subject resolution.

use std::sync::Arc;

use super::auth::{Credentials, Principal, PrincipalKind};
use super::error::Error;
use super::organization::Organization;
use super::password::PasswordHasher;
use super::ports::{OrganizationRepository, UserRepository};
use super::token::{SignedToken, TokenLifetime, TokenSigner};
use super::user::User;

/// Message returned for every credential failure, deliberately identical for
/// unknown emails and wrong passwords.
const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Signup, login, and guard resolution over the two principal stores.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: TokenSigner,
}

impl AuthService {
    /// Assemble the service from its ports and the token signer.
    pub fn new(
        users: Arc<dyn UserRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: TokenSigner,
    ) -> Self {
        Self {
            users,
            organizations,
            hasher,
            tokens,
        }
    }

    /// Token signer, for cookie lifetime calculations at the HTTP edge.
    pub fn tokens(&self) -> &TokenSigner {
        &self.tokens
    }

    /// Register a user, hash the password, and issue a signup token.
    ///
    /// Fails with a conflict when the email is already registered; a
    /// concurrent duplicate insert surfaces the same way via the unique key.
    pub async fn signup_user(
        &self,
        user: &User,
        password: &str,
    ) -> Result<SignedToken, Error> {
        if self.users.find_by_email(&user.email).await?.is_some() {
            return Err(Error::conflict("email is already in use"));
        }
        let password_hash = self.hasher.hash(password)?;
        self.users.insert(user, &password_hash).await?;
        self.tokens
            .issue(&user.email, PrincipalKind::User, TokenLifetime::Signup)
    }

    /// Register an organization, hash the password, and issue a signup token.
    pub async fn signup_organization(
        &self,
        organization: &Organization,
        password: &str,
    ) -> Result<SignedToken, Error> {
        if self
            .organizations
            .find_by_email(&organization.email)
            .await?
            .is_some()
        {
            return Err(Error::conflict("email is already in use"));
        }
        let password_hash = self.hasher.hash(password)?;
        self.organizations
            .insert(organization, &password_hash)
            .await?;
        self.tokens.issue(
            &organization.email,
            PrincipalKind::Organization,
            TokenLifetime::Signup,
        )
    }

    /// Verify credentials for the given principal kind and issue a login
    /// token.
    pub async fn login(
        &self,
        kind: PrincipalKind,
        credentials: &Credentials,
    ) -> Result<SignedToken, Error> {
        let stored = match kind {
            PrincipalKind::User => self.users.credential_by_email(credentials.email()).await?,
            PrincipalKind::Organization => {
                self.organizations
                    .credential_by_email(credentials.email())
                    .await?
            }
        };
        let Some(stored) = stored else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !self
            .hasher
            .verify(credentials.password(), &stored.password_hash)?
        {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        self.tokens
            .issue(credentials.email(), kind, TokenLifetime::Login)
    }

    /// Resolve a bearer token to its principal.
    ///
    /// The `typ` claim selects which table to probe, so each guarded request
    /// costs a single lookup. A valid token whose subject row has since been
    /// deleted resolves to not-found, distinct from unauthorized.
    pub async fn resolve(&self, token: &str) -> Result<Principal, Error> {
        let claims = self.tokens.verify(token)?;
        let email = super::user::Email::new(&claims.sub)
            .map_err(|_| Error::unauthorized("invalid token subject"))?;
        match claims.principal_kind() {
            PrincipalKind::User => self
                .users
                .find_by_email(&email)
                .await?
                .map(|user| Principal::User { user })
                .ok_or_else(|| Error::not_found("principal no longer exists")),
            PrincipalKind::Organization => self
                .organizations
                .find_by_email(&email)
                .await?
                .map(|organization| Principal::Organization { organization })
                .ok_or_else(|| Error::not_found("principal no longer exists")),
        }
    }
}
