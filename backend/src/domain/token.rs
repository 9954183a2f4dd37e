//! Signed, time-limited bearer tokens.
//!
//! Tokens are stateless HS256 JWTs: the subject is the principal's email and
//! an optional `typ` claim distinguishes organizations. Signup tokens live
//! longer than login tokens, matching the cookie lifetimes the HTTP layer
//! sets.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::auth::{PrincipalKind, TokenClaims};
use super::error::Error;
use super::user::Email;

/// Which of the two configured lifetimes a token gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLifetime {
    /// Issued at signup; 30 days by default.
    Signup,
    /// Issued at login; 1 day by default.
    Login,
}

/// A freshly issued token with its expiry instant, for cookie attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    /// Compact JWT.
    pub token: String,
    /// When the token stops validating.
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    signup_ttl: Duration,
    login_ttl: Duration,
}

impl TokenSigner {
    /// Construct a signer from the shared secret and the two lifetimes.
    pub fn new(secret: &str, signup_ttl: Duration, login_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            signup_ttl,
            login_ttl,
        }
    }

    /// Lifetime duration for the given token purpose.
    pub fn ttl(&self, lifetime: TokenLifetime) -> Duration {
        match lifetime {
            TokenLifetime::Signup => self.signup_ttl,
            TokenLifetime::Login => self.login_ttl,
        }
    }

    /// Issue a signed token for the principal.
    pub fn issue(
        &self,
        email: &Email,
        kind: PrincipalKind,
        lifetime: TokenLifetime,
    ) -> Result<SignedToken, Error> {
        let now = Utc::now();
        let expires_at = now + self.ttl(lifetime);
        let claims = TokenClaims {
            sub: email.as_str().to_owned(),
            // Absent claim means user; clients rely on that shape.
            kind: match kind {
                PrincipalKind::User => None,
                PrincipalKind::Organization => Some(PrincipalKind::Organization),
            },
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| Error::internal(format!("token signing failed: {err}")))?;
        Ok(SignedToken { token, expires_at })
    }

    /// Verify a token's signature and expiry, returning its claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, Error> {
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| Error::unauthorized("invalid or expired token"))
    }
}
