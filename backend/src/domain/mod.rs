//! Domain model: entities, validation, authentication, and the persistence
//! ports the adapters implement.

pub mod auth;
pub mod auth_service;
pub mod donation;
pub mod error;
pub mod fund;
pub mod organization;
pub mod password;
pub mod ports;
pub mod token;
pub mod user;

pub use auth::{Credentials, Principal, PrincipalKind, TokenClaims};
pub use auth_service::AuthService;
pub use donation::{Donation, DonationId, Donor, NewDonation};
pub use error::{Error, ErrorCode};
pub use fund::{
    Fund, FundId, FundOwnership, FundPatch, IndividualFundPatch, NewFund, OrganizationFundPatch,
    OwnedFund, Ssn, TaxId,
};
pub use organization::{Organization, OrganizationColumn};
pub use password::{BcryptPasswordHasher, PasswordHasher};
pub use ports::{
    DonationRepository, FundDonationTotal, FundRepository, IndividualFundRepository,
    OrganizationFundRepository, OrganizationRepository, RepositoryError, SearchCondition,
    SearchConnective, SearchOperator, StoredCredential, UserRepository, UserSearch,
    UserSearchField,
};
pub use token::{SignedToken, TokenLifetime, TokenSigner};
pub use user::{Email, PhoneNumber, User};
