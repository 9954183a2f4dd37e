//! PostgreSQL persistence adapters using Diesel.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL via Diesel with async support through `diesel-async` and bb8
//! connection pooling.
//!
//! The adapters stay thin: they translate between Diesel row structs
//! (`models.rs`) and domain types, and map database failures onto the typed
//! `RepositoryError` variants. No business logic lives here, and the row
//! structs and schema definitions never leak out of this module.

pub(crate) mod diesel_helpers;
mod diesel_donation_repository;
mod diesel_fund_repository;
mod diesel_individual_fund_repository;
mod diesel_organization_fund_repository;
mod diesel_organization_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_donation_repository::DieselDonationRepository;
pub use diesel_fund_repository::DieselFundRepository;
pub use diesel_individual_fund_repository::DieselIndividualFundRepository;
pub use diesel_organization_fund_repository::DieselOrganizationFundRepository;
pub use diesel_organization_repository::DieselOrganizationRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
