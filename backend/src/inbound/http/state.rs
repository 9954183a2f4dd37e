//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    DonationRepository, FundRepository, IndividualFundRepository, OrganizationFundRepository,
    OrganizationRepository, UserRepository,
};
use crate::domain::AuthService;

/// Dependency bundle for HTTP handlers: one handle per aggregate port plus
/// the authentication service.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub funds: Arc<dyn FundRepository>,
    pub individual_funds: Arc<dyn IndividualFundRepository>,
    pub organization_funds: Arc<dyn OrganizationFundRepository>,
    pub donations: Arc<dyn DonationRepository>,
    pub auth: AuthService,
}
