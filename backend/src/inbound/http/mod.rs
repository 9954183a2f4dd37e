//! HTTP adapter: request DTOs, handlers, and the error envelope.
//!
//! Handlers stay thin. They parse payloads into domain types, call one
//! port or service method, and shape the result into the shared response
//! envelopes; policy lives in the domain layer.

mod error;
mod grant;
mod guard;
mod responses;
mod state;

pub mod donations;
pub mod funds;
pub mod health;
pub mod individual_funds;
pub mod organization_funds;
pub mod organizations;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ApiError, ApiResult};
pub use grant::{grant_response, TokenGrant};
pub use guard::{AuthenticatedPrincipal, JWT_COOKIE};
pub use responses::{AckResponse, CountResponse, CreatedResponse, DataResponse};
pub use state::HttpState;
