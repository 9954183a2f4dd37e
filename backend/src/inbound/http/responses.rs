//! Shared success envelopes used by every endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// List responses: `{ "data": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DataResponse<T> {
    /// Result rows.
    pub data: Vec<T>,
}

impl<T> DataResponse<T> {
    /// Wrap rows in the list envelope.
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

/// Acknowledgement responses: `{ "success": true }`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AckResponse {
    /// Always `true`; failures use the error envelope instead.
    pub success: bool,
}

impl AckResponse {
    /// The affirmative acknowledgement.
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Count responses: `{ "success": true, "count": n }`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    /// Always `true`; failures use the error envelope instead.
    pub success: bool,
    /// Number of rows in the table.
    pub count: u64,
}

impl CountResponse {
    /// Wrap a row count in the envelope.
    pub fn new(count: u64) -> Self {
        Self {
            success: true,
            count,
        }
    }
}

/// Creation responses carrying the generated identifier.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    /// Always `true`; failures use the error envelope instead.
    pub success: bool,
    /// Store-assigned identifier of the new row.
    pub id: i64,
}

impl CreatedResponse {
    /// Wrap a generated identifier in the envelope.
    pub fn new(id: i64) -> Self {
        Self { success: true, id }
    }
}
