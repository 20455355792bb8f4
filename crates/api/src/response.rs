//! Shared response body types for API handlers.
//!
//! Every successful response carries `success: true` so browser clients can
//! branch on one field. Handlers with extra payload define their own structs
//! and flatten or repeat the flag.

use serde::Serialize;

/// `{ "success": true, "message": "..." }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
