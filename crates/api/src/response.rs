//! Shared response envelope for API handlers.
//!
//! Successful responses use `{ "success": true, "message"?: ..., "data": ... }`.
//! Errors are produced by [`AppError`](crate::error::AppError) with
//! `success: false`.

use serde::Serialize;

/// Standard success envelope.
///
/// ```ignore
/// Ok(Json(ApiResponse::ok(items)))
/// Ok(Json(ApiResponse::ok(record).with_message("Achievement unlocked successfully")))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
