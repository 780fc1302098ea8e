//! HTTP handlers

pub mod health;
pub mod predict;

use crate::error::AppError;

pub async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}
