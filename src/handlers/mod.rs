pub mod auth_handlers;
pub mod content_handlers;
pub mod dashboard;
pub mod public;

use actix_web::{HttpMessage, HttpRequest};

use crate::errors::AppError;
use crate::models::account::Identity;

/// The supervisor identity attached by the dashboard guard.
pub(crate) fn current_identity(req: &HttpRequest) -> Result<Identity, AppError> {
    req.extensions()
        .get::<Identity>()
        .cloned()
        .ok_or_else(|| AppError::Session("No signed-in identity on a guarded route".to_string()))
}
