//! REST API route tree.

pub mod auth_extractor;
pub mod error;
pub mod tokens;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` router.
pub fn router() -> Router<AppState> {
    Router::new().merge(tokens::router())
}
