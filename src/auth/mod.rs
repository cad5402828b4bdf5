use crate::state::AppState;
use axum::Router;

pub mod claims;
mod dto;
pub(crate) mod extractors;
pub mod guard;
pub mod handlers;
pub mod ownership;
pub mod password;
pub mod session;
pub mod validation;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
