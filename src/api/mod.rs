//! HTTP API layer

mod routes;
mod handlers;

pub use handlers::INVALID_ENDPOINT;
pub use routes::{create_router, ApiDoc, AppState};
