//! HTTP API module.
//!
//! Router assembly, shared state and the unified error surface.

mod error;
pub mod handlers;
mod routes;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
