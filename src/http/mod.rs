//! Speech gateway HTTP API
//!
//! Accepts recordings from the quiz front end and relays them to the
//! speech-recognition service:
//! - POST /api/speech - Encode, check and recognize an uploaded recording
//! - GET /api/health - Health check
//!
//! All routes share a per-client rate limit.

mod errors;
mod handlers;
mod rate_limit;
mod routes;
mod state;

pub use errors::ApiError;
pub use rate_limit::RateLimiter;
pub use routes::create_router;
pub use state::AppState;
