//! API layer - HTTP endpoints and middleware

pub mod cache;
pub mod health;
pub mod middleware;
pub mod movies;
pub mod query;
pub mod router;
pub mod state;
pub mod types;

pub use router::create_router;
pub use state::AppState;
