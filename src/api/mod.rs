//! HTTP surface: a small local JSON API plus static file serving for the SPA.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod types;

pub use error::ApiError;
pub use router::app_router;
pub use types::ApiContext;
