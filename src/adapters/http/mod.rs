//! HTTP adapters - REST API implementations.

pub mod entitlement;
pub mod error;
mod router;

pub use entitlement::{entitlement_router, EntitlementAppState};
pub use error::{ApiError, ErrorResponse};
pub use router::{app_router, health};
