//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - axum endpoints for webhooks and premium checks
//! - `memory` - in-memory stores for tests and local runs
//! - `postgres` - PostgreSQL stores
//! - `redis` - Redis-backed webhook ledger

pub mod http;
pub mod memory;
pub mod postgres;
pub mod redis;
