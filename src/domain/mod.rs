//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `entitlement` - Provider events, classification, and the premium record
//! - `quiz` - Quiz and attempt records touched by the subject backfill

pub mod entitlement;
pub mod foundation;
pub mod quiz;
