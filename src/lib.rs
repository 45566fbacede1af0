//! QuizGod Entitlements - premium access driven by payment provider webhooks.
//!
//! Stripe, FastSpring and Paddle notify this service when a purchase or
//! subscription changes. Each event is verified, classified and applied to
//! the user's premium flag, with duplicate deliveries skipped through a
//! ledger. A maintenance binary repairs quiz attempts missing their subject.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
