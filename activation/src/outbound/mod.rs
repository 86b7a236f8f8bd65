//! Outbound adapters implementing domain ports.
//!
//! - **activation**: reqwest client for the activation backend
//! - **registry**: in-memory authoritative code store for the reference backend
//! - **pending**: session-scoped pending-code storage (memory or directory)
//! - **notifier**: notification sink that writes structured log records
//!
//! Adapters translate between domain types and transport representations.
//! They contain no business logic.

pub mod activation;
pub mod notifier;
pub mod pending;
pub mod registry;
