//! Calendar domain model.
//!
//! # Responsibility
//! - Define the custom calendar, per-date event storage and per-guild state.
//! - Stay free of I/O so every rule here is testable in isolation.
//!
//! # Invariants
//! - Dates are validated on construction; no out-of-range date is stored.

pub mod calendar;
pub mod event_store;
pub mod guild;
