//! Calendar use-case services.
//!
//! # Responsibility
//! - Map bot commands onto model mutations, persistence and republishing.
//! - Keep the command layer decoupled from storage, rendering and transport.

pub mod calendar_service;
pub mod listing;
