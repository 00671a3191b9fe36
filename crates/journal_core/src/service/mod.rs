//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep request handling layers decoupled from storage details.

pub mod entry_manager;
