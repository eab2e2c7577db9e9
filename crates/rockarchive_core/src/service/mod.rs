//! Use-case services for the interactive surface.
//!
//! # Responsibility
//! - Orchestrate record store, asset store and chat calls per interaction.
//! - Keep callers decoupled from the active storage backend.

pub mod archive_service;
