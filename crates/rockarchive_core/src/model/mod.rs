//! Domain model for the band archive.
//!
//! # Responsibility
//! - Define the artist record shared by both storage backends.
//! - Own track-list normalization so every backend stores the same shape.
//!
//! # Invariants
//! - A persisted record always has a non-blank `name`.
//! - `famous_tracks` holds trimmed, non-empty strings in insertion order.

pub mod artist;
