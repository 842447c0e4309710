//! Shared foundational types used across the Kiln build-description engine.
//!
//! This crate provides content hashing for change detection and stable
//! identifiers that survive across generation passes.

#![warn(missing_docs)]

pub mod hash;
pub mod id;

pub use hash::{ContentHash, ParseHashError};
pub use id::{ParseIdError, StableId};
