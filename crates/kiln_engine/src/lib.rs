//! Generation passes: dirty checking, materialization, and backend rendering.
//!
//! A pass asks the regeneration cache which projects changed, materializes
//! the dirty ones for every configuration, and hands the results to a
//! [`Generator`] backend together with the aggregate when project membership
//! changed.

#![warn(missing_docs)]

pub mod artifact;
pub mod context;
pub mod error;
pub mod generator;
pub mod pass;

pub use artifact::{AggregateArtifact, AggregateEntry, ProjectArtifact, ProjectReference};
pub use context::{GenerationContext, GenerationMode};
pub use error::EngineError;
pub use generator::{Generator, JsonGenerator};
pub use pass::{run, GenerationReport};
