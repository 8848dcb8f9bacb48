//! # reel-render
//!
//! Concurrent fan-out over the external generation service: one
//! long-running job per scene, each submitted and polled to completion
//! independently, with partial successes and failures combined into a
//! single [`RenderOutcome`] and every success appended to the session's
//! `movie_urls` history.
//!
//! The generation service itself is an external collaborator reached
//! through the [`GenerationService`] trait — this crate owns the fan-out,
//! the poll cadence, and the aggregation semantics, never the service.

#![deny(unsafe_code)]

mod engine;
mod errors;
mod service;
mod types;

pub use engine::RenderEngine;
pub use errors::GenerateError;
pub use service::{GeneratedArtifact, GenerationService, OperationHandle, OperationStatus, SubmitRequest};
pub use types::{JobOutcome, JobResult, JobSpec, RenderConfig, RenderOutcome, RenderStatus};
