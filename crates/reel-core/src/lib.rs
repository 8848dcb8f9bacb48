//! # reel-core
//!
//! Foundation types, errors, branded IDs, and scene vocabulary for the Reel
//! agent.
//!
//! This crate provides the shared vocabulary that all other Reel crates
//! depend on:
//!
//! - **Branded IDs**: `SessionId`, `JobId` as newtypes for type safety
//! - **Scene normalization**: canonical `scene<N>` identifiers from free-form
//!   labels, including full-width digits and localized synonyms
//! - **Prompt specification**: the `ScenePrompt` structure one generation job
//!   is built from
//! - **Output units**: `OutputUnit` values handlers yield back to the host
//! - **Logging**: `tracing` subscriber initialization

#![deny(unsafe_code)]

pub mod ids;
pub mod logging;
pub mod output;
pub mod prompt;
pub mod scene;

pub use ids::{JobId, SessionId};
pub use output::OutputUnit;
pub use prompt::ScenePrompt;
pub use scene::{NormalizedLabel, normalize};
