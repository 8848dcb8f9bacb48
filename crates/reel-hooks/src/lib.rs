//! # reel-hooks
//!
//! Side-channel inspectors invoked once per turn, before the reasoning
//! step. Hooks observe conversation metadata — they never alter or block
//! the turn, and a failing hook is logged and skipped (fail-open).
//!
//! Built-in hooks:
//!
//! - [`TitleCaptureHook`] — captures the first user message as the session
//!   title (first-write-wins) and consumes the first-request flag
//! - [`IdentityObserverHook`] — read-only debug logging of the acting
//!   identity, produces no state mutation

#![deny(unsafe_code)]

mod builtin;
mod engine;
mod errors;
mod handler;
mod registry;
mod types;

pub use builtin::{IdentityObserverHook, TitleCaptureHook};
pub use engine::HookEngine;
pub use errors::HookError;
pub use handler::HookHandler;
pub use registry::HookRegistry;
pub use types::HookContext;
