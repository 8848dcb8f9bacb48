//! # reel-session
//!
//! Per-conversation session state store.
//!
//! Every handler, hook, and the render engine reads and writes one shared
//! state record per conversation. The store defines the merge semantics —
//! first-write-wins keys, per-entry upserts, append-only lists — while
//! durable persistence at the end of a turn belongs to the hosting runtime
//! (it calls [`SessionStore::snapshot`] and stores the result).
//!
//! All mutations are atomic: the store is a single owned map behind one
//! internal lock, so concurrent scene tasks appending to the same list can
//! never lose an update.

#![deny(unsafe_code)]

mod errors;
pub mod keys;
mod store;

pub use errors::SessionError;
pub use store::SessionStore;
