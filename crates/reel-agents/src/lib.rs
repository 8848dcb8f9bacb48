//! # reel-agents
//!
//! The delegation layer: a supervisor router classifies each inbound
//! request onto exactly one specialist handler, handlers return output
//! units plus optional typed delegation instructions, and the turn runtime
//! executes those delegations as explicit message passing (never implicit
//! recursive dispatch).
//!
//! The built-in specialist set mirrors the media workflow: a director that
//! bootstraps session identity and hands the whole turn to the planning
//! pipeline, a scene planner, a prompt builder, and a renderer that drives
//! the generation fan-out.

#![deny(unsafe_code)]

mod classifier;
mod director;
mod errors;
mod handler;
mod pipeline;
mod registry;
mod router;
mod runtime;
mod types;

pub use classifier::{Classifier, KeywordClassifier};
pub use director::DirectorHandler;
pub use errors::AgentError;
pub use handler::{Handler, HandlerInput, HandlerTurn, TurnContext};
pub use pipeline::{PromptBuilderHandler, RendererHandler, ScenePlannerHandler};
pub use registry::HandlerRegistry;
pub use router::{Routed, SupervisorRouter};
pub use runtime::Runtime;
pub use types::{Delegation, TurnRequest};
