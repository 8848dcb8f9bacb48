//! Structured prompt specification for one scene.
//!
//! Every scene the user plans is eventually captured as a [`ScenePrompt`]
//! under `scene_config` in session state, then serialized as the payload of
//! one generation job. Fields mirror the blueprint the prompt-construction
//! handler fills in; all names are camelCase on the wire.

use serde::{Deserialize, Serialize};

/// Structured prompt specification for a single scene.
///
/// Free-form content lives in the individual fields; this type only pins
/// the shape. Unknown or missing fields deserialize to their defaults so
/// partially-filled blueprints round-trip.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenePrompt {
    /// Cinematic summary of the scene — what happens visually.
    pub description: String,
    /// Visual mood or aesthetic.
    pub style: String,
    /// Camera movement or framing.
    pub camera: String,
    /// Lens or framing type.
    pub lens: String,
    /// How the scene is lit.
    pub lighting: String,
    /// Scene location or space.
    pub environment: String,
    /// Music or sound design.
    pub audio: String,
    /// Objects, subjects, or visual items that must appear.
    pub elements: Vec<String>,
    /// How objects move or transform in the scene.
    pub motion: String,
    /// The final visual moment or shot.
    pub ending: String,
    /// On-screen text, usually `"none"`.
    pub text: String,
    /// Descriptive tags reinforcing theme, tone, or subject.
    pub keywords: Vec<String>,
    /// Optional reference image for the generation service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
