//! Job and outcome types for the fan-out engine.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use reel_settings::RenderSettings;

/// One scene's job, as handed to the fan-out engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    /// Canonical scene id.
    pub scene_id: String,
    /// Opaque structured prompt content, serialized.
    pub prompt_payload: Value,
    /// Optional reference image. Dropped (not an error) when it does not
    /// use the storage scheme the service recognizes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_image_uri: Option<String>,
}

/// Terminal outcome of one scene's job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// The service produced an artifact; its URI was appended to the
    /// scene's history.
    Success {
        /// Storage URI of the produced artifact.
        result_uri: String,
    },
    /// The job failed — service-reported error, malformed result, or a
    /// fault during submit/poll.
    Failure {
        /// Human-readable failure detail.
        error_detail: String,
    },
    /// The enclosing turn was cancelled before the job reached a terminal
    /// state. Nothing was appended.
    Cancelled,
}

/// One scene's job paired with its terminal outcome.
#[derive(Clone, Debug)]
pub struct JobResult {
    /// Canonical scene id.
    pub scene_id: String,
    /// What happened.
    pub outcome: JobOutcome,
}

/// Overall status of a fan-out run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStatus {
    /// At least one scene produced an artifact (partial failures are
    /// enumerated in the message and error list).
    Success,
    /// No scene produced an artifact.
    Failure,
}

/// Aggregate result of one fan-out run.
///
/// The `movie_urls` snapshot is returned regardless of status so callers
/// always see the current per-scene history.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutcome {
    /// Overall status: success iff at least one scene succeeded.
    pub status: RenderStatus,
    /// Scenes that produced an artifact.
    pub success_count: usize,
    /// Scenes submitted.
    pub total_count: usize,
    /// `(scene_id, message)` for every failed scene, in completion order.
    pub per_scene_errors: Vec<(String, String)>,
    /// Snapshot of every scene's artifact history after the run.
    pub movie_urls: HashMap<String, Vec<String>>,
    /// Human-readable summary enumerating any failures.
    pub message: String,
}

/// Engine configuration.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Fixed interval between completion polls.
    pub poll_interval: Duration,
    /// Optional cap on polls per job; `None` waits indefinitely.
    pub max_polls: Option<u32>,
    /// Storage prefix output is written under.
    pub output_uri_prefix: String,
    /// URI scheme the service accepts and reports.
    pub storage_scheme: String,
}

impl RenderConfig {
    /// Build engine configuration from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            poll_interval: Duration::from_secs(settings.poll_interval_secs),
            max_polls: settings.max_polls,
            output_uri_prefix: settings.output_uri_prefix.clone(),
            storage_scheme: settings.storage_scheme.clone(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::from_settings(&RenderSettings::default())
    }
}
