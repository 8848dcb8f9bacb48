//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON
//! wire format. Each type implements [`Default`] with production default
//! values. Types marked with `#[serde(default)]` allow partial JSON —
//! missing fields get their default value during deserialization.

use serde::{Deserialize, Serialize};

/// Root settings type for the Reel agent.
///
/// Loaded from `~/.reel/settings.json` with defaults applied for missing
/// fields. Environment variables can override specific values.
///
/// # JSON Format
///
/// All field names are camelCase. Example:
///
/// ```json
/// {
///   "version": "0.1.0",
///   "render": { "pollIntervalSecs": 5 }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReelSettings {
    /// Settings schema version.
    pub version: String,
    /// Application name.
    pub name: String,
    /// Generation job fan-out settings.
    pub render: RenderSettings,
    /// Delegation runtime settings.
    pub agent: AgentSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for ReelSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "reel".to_string(),
            render: RenderSettings::default(),
            agent: AgentSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Settings for the job fan-out and polling engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    /// Seconds between completion polls of one generation job.
    pub poll_interval_secs: u64,
    /// Optional cap on polls per job. `None` waits indefinitely, matching
    /// the generation service's open-ended operations.
    pub max_polls: Option<u32>,
    /// Storage prefix generation output is written under. Per-user paths
    /// are nested beneath it.
    pub output_uri_prefix: String,
    /// URI scheme the generation service accepts for reference images and
    /// reports for result artifacts.
    pub storage_scheme: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 15,
            max_polls: None,
            output_uri_prefix: "gs://reel-artifacts/video-output".to_string(),
            storage_scheme: "gs://".to_string(),
        }
    }
}

/// Settings for the delegation runtime.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSettings {
    /// Maximum chained delegations executed within one turn.
    pub max_delegation_depth: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_delegation_depth: 8,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum log level when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
