//! Request classification.
//!
//! Selecting a handler is a best-effort process that may be backed by a
//! reasoning model; the runtime only depends on the [`Classifier`] trait.
//! [`KeywordClassifier`] is the deterministic default: first rule whose
//! keyword matches the request wins.

use crate::registry::HandlerRegistry;
use crate::types::TurnRequest;

/// Chooses at most one handler for a request.
///
/// Returning `None` means no specialist matches; the router then answers
/// directly instead of delegating.
#[cfg_attr(test, mockall::automock)]
pub trait Classifier: Send + Sync {
    /// Pick a handler name from the registry for this request.
    fn classify(&self, request: &TurnRequest, registry: &HandlerRegistry) -> Option<String>;
}

/// One keyword rule: any listed keyword routes to the named handler.
#[derive(Clone, Debug)]
struct Rule {
    keywords: Vec<String>,
    handler_id: String,
}

/// Deterministic substring classifier.
///
/// Rules are evaluated in registration order; the first rule with a
/// matching keyword wins. Matching is case-insensitive on the request
/// content. A chosen handler missing from the registry is skipped rather
/// than routed to.
#[derive(Clone, Debug, Default)]
pub struct KeywordClassifier {
    rules: Vec<Rule>,
}

impl KeywordClassifier {
    /// Create a classifier with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule mapping `keywords` to `handler_id`.
    #[must_use]
    pub fn rule<I, S>(mut self, handler_id: &str, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.push(Rule {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
            handler_id: handler_id.to_owned(),
        });
        self
    }

    /// The rule set wired for the built-in media workflow.
    ///
    /// The director rule comes first: a request that mentions the film at
    /// all goes through the full pipeline, and only bare render requests
    /// reach the renderer directly.
    #[must_use]
    pub fn for_media_workflow() -> Self {
        Self::new()
            .rule(
                "director",
                [
                    "movie", "video", "film", "scene", "動画", "映画", "シーン", "場面",
                ],
            )
            .rule("renderer", ["render", "レンダリング", "生成して"])
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, request: &TurnRequest, registry: &HandlerRegistry) -> Option<String> {
        let content = request.content.to_lowercase();
        for rule in &self.rules {
            if rule.keywords.iter().any(|k| content.contains(k)) {
                if registry.get(&rule.handler_id).is_some() {
                    return Some(rule.handler_id.clone());
                }
                tracing::warn!(
                    handler = %rule.handler_id,
                    "classifier matched an unregistered handler, skipping rule"
                );
            }
        }
        None
    }
}
