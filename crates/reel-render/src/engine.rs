//! The fan-out and polling engine.
//!
//! # Execution model
//!
//! [`RenderEngine::render_all`] spawns one task per scene and suspends the
//! calling turn until every task reaches a terminal state (a join barrier
//! over the whole set, never a subset). Each task is submit →
//! poll-until-done → extract, with the poll sleep as its only intentional
//! suspension. A single scene's fault — service-reported error, malformed
//! result, panic, transport failure — never aborts sibling scenes or the
//! aggregate run.
//!
//! Successes append to the session's `movie_urls` history as they happen,
//! through the store's atomic append, so concurrent completions cannot
//! lose updates. The aggregate is `Success` when at least one scene
//! produced an artifact; failures are enumerated per scene either way.
//!
//! # Cancellation
//!
//! The caller's [`CancellationToken`] is observed at every suspension
//! point. A cancelled task performs no append and is excluded from both
//! the success count and the error list.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use futures::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use reel_core::JobId;
use reel_session::SessionStore;

use crate::service::{GenerationService, SubmitRequest};
use crate::types::{JobOutcome, JobResult, JobSpec, RenderConfig, RenderOutcome, RenderStatus};

/// In-flight bookkeeping for one scene's job.
struct JobTicket {
    job_id: JobId,
    started_at: Instant,
}

/// Concurrent per-scene job engine over an external [`GenerationService`].
pub struct RenderEngine {
    service: Arc<dyn GenerationService>,
    config: RenderConfig,
    /// Scenes currently being rendered: scene id → ticket.
    in_flight: DashMap<String, JobTicket>,
}

impl RenderEngine {
    /// Create an engine over the given service.
    #[must_use]
    pub fn new(service: Arc<dyn GenerationService>, config: RenderConfig) -> Self {
        Self {
            service,
            config,
            in_flight: DashMap::new(),
        }
    }

    /// Scenes with an outstanding job, in no particular order.
    #[must_use]
    pub fn active_scenes(&self) -> Vec<String> {
        self.in_flight.iter().map(|e| e.key().clone()).collect()
    }

    /// Run one job per scene to completion and aggregate the results.
    ///
    /// Returns once every job has reached a terminal state (or the token
    /// was cancelled and every task observed it). The returned outcome
    /// always carries the current `movie_urls` snapshot.
    pub async fn render_all(
        &self,
        jobs: Vec<JobSpec>,
        session: &SessionStore,
        cancel: &CancellationToken,
    ) -> RenderOutcome {
        let total_count = jobs.len();
        let mut set: JoinSet<JobResult> = JoinSet::new();

        for spec in jobs {
            let service = Arc::clone(&self.service);
            let config = self.config.clone();
            let session = session.clone();
            let cancel = cancel.clone();
            let scene_id = spec.scene_id.clone();
            let job_id = JobId::new();
            let _ = self.in_flight.insert(
                scene_id.clone(),
                JobTicket {
                    job_id: job_id.clone(),
                    started_at: Instant::now(),
                },
            );
            debug!(job_id = %job_id, scene_id = %scene_id, "scene job launched");
            let _ = set.spawn(async move {
                match AssertUnwindSafe(run_job(service, config, session, spec, cancel))
                    .catch_unwind()
                    .await
                {
                    Ok(result) => result,
                    Err(panic) => JobResult {
                        scene_id,
                        outcome: JobOutcome::Failure {
                            error_detail: format!(
                                "unexpected fault: {}",
                                panic_message(panic.as_ref())
                            ),
                        },
                    },
                }
            });
        }

        let mut success_count = 0usize;
        let mut cancelled_count = 0usize;
        let mut per_scene_errors: Vec<(String, String)> = Vec::new();

        // Completion order, not submission order.
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(result) => {
                    if let Some((_, ticket)) = self.in_flight.remove(&result.scene_id) {
                        debug!(
                            job_id = %ticket.job_id,
                            scene_id = %result.scene_id,
                            duration_ms = ticket.started_at.elapsed().as_millis(),
                            "scene job finished"
                        );
                    }
                    match result.outcome {
                        JobOutcome::Success { result_uri } => {
                            info!(scene_id = %result.scene_id, uri = %result_uri, "scene rendered");
                            success_count += 1;
                        }
                        JobOutcome::Failure { error_detail } => {
                            warn!(scene_id = %result.scene_id, error = %error_detail, "scene failed");
                            per_scene_errors.push((result.scene_id, error_detail));
                        }
                        JobOutcome::Cancelled => {
                            debug!(scene_id = %result.scene_id, "scene cancelled before completion");
                            cancelled_count += 1;
                        }
                    }
                }
                Err(join_error) => {
                    // Tasks trap their own panics; this only fires for an
                    // external abort.
                    warn!(error = %join_error, "scene task aborted");
                }
            }
        }

        let status = if success_count > 0 {
            RenderStatus::Success
        } else {
            RenderStatus::Failure
        };
        let message = build_message(success_count, total_count, &per_scene_errors, cancelled_count);
        let movie_urls = session.movie_urls().unwrap_or_else(|error| {
            warn!(error = %error, "movie_urls snapshot malformed, returning empty");
            std::collections::HashMap::new()
        });

        RenderOutcome {
            status,
            success_count,
            total_count,
            per_scene_errors,
            movie_urls,
            message,
        }
    }
}

/// Drive one scene's job: submit → poll until done → extract.
async fn run_job(
    service: Arc<dyn GenerationService>,
    config: RenderConfig,
    session: SessionStore,
    spec: JobSpec,
    cancel: CancellationToken,
) -> JobResult {
    let scene_id = spec.scene_id.clone();
    let outcome = drive(&*service, &config, &session, spec, &cancel).await;
    JobResult { scene_id, outcome }
}

async fn drive(
    service: &dyn GenerationService,
    config: &RenderConfig,
    session: &SessionStore,
    spec: JobSpec,
    cancel: &CancellationToken,
) -> JobOutcome {
    let scene_id = spec.scene_id;

    if cancel.is_cancelled() {
        return JobOutcome::Cancelled;
    }

    let reference_image_uri = match spec.reference_image_uri {
        Some(uri) if uri.starts_with(&config.storage_scheme) => Some(uri),
        Some(uri) => {
            // Degraded, not an error: generation proceeds without the
            // reference.
            debug!(
                scene_id = %scene_id,
                uri = %uri,
                "reference image does not use the storage scheme, dropping"
            );
            None
        }
        None => None,
    };

    let request = SubmitRequest {
        scene_id: scene_id.clone(),
        prompt_payload: spec.prompt_payload,
        reference_image_uri,
        output_uri: output_location(config, session.acting_user_id().as_deref(), &scene_id),
    };

    let handle = tokio::select! {
        () = cancel.cancelled() => return JobOutcome::Cancelled,
        submitted = service.submit(&request) => match submitted {
            Ok(handle) => handle,
            Err(error) => {
                return JobOutcome::Failure {
                    error_detail: error.to_string(),
                };
            }
        },
    };

    let mut polls: u32 = 0;
    loop {
        let status = tokio::select! {
            () = cancel.cancelled() => return JobOutcome::Cancelled,
            polled = service.poll(&handle) => match polled {
                Ok(status) => status,
                Err(error) => {
                    return JobOutcome::Failure {
                        error_detail: error.to_string(),
                    };
                }
            },
        };

        if status.done {
            if let Some(error_detail) = status.error {
                return JobOutcome::Failure { error_detail };
            }
            return match status.result {
                Some(artifact) if artifact.uri.starts_with(&config.storage_scheme) => {
                    session.append_movie_url(&scene_id, &artifact.uri);
                    JobOutcome::Success {
                        result_uri: artifact.uri,
                    }
                }
                Some(artifact) => JobOutcome::Failure {
                    error_detail: format!(
                        "malformed result uri (expected {} scheme): {}",
                        config.storage_scheme, artifact.uri
                    ),
                },
                None => JobOutcome::Failure {
                    error_detail: "operation finished without result or error".to_owned(),
                },
            };
        }

        polls += 1;
        if let Some(max_polls) = config.max_polls {
            if polls >= max_polls {
                return JobOutcome::Failure {
                    error_detail: format!("operation still running after {polls} polls, giving up"),
                };
            }
        }
        tokio::select! {
            () = cancel.cancelled() => return JobOutcome::Cancelled,
            () = tokio::time::sleep(config.poll_interval) => {}
        }
    }
}

/// Storage location for one scene's output, namespaced by the acting
/// identity when one is present.
fn output_location(config: &RenderConfig, acting_user_id: Option<&str>, scene_id: &str) -> String {
    let prefix = config.output_uri_prefix.trim_end_matches('/');
    match acting_user_id {
        Some(user) => format!("{prefix}/{user}/{scene_id}"),
        None => format!("{prefix}/{scene_id}"),
    }
}

/// Render a summary enumerating every failure.
fn build_message(
    success_count: usize,
    total_count: usize,
    per_scene_errors: &[(String, String)],
    cancelled_count: usize,
) -> String {
    let mut message = if success_count > 0 {
        format!("rendered {success_count}/{total_count} scenes")
    } else {
        format!("no scenes rendered out of {total_count}")
    };
    if !per_scene_errors.is_empty() {
        let details: Vec<String> = per_scene_errors
            .iter()
            .map(|(scene_id, error)| format!("{scene_id}: {error}"))
            .collect();
        message.push_str("; failures: ");
        message.push_str(&details.join("; "));
    }
    if cancelled_count > 0 {
        message.push_str(&format!("; {cancelled_count} cancelled"));
    }
    message
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    use reel_core::SessionId;

    use super::*;
    use crate::errors::GenerateError;
    use crate::service::{OperationHandle, OperationStatus};

    /// Scripted per-scene behavior for the stub service.
    #[derive(Clone)]
    enum Script {
        /// Pending for `pending_polls` polls, then done with `uri`.
        Succeed { pending_polls: u32, uri: String },
        /// Done immediately with a service-reported error.
        ReportError { message: String },
        /// Submission itself fails.
        RejectSubmit { message: String },
        /// Every poll fails at the transport level.
        FailPoll { message: String },
        /// Done immediately with a non-storage result URI.
        MalformedUri { uri: String },
        /// Never reaches a terminal state.
        NeverDone,
        /// Panics during poll.
        PanicOnPoll,
    }

    /// Hand-rolled `GenerationService` driven by per-scene scripts.
    struct StubService {
        scripts: Mutex<HashMap<String, Script>>,
        submits: Mutex<Vec<SubmitRequest>>,
        poll_counts: Mutex<HashMap<String, u32>>,
    }

    impl StubService {
        fn new(scripts: impl IntoIterator<Item = (&'static str, Script)>) -> Arc<Self> {
            Arc::new(Self {
                scripts: Mutex::new(
                    scripts
                        .into_iter()
                        .map(|(scene, script)| (scene.to_owned(), script))
                        .collect(),
                ),
                submits: Mutex::new(Vec::new()),
                poll_counts: Mutex::new(HashMap::new()),
            })
        }

        fn submitted(&self) -> Vec<SubmitRequest> {
            self.submits.lock().clone()
        }
    }

    #[async_trait]
    impl GenerationService for StubService {
        async fn submit(&self, request: &SubmitRequest) -> Result<OperationHandle, GenerateError> {
            self.submits.lock().push(request.clone());
            let script = self
                .scripts
                .lock()
                .get(&request.scene_id)
                .cloned()
                .expect("script registered for scene");
            if let Script::RejectSubmit { message } = script {
                return Err(GenerateError::Submit(message));
            }
            Ok(OperationHandle::new(format!("op-{}", request.scene_id)))
        }

        async fn poll(&self, handle: &OperationHandle) -> Result<OperationStatus, GenerateError> {
            let scene_id = handle.as_str().trim_start_matches("op-").to_owned();
            let script = self
                .scripts
                .lock()
                .get(&scene_id)
                .cloned()
                .expect("script registered for scene");
            let polls = {
                let mut counts = self.poll_counts.lock();
                let entry = counts.entry(scene_id.clone()).or_insert(0);
                *entry += 1;
                *entry
            };
            match script {
                Script::Succeed { pending_polls, uri } => {
                    if polls > pending_polls {
                        Ok(OperationStatus::succeeded(uri, "video/mp4"))
                    } else {
                        Ok(OperationStatus::pending())
                    }
                }
                Script::ReportError { message } => Ok(OperationStatus::failed(message)),
                Script::FailPoll { message } => Err(GenerateError::Poll(message)),
                Script::MalformedUri { uri } => Ok(OperationStatus::succeeded(uri, "video/mp4")),
                Script::NeverDone => Ok(OperationStatus::pending()),
                Script::PanicOnPoll => panic!("stub poll exploded"),
                Script::RejectSubmit { .. } => unreachable!("submit already rejected"),
            }
        }
    }

    fn engine(service: Arc<StubService>) -> Arc<RenderEngine> {
        Arc::new(RenderEngine::new(service, RenderConfig::default()))
    }

    fn engine_with(service: Arc<StubService>, config: RenderConfig) -> Arc<RenderEngine> {
        Arc::new(RenderEngine::new(service, config))
    }

    fn session() -> SessionStore {
        SessionStore::new(SessionId::from("sess-1"))
    }

    fn job(scene_id: &str) -> JobSpec {
        JobSpec {
            scene_id: scene_id.to_owned(),
            prompt_payload: json!({"description": "test scene"}),
            reference_image_uri: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn partial_failure_is_overall_success() {
        let service = StubService::new([
            (
                "scene1",
                Script::Succeed {
                    pending_polls: 0,
                    uri: "gs://out/s1.mp4".into(),
                },
            ),
            (
                "scene2",
                Script::ReportError {
                    message: "quota exhausted".into(),
                },
            ),
            (
                "scene3",
                Script::Succeed {
                    pending_polls: 2,
                    uri: "gs://out/s3.mp4".into(),
                },
            ),
        ]);
        let engine = engine(service);
        let session = session();
        let outcome = engine
            .render_all(
                vec![job("scene1"), job("scene2"), job("scene3")],
                &session,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(outcome.status, RenderStatus::Success);
        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.total_count, 3);
        assert_eq!(
            outcome.per_scene_errors,
            vec![("scene2".to_owned(), "quota exhausted".to_owned())]
        );
        assert_eq!(outcome.movie_urls["scene1"], vec!["gs://out/s1.mp4"]);
        assert_eq!(outcome.movie_urls["scene3"], vec!["gs://out/s3.mp4"]);
        assert!(!outcome.movie_urls.contains_key("scene2"));
        assert!(outcome.message.contains("scene2: quota exhausted"));
    }

    #[tokio::test(start_paused = true)]
    async fn all_failures_is_overall_failure() {
        let service = StubService::new([
            (
                "scene1",
                Script::ReportError {
                    message: "bad prompt".into(),
                },
            ),
            (
                "scene2",
                Script::FailPoll {
                    message: "connection reset".into(),
                },
            ),
        ]);
        let engine = engine(service);
        let session = session();
        let outcome = engine
            .render_all(
                vec![job("scene1"), job("scene2")],
                &session,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(outcome.status, RenderStatus::Failure);
        assert_eq!(outcome.success_count, 0);
        assert_eq!(outcome.per_scene_errors.len(), 2);
        assert!(outcome.movie_urls.is_empty());
        assert!(outcome.message.contains("no scenes rendered"));
    }

    #[tokio::test(start_paused = true)]
    async fn submit_fault_never_aborts_siblings() {
        let service = StubService::new([
            (
                "scene1",
                Script::RejectSubmit {
                    message: "invalid payload".into(),
                },
            ),
            (
                "scene2",
                Script::Succeed {
                    pending_polls: 1,
                    uri: "gs://out/s2.mp4".into(),
                },
            ),
        ]);
        let engine = engine(service);
        let session = session();
        let outcome = engine
            .render_all(
                vec![job("scene1"), job("scene2")],
                &session,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(outcome.status, RenderStatus::Success);
        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.per_scene_errors.len(), 1);
        assert_eq!(outcome.per_scene_errors[0].0, "scene1");
        assert!(outcome.per_scene_errors[0].1.contains("invalid payload"));
    }

    #[tokio::test(start_paused = true)]
    async fn panic_in_service_is_captured_as_scene_error() {
        let service = StubService::new([
            ("scene1", Script::PanicOnPoll),
            (
                "scene2",
                Script::Succeed {
                    pending_polls: 0,
                    uri: "gs://out/s2.mp4".into(),
                },
            ),
        ]);
        let engine = engine(service);
        let session = session();
        let outcome = engine
            .render_all(
                vec![job("scene1"), job("scene2")],
                &session,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(outcome.status, RenderStatus::Success);
        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.per_scene_errors.len(), 1);
        assert!(outcome.per_scene_errors[0].1.contains("unexpected fault"));
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_result_uri_is_a_scene_error() {
        let service = StubService::new([(
            "scene1",
            Script::MalformedUri {
                uri: "https://example.com/s1.mp4".into(),
            },
        )]);
        let engine = engine(service);
        let session = session();
        let outcome = engine
            .render_all(vec![job("scene1")], &session, &CancellationToken::new())
            .await;

        assert_eq!(outcome.status, RenderStatus::Failure);
        assert!(outcome.per_scene_errors[0].1.contains("malformed result uri"));
        assert!(outcome.movie_urls.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rerender_appends_second_uri() {
        let service = StubService::new([(
            "scene1",
            Script::Succeed {
                pending_polls: 0,
                uri: "gs://out/s1.mp4".into(),
            },
        )]);
        let engine = engine(service);
        let session = session();
        let cancel = CancellationToken::new();

        let first = engine
            .render_all(vec![job("scene1")], &session, &cancel)
            .await;
        assert_eq!(first.movie_urls["scene1"].len(), 1);

        let second = engine
            .render_all(vec![job("scene1")], &session, &cancel)
            .await;
        assert_eq!(second.movie_urls["scene1"].len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn reference_image_dropped_unless_storage_scheme() {
        let service = StubService::new([
            (
                "scene1",
                Script::Succeed {
                    pending_polls: 0,
                    uri: "gs://out/s1.mp4".into(),
                },
            ),
            (
                "scene2",
                Script::Succeed {
                    pending_polls: 0,
                    uri: "gs://out/s2.mp4".into(),
                },
            ),
        ]);
        let engine = engine(Arc::clone(&service));
        let session = session();

        let mut with_bad_ref = job("scene1");
        with_bad_ref.reference_image_uri = Some("https://example.com/ref.png".into());
        let mut with_good_ref = job("scene2");
        with_good_ref.reference_image_uri = Some("gs://assets/ref.png".into());

        let _ = engine
            .render_all(
                vec![with_bad_ref, with_good_ref],
                &session,
                &CancellationToken::new(),
            )
            .await;

        let submits = service.submitted();
        let scene1 = submits.iter().find(|r| r.scene_id == "scene1").unwrap();
        let scene2 = submits.iter().find(|r| r.scene_id == "scene2").unwrap();
        assert_eq!(scene1.reference_image_uri, None);
        assert_eq!(
            scene2.reference_image_uri.as_deref(),
            Some("gs://assets/ref.png")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn output_location_is_namespaced_by_acting_user() {
        let service = StubService::new([(
            "scene1",
            Script::Succeed {
                pending_polls: 0,
                uri: "gs://out/s1.mp4".into(),
            },
        )]);
        let engine = engine(Arc::clone(&service));
        let session = session();
        assert!(session.set_acting_user_once("user-7"));

        let _ = engine
            .render_all(vec![job("scene1")], &session, &CancellationToken::new())
            .await;

        let submits = service.submitted();
        assert!(submits[0].output_uri.ends_with("/user-7/scene1"));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_cadence_is_the_configured_interval() {
        let service = StubService::new([(
            "scene1",
            Script::Succeed {
                pending_polls: 2,
                uri: "gs://out/s1.mp4".into(),
            },
        )]);
        let engine = engine(service);
        let session = session();

        let start = tokio::time::Instant::now();
        let outcome = engine
            .render_all(vec![job("scene1")], &session, &CancellationToken::new())
            .await;

        assert_eq!(outcome.success_count, 1);
        // two pending polls → two 15 s sleeps before the terminal poll
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn max_polls_caps_the_wait() {
        let service = StubService::new([("scene1", Script::NeverDone)]);
        let config = RenderConfig {
            max_polls: Some(3),
            ..RenderConfig::default()
        };
        let engine = engine_with(service, config);
        let session = session();

        let outcome = engine
            .render_all(vec![job("scene1")], &session, &CancellationToken::new())
            .await;

        assert_eq!(outcome.status, RenderStatus::Failure);
        assert!(outcome.per_scene_errors[0].1.contains("giving up"));
    }

    #[tokio::test(start_paused = true)]
    async fn pre_cancelled_token_appends_nothing() {
        let service = StubService::new([
            ("scene1", Script::NeverDone),
            ("scene2", Script::NeverDone),
        ]);
        let engine = engine(service);
        let session = session();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = engine
            .render_all(vec![job("scene1"), job("scene2")], &session, &cancel)
            .await;

        assert_eq!(outcome.status, RenderStatus::Failure);
        assert_eq!(outcome.success_count, 0);
        assert!(outcome.per_scene_errors.is_empty());
        assert!(outcome.movie_urls.is_empty());
        assert!(outcome.message.contains("2 cancelled"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_keeps_completed_scenes() {
        let service = StubService::new([
            (
                "scene1",
                Script::Succeed {
                    pending_polls: 0,
                    uri: "gs://out/s1.mp4".into(),
                },
            ),
            ("scene2", Script::NeverDone),
        ]);
        let engine = engine(service);
        let session = session();
        let cancel = CancellationToken::new();

        let run = {
            let engine = Arc::clone(&engine);
            let session = session.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                engine
                    .render_all(vec![job("scene1"), job("scene2")], &session, &cancel)
                    .await
            })
        };

        // Let scene1 run to completion and scene2 park in its poll sleep,
        // then cancel the turn.
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        cancel.cancel();
        let outcome = run.await.unwrap();

        assert_eq!(outcome.status, RenderStatus::Success);
        assert_eq!(outcome.success_count, 1);
        assert!(outcome.per_scene_errors.is_empty());
        assert_eq!(outcome.movie_urls["scene1"].len(), 1);
        assert!(!outcome.movie_urls.contains_key("scene2"));
    }

    #[tokio::test(start_paused = true)]
    async fn no_jobs_is_an_empty_failure() {
        let service = StubService::new([]);
        let engine = engine(service);
        let session = session();
        let outcome = engine
            .render_all(Vec::new(), &session, &CancellationToken::new())
            .await;
        assert_eq!(outcome.status, RenderStatus::Failure);
        assert_eq!(outcome.total_count, 0);
    }
}
