//! RenderController: keeps the mount point in step with the latest
//! diagram description.
//!
//! Every non-blank change starts an independent attempt on the runtime. An
//! attempt cannot be interrupted once the engine has it, so a superseded
//! attempt runs to completion and is dropped at commit time. The latest
//! request and the mount point are updated under one lock, which makes
//! "is this still the latest request?" and "replace the content" a single
//! step.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::engine::VectorRenderEngine;
use crate::mount::{ErrorPanel, MountContent, MountPoint};

use super::attempt::{AttemptId, CommitStatus, RenderOutcome};

/// The most recently requested description and its attempt.
#[derive(Debug)]
struct LatestRequest {
    id: AttemptId,
    description: String,
    settled: bool,
}

/// Handle to a spawned render attempt.
///
/// Dropping it does not cancel the attempt.
#[derive(Debug)]
pub struct RenderTask {
    id: AttemptId,
    handle: JoinHandle<CommitStatus>,
}

impl RenderTask {
    pub fn id(&self) -> AttemptId {
        self.id
    }

    /// Wait for the attempt to finish and report what became of its outcome.
    pub async fn wait(self) -> CommitStatus {
        match self.handle.await {
            Ok(status) => status,
            Err(e) => {
                log::error!("Render attempt {} did not complete: {e}", self.id);
                CommitStatus::Aborted
            }
        }
    }
}

/// Owns the render lifecycle for one mount point.
pub struct RenderController<E: VectorRenderEngine> {
    engine: Arc<E>,
    mount: MountPoint,
    runtime: Handle,
    latest: Arc<Mutex<Option<LatestRequest>>>,
}

impl<E: VectorRenderEngine> RenderController<E> {
    pub fn new(engine: E, mount: MountPoint, runtime: Handle) -> Self {
        Self {
            engine: Arc::new(engine),
            mount,
            runtime,
            latest: Arc::new(Mutex::new(None)),
        }
    }

    pub fn mount(&self) -> &MountPoint {
        &self.mount
    }

    /// The description the mount point is converging on, if any.
    pub fn latest_description(&self) -> Option<String> {
        self.latest.lock().as_ref().map(|r| r.description.clone())
    }

    /// True while the latest attempt has not settled.
    pub fn is_pending(&self) -> bool {
        self.latest.lock().as_ref().is_some_and(|r| !r.settled)
    }

    /// React to a new description.
    ///
    /// Blank text clears the mount point and supersedes any in-flight
    /// attempt. Text equal to the latest requested description is ignored.
    /// Anything else starts a new attempt; the returned task may be awaited
    /// but does not have to be. This never fails: compile errors end up in
    /// the mount point as an error panel.
    pub fn on_description_change(&self, text: &str) -> Option<RenderTask> {
        let mut latest = self.latest.lock();

        if text.trim().is_empty() {
            if let Some(previous) = latest.take() {
                crate::debug_log!(
                    "RENDER",
                    "Blank description supersedes attempt {}",
                    previous.id
                );
            }
            self.mount.clear();
            return None;
        }

        if latest.as_ref().is_some_and(|r| r.description == text) {
            crate::debug_trace!("RENDER", "Description unchanged; no new attempt");
            return None;
        }

        let id = AttemptId::next();
        *latest = Some(LatestRequest {
            id,
            description: text.to_owned(),
            settled: false,
        });
        drop(latest);

        crate::debug_info!(
            "RENDER",
            "Attempt {} started ({} bytes of description)",
            id,
            text.len()
        );

        let engine = Arc::clone(&self.engine);
        let latest = Arc::clone(&self.latest);
        let mount = self.mount.clone();
        let description = text.to_owned();

        let handle = self.runtime.spawn(async move {
            let outcome = match engine.compile(&description).await {
                Ok(markup) => RenderOutcome::Success(markup.normalized_for_display()),
                Err(e) => {
                    log::warn!("Attempt {id} failed to compile: {e}");
                    RenderOutcome::Failure(e)
                }
            };
            commit(&latest, &mount, id, outcome)
        });

        Some(RenderTask { id, handle })
    }
}

/// Apply `outcome` to the mount point only if `id` is still the latest attempt.
fn commit(
    latest: &Mutex<Option<LatestRequest>>,
    mount: &MountPoint,
    id: AttemptId,
    outcome: RenderOutcome,
) -> CommitStatus {
    let mut latest = latest.lock();
    let current = match latest.as_mut() {
        Some(request) if request.id == id => request,
        _ => {
            crate::debug_log!("RENDER", "Attempt {} is stale; result discarded", id);
            return CommitStatus::Superseded;
        }
    };

    let content = match outcome {
        RenderOutcome::Success(markup) => MountContent::Diagram(markup),
        RenderOutcome::Failure(error) => MountContent::Error(ErrorPanel::from_error(&error)),
    };
    mount.replace(content);
    current.settled = true;

    crate::debug_info!("RENDER", "Attempt {} committed", id);
    CommitStatus::Committed
}
