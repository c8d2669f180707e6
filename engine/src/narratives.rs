//! Background narrative request state.

use std::time::Duration;

use futures_util::FutureExt;
use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};

use executive_providers::CompletionClient;
use executive_types::{CompletionRequest, CoreNarratives, CoreSet, ScenarioId};

#[derive(Debug, Default)]
pub(crate) enum NarrativeState {
    /// No resolution, or narratives were discarded.
    #[default]
    Idle,
    Pending(NarrativeTask),
    Ready(CoreNarratives),
}

impl NarrativeState {
    /// Spawn the request on the current runtime. `None` outside a runtime.
    pub(crate) fn spawn(client: CompletionClient, request: CompletionRequest) -> Option<Self> {
        let runtime = Handle::try_current().ok()?;
        let cores = request.cores.clone();
        let scenario = request.scenario;
        let handle = runtime.spawn(async move { client.fetch_or_placeholder(&request).await });
        tracing::debug!(scenario = scenario.value(), cores = cores.len(), "Narrative request spawned");
        Some(Self::Pending(NarrativeTask {
            handle,
            cores,
            scenario,
        }))
    }

    /// Abort a pending request. Returns whether there was one.
    pub(crate) fn abort(self) -> bool {
        match self {
            Self::Pending(task) => {
                task.handle.abort();
                true
            }
            Self::Idle | Self::Ready(_) => false,
        }
    }
}

#[derive(Debug)]
pub(crate) struct NarrativeTask {
    handle: JoinHandle<CoreNarratives>,
    cores: CoreSet,
    scenario: ScenarioId,
}

impl NarrativeTask {
    /// Take the result if the task has finished; otherwise hand the task back.
    pub(crate) fn try_complete_now(mut self, placeholder: &str) -> Result<CoreNarratives, Self> {
        if !self.handle.is_finished() {
            return Err(self);
        }
        match (&mut self.handle).now_or_never() {
            Some(result) => Ok(self.finish(result, placeholder)),
            None => Err(self),
        }
    }

    /// Wait up to `limit` for the task. `None` on timeout.
    ///
    /// Cancel-safe: the handle stays in `self`, so dropping this future
    /// leaves the task running and still owned.
    pub(crate) async fn join_within(
        &mut self,
        limit: Duration,
    ) -> Option<Result<CoreNarratives, JoinError>> {
        tokio::time::timeout(limit, &mut self.handle).await.ok()
    }

    /// Abort the task after `limit` ran out.
    pub(crate) fn expire(self, limit: Duration, placeholder: &str) -> CoreNarratives {
        self.handle.abort();
        tracing::warn!(
            scenario = self.scenario.value(),
            limit_ms = limit.as_millis(),
            "Narrative request did not finish in time"
        );
        CoreNarratives::placeholders(&self.cores, placeholder)
    }

    /// Abort the task because the player stopped waiting.
    pub(crate) fn cancel(self, placeholder: &str) -> CoreNarratives {
        self.handle.abort();
        tracing::info!(scenario = self.scenario.value(), "Narrative request cancelled");
        CoreNarratives::placeholders(&self.cores, placeholder)
    }

    pub(crate) fn finish(
        self,
        result: Result<CoreNarratives, JoinError>,
        placeholder: &str,
    ) -> CoreNarratives {
        match result {
            Ok(narratives) => narratives,
            Err(err) => {
                tracing::warn!(
                    scenario = self.scenario.value(),
                    error = %err,
                    "Narrative task failed"
                );
                CoreNarratives::placeholders(&self.cores, placeholder)
            }
        }
    }
}
