//! Pipeline events and the run handle that streams them.

use crate::pipeline::{PipelineError, PipelineResult};
use futures::Stream;
use lexiforge_core::{LanguageDefinition, RunId};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What one completed step produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSummary {
    /// 1-based step number
    pub step: u32,
    /// Step name, e.g. `lexicon-2`
    pub name: String,
    /// Operation kind
    pub operation: String,
    /// Attempt that succeeded; 0 on a cache hit
    pub attempt: u32,
    /// Served from cache
    pub from_cache: bool,
    /// Wall-clock time in milliseconds
    pub duration_ms: u64,
    /// Warnings left by the validation slice
    pub warnings: usize,
    /// Human description of the output
    pub detail: String,
}

/// Progress notifications of one pipeline run.
///
/// A run emits zero or more `Progress`/`OperationComplete` pairs followed
/// by exactly one terminal `Complete` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PipelineEvent {
    /// A step is starting
    Progress {
        /// 1-based step number
        step: u32,
        /// Steps the run expects to take. Revised as the run goes: lexicon
        /// batches can finish early or overrun the plan, and the corpus
        /// step is dropped for a small lexicon. Exact once the lexicon
        /// batches are done, so the last `Progress` has `step == total`.
        total: u32,
        /// Step name
        name: String,
    },
    /// A step finished and its output was merged.
    ///
    /// Carries a [`StepSummary`] only. The language itself arrives once, in
    /// `Complete`, and as [`PipelineResult::state`].
    OperationComplete {
        /// What the step produced
        summary: StepSummary,
    },
    /// The run finished
    Complete {
        /// Final language
        state: Box<LanguageDefinition>,
        /// Wall-clock time in milliseconds
        duration_ms: u64,
    },
    /// The run stopped
    Error {
        /// Name of the failing step
        step: String,
        /// Human-readable reason
        message: String,
    },
}

impl PipelineEvent {
    /// True for `Complete` and `Error`
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }
}

/// Handle to a spawned pipeline run.
///
/// Streams the run's events and ends when the run does. The stream is not
/// restartable; [`PipelineRun::finish`] yields the final result.
pub struct PipelineRun {
    pub(crate) run_id: RunId,
    pub(crate) events: UnboundedReceiver<PipelineEvent>,
    pub(crate) handle: JoinHandle<Result<PipelineResult, PipelineError>>,
    pub(crate) cancel: CancellationToken,
}

impl PipelineRun {
    /// Id of this run
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Ask the run to stop before its next step
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the run and return its result
    ///
    /// # Errors
    ///
    /// Returns the run's [`PipelineError`], or [`PipelineError::Aborted`]
    /// if the task died
    pub async fn finish(self) -> Result<PipelineResult, PipelineError> {
        match self.handle.await {
            Ok(result) => result,
            Err(err) => Err(PipelineError::Aborted {
                reason: err.to_string(),
            }),
        }
    }
}

impl Stream for PipelineRun {
    type Item = PipelineEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().events.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = PipelineEvent::Progress {
            step: 1,
            total: 5,
            name: "inventory".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["total"], 5);

        let done = PipelineEvent::Complete {
            state: Box::default(),
            duration_ms: 12,
        };
        let json = serde_json::to_value(&done).unwrap();
        assert_eq!(json["type"], "complete");
        assert_eq!(json["durationMs"], 12);
        assert!(done.is_terminal());
        assert!(!event.is_terminal());
    }

    #[test]
    fn test_summary_round_trips() {
        let event = PipelineEvent::OperationComplete {
            summary: StepSummary {
                step: 2,
                name: "paradigms".into(),
                operation: "paradigms".into(),
                attempt: 1,
                from_cache: false,
                duration_ms: 40,
                warnings: 0,
                detail: "1 paradigm(s)".into(),
            },
        };
        let text = serde_json::to_string(&event).unwrap();
        assert!(text.contains("\"type\":\"operationComplete\""));
        assert!(text.contains("\"fromCache\":false"));
        assert_eq!(serde_json::from_str::<PipelineEvent>(&text).unwrap(), event);

        let json = serde_json::to_value(&event).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["summary", "type"]);
        assert!(json["summary"].get("state").is_none());
    }
}
