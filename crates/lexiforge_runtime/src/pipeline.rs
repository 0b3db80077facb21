//! Pipeline orchestrator.
//!
//! Runs the gated operations in a fixed order: inventory, paradigms,
//! lexicon batches, corpus (gated on lexicon size), consistency review.
//! Each request is derived from the accumulated state, and the
//! orchestrator is the only code that mutates that state. Model-calling
//! steps are spaced by a fixed delay, cache hits included. The full
//! validator runs once at the end.

use crate::events::{PipelineEvent, PipelineRun, StepSummary};
use crate::executor::{GatedExecutor, OperationError};
use crate::operation::GatedOperation;
use crate::operations::{
    ConsistencyOperation, ConsistencyRequest, CorpusOperation, CorpusRequest, InventoryOperation,
    InventoryRequest, LexiconOperation, LexiconRequest, ParadigmsOperation, ParadigmsRequest,
    SlotRequest, state_digest,
};
use lexiforge_core::{CoverageReport, DEFAULT_FIELDS, LanguageDefinition, RunId, ValidationResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Semantic fields offered per lexicon batch once required slots run out
const FIELDS_PER_BATCH: usize = 3;

/// What to generate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRequest {
    /// Language name
    pub name: String,
    /// Free-form design brief
    #[serde(default)]
    pub description: String,
}

impl PipelineRequest {
    /// Create a request
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Lexicon size the batches aim for
    pub target_vocabulary: usize,
    /// Entries requested per batch
    pub lexicon_batch_size: usize,
    /// Ceiling on lexicon batches
    pub max_lexicon_batches: u32,
    /// Lexicon size required before the corpus step runs
    pub corpus_min_lexicon: usize,
    /// Sentences requested by the corpus step
    pub corpus_size: usize,
    /// Pause between model-calling steps, in milliseconds
    pub step_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_vocabulary: 150,
            lexicon_batch_size: 30,
            max_lexicon_batches: 8,
            corpus_min_lexicon: 50,
            corpus_size: 12,
            step_delay_ms: 1_000,
        }
    }
}

impl PipelineConfig {
    /// Set the target vocabulary
    #[must_use]
    pub fn with_target_vocabulary(mut self, n: usize) -> Self {
        self.target_vocabulary = n;
        self
    }

    /// Set the lexicon batch size (at least 1)
    #[must_use]
    pub fn with_lexicon_batch_size(mut self, n: usize) -> Self {
        self.lexicon_batch_size = n.max(1);
        self
    }

    /// Set the batch ceiling
    #[must_use]
    pub fn with_max_lexicon_batches(mut self, n: u32) -> Self {
        self.max_lexicon_batches = n;
        self
    }

    /// Set the step delay
    #[must_use]
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Step delay as a duration
    #[must_use]
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Lexicon batches the plan allows for
    #[must_use]
    pub fn planned_batches(&self) -> u32 {
        let size = self.lexicon_batch_size.max(1);
        let needed = self.target_vocabulary.div_ceil(size);
        u32::try_from(needed).unwrap_or(u32::MAX).min(self.max_lexicon_batches)
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    /// Run id
    pub run_id: RunId,
    /// Final language
    pub state: LanguageDefinition,
    /// Full four-pass validation of the final language
    pub validation: ValidationResult,
    /// Names of the steps that ran, in order
    pub steps_completed: Vec<String>,
    /// Wall-clock time
    pub duration: Duration,
}

/// Why a run stopped early.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// A step exhausted its attempts or its model call failed
    #[error("step {step} failed: {source}")]
    Step {
        /// Failing step
        step: String,
        /// Underlying failure
        source: OperationError,
        /// State committed before the step
        partial_state: Box<LanguageDefinition>,
    },
    /// Cancelled before a step started
    #[error("cancelled before step {step}")]
    Cancelled {
        /// Step that did not start
        step: String,
        /// State committed so far
        partial_state: Box<LanguageDefinition>,
    },
    /// The run's task died
    #[error("pipeline task aborted: {reason}")]
    Aborted {
        /// Join error
        reason: String,
    },
}

impl PipelineError {
    /// State committed before the run stopped, if known
    #[must_use]
    pub fn partial_state(&self) -> Option<&LanguageDefinition> {
        match self {
            Self::Step { partial_state, .. } | Self::Cancelled { partial_state, .. } => {
                Some(partial_state)
            }
            Self::Aborted { .. } => None,
        }
    }
}

/// Derive the next lexicon batch from the current state, or `None` once
/// the target vocabulary is reached.
///
/// Unfilled required slots come first, in their fixed order; the rest of
/// the batch rotates through the default semantic fields.
#[must_use]
pub fn plan_lexicon_batch(
    state: &LanguageDefinition,
    batch: u32,
    config: &PipelineConfig,
) -> Option<LexiconRequest> {
    let have = state.lexicon.len();
    if have >= config.target_vocabulary {
        return None;
    }
    let count = (config.target_vocabulary - have).min(config.lexicon_batch_size.max(1));
    let coverage = CoverageReport::compute(&state.lexicon);
    let slots: Vec<SlotRequest> = coverage
        .missing
        .iter()
        .take(count)
        .map(SlotRequest::from)
        .collect();
    let fields = if slots.len() < count {
        let offset = (batch.saturating_sub(1) as usize * FIELDS_PER_BATCH) % DEFAULT_FIELDS.len();
        DEFAULT_FIELDS
            .iter()
            .cycle()
            .skip(offset)
            .take(FIELDS_PER_BATCH)
            .map(|f| (*f).to_string())
            .collect()
    } else {
        Vec::new()
    };
    Some(LexiconRequest {
        batch,
        count,
        slots,
        fields,
        avoid: state.lexicon.iter().map(|e| e.lemma.clone()).collect(),
        basis: state_digest(state),
    })
}

fn slug(name: &str) -> String {
    let mut out = String::new();
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// Sequences gated operations into a full language.
#[derive(Clone)]
pub struct Orchestrator {
    executor: GatedExecutor,
    config: PipelineConfig,
}

impl Orchestrator {
    /// Create an orchestrator
    #[must_use]
    pub fn new(executor: GatedExecutor, config: PipelineConfig) -> Self {
        Self { executor, config }
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Spawn a run on the current tokio runtime and stream its events
    #[must_use]
    pub fn start(&self, request: PipelineRequest) -> PipelineRun {
        let run_id = RunId::new();
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let this = self.clone();
        let token = cancel.clone();
        let handle = tokio::spawn(async move { this.execute(run_id, &request, &token, &tx).await });
        PipelineRun {
            run_id,
            events: rx,
            handle,
            cancel,
        }
    }

    /// Run to completion, sending events to `events`
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if a step fails or the run is cancelled;
    /// the error carries the state committed before the stop
    pub async fn run(
        &self,
        request: &PipelineRequest,
        cancel: &CancellationToken,
        events: &UnboundedSender<PipelineEvent>,
    ) -> Result<PipelineResult, PipelineError> {
        self.execute(RunId::new(), request, cancel, events).await
    }

    #[tracing::instrument(skip_all, fields(run_id = %run_id, language = %request.name))]
    async fn execute(
        &self,
        run_id: RunId,
        request: &PipelineRequest,
        cancel: &CancellationToken,
        events: &UnboundedSender<PipelineEvent>,
    ) -> Result<PipelineResult, PipelineError> {
        // inventory, paradigms, planned batches, corpus, consistency
        let total = 4 + self.config.planned_batches();
        let mut run = Run {
            executor: &self.executor,
            config: &self.config,
            cancel,
            events,
            state: LanguageDefinition::new(slug(&request.name), request.name.clone()),
            steps_completed: Vec::new(),
            position: 0,
            total,
            started: Instant::now(),
        };
        tracing::info!(total, "pipeline started");

        let inventory = InventoryRequest::new(request.name.clone(), request.description.clone());
        run.step("inventory", &InventoryOperation, &inventory).await?;

        let paradigms = ParadigmsRequest {
            name: request.name.clone(),
            basis: state_digest(&run.state),
        };
        run.step("paradigms", &ParadigmsOperation, &paradigms).await?;

        for batch in 1..=self.config.max_lexicon_batches {
            let Some(lexicon) = plan_lexicon_batch(&run.state, batch, &self.config) else {
                break;
            };
            // this batch, corpus, consistency
            run.total = run.total.max(run.position + 3);
            run.step(&format!("lexicon-{batch}"), &LexiconOperation, &lexicon)
                .await?;
        }

        let with_corpus = run.state.lexicon.len() >= self.config.corpus_min_lexicon;
        run.total = run.position + u32::from(with_corpus) + 1;
        if with_corpus {
            let corpus = CorpusRequest {
                count: self.config.corpus_size,
                basis: state_digest(&run.state),
            };
            run.step("corpus", &CorpusOperation, &corpus).await?;
        } else {
            tracing::info!(
                lexicon = run.state.lexicon.len(),
                required = self.config.corpus_min_lexicon,
                "lexicon too small, skipping corpus"
            );
        }

        let findings = self.executor.validator().validate(&run.state);
        let review = ConsistencyRequest {
            issues: findings.issues.iter().map(|i| i.feedback_line()).collect(),
            basis: state_digest(&run.state),
        };
        run.step("consistency", &ConsistencyOperation, &review).await?;

        Ok(run.finish(run_id))
    }
}

struct Run<'a> {
    executor: &'a GatedExecutor,
    config: &'a PipelineConfig,
    cancel: &'a CancellationToken,
    events: &'a UnboundedSender<PipelineEvent>,
    state: LanguageDefinition,
    steps_completed: Vec<String>,
    position: u32,
    total: u32,
    started: Instant,
}

impl Run<'_> {
    fn emit(&self, event: PipelineEvent) {
        // a dropped receiver only means nobody is listening
        let _ = self.events.send(event);
    }

    async fn pace(&self) {
        if self.position == 0 {
            return;
        }
        tokio::select! {
            () = self.cancel.cancelled() => {}
            () = tokio::time::sleep(self.config.step_delay()) => {}
        }
    }

    async fn step<O: GatedOperation>(
        &mut self,
        name: &str,
        op: &O,
        request: &O::Request,
    ) -> Result<(), PipelineError> {
        self.pace().await;
        if self.cancel.is_cancelled() {
            tracing::info!(step = name, "pipeline cancelled");
            self.emit(PipelineEvent::Error {
                step: name.to_string(),
                message: "cancelled".to_string(),
            });
            return Err(PipelineError::Cancelled {
                step: name.to_string(),
                partial_state: Box::new(self.state.clone()),
            });
        }

        self.position += 1;
        self.emit(PipelineEvent::Progress {
            step: self.position,
            total: self.total,
            name: name.to_string(),
        });

        let result = match self.executor.execute(op, request, &self.state).await {
            Ok(result) => result,
            Err(source) => {
                tracing::warn!(step = name, error = %source, "step failed");
                self.emit(PipelineEvent::Error {
                    step: name.to_string(),
                    message: source.to_string(),
                });
                return Err(PipelineError::Step {
                    step: name.to_string(),
                    source,
                    partial_state: Box::new(self.state.clone()),
                });
            }
        };

        let summary = StepSummary {
            step: self.position,
            name: name.to_string(),
            operation: result.operation.clone(),
            attempt: result.attempt,
            from_cache: result.from_cache,
            duration_ms: result.duration.as_millis() as u64,
            warnings: result.validation.warnings().count(),
            detail: op.describe(&result.data),
        };
        op.merge(&mut self.state, result.data);
        tracing::info!(
            step = name,
            attempt = summary.attempt,
            from_cache = summary.from_cache,
            detail = %summary.detail,
            "step complete"
        );
        self.steps_completed.push(name.to_string());
        self.emit(PipelineEvent::OperationComplete { summary });
        Ok(())
    }

    fn finish(self, run_id: RunId) -> PipelineResult {
        let validation = self.executor.validator().validate(&self.state);
        let duration = self.started.elapsed();
        tracing::info!(
            duration_ms = duration.as_millis() as u64,
            summary = %validation.summary(),
            "pipeline complete"
        );
        self.emit(PipelineEvent::Complete {
            state: Box::new(self.state.clone()),
            duration_ms: duration.as_millis() as u64,
        });
        PipelineResult {
            run_id,
            state: self.state,
            validation,
            steps_completed: self.steps_completed,
            duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ScriptedClient;
    use crate::testing;
    use futures::StreamExt;
    use lexiforge_cache::MemoryCache;
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn config(target: usize) -> PipelineConfig {
        PipelineConfig::default()
            .with_target_vocabulary(target)
            .with_lexicon_batch_size(target)
            .with_max_lexicon_batches(1)
    }

    fn script(lexicon: usize) -> Vec<String> {
        vec![
            testing::phonology_json(),
            testing::paradigms_json(),
            testing::lexicon_json(0, lexicon),
            testing::corpus_json(),
            "{}".to_string(),
        ]
    }

    fn orchestrator(
        client: &Arc<ScriptedClient>,
        cache: &Arc<MemoryCache>,
        config: PipelineConfig,
    ) -> Orchestrator {
        Orchestrator::new(GatedExecutor::new(client.clone(), cache.clone()), config)
    }

    fn drain(rx: &mut UnboundedReceiver<PipelineEvent>) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn progress_of(events: &[PipelineEvent]) -> Vec<(u32, u32)> {
        events
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::Progress { step, total, .. } => Some((*step, *total)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_config_defaults_and_plan() {
        let config = PipelineConfig::default();
        assert_eq!(config.target_vocabulary, 150);
        assert_eq!(config.planned_batches(), 5);
        assert_eq!(config.clone().with_max_lexicon_batches(2).planned_batches(), 2);
        let partial: PipelineConfig = serde_json::from_str(r#"{"corpus_size": 3}"#).unwrap();
        assert_eq!(partial.corpus_min_lexicon, 50);
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("  Old Tala! "), "old-tala");
        assert_eq!(slug("Ŋa"), "ŋa");
    }

    #[test]
    fn test_plan_serves_required_slots_first() {
        let state = testing::base_state();
        let config = PipelineConfig::default();
        let first = plan_lexicon_batch(&state, 1, &config).unwrap();
        assert_eq!(first.count, 30);
        assert_eq!(first.slots.len(), 30);
        assert_eq!(first.slots[0].id, "pron.1sg");
        assert!(first.fields.is_empty());

        let small = config
            .clone()
            .with_target_vocabulary(200)
            .with_lexicon_batch_size(60);
        let second = plan_lexicon_batch(&state, 2, &small).unwrap();
        assert!(second.slots.len() < second.count);
        assert_eq!(second.fields.len(), FIELDS_PER_BATCH);
        assert_eq!(second.fields[0], DEFAULT_FIELDS[FIELDS_PER_BATCH]);

        let mut full = state.clone();
        full.lexicon = crate::operations::LexiconOperation
            .parse(&testing::lexicon_json(0, 150))
            .unwrap()
            .entries;
        assert!(plan_lexicon_batch(&full, 1, &config).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_run_with_corpus() {
        let client = Arc::new(ScriptedClient::new(script(50)));
        let cache = Arc::new(MemoryCache::new());
        let orch = orchestrator(&client, &cache, config(50));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = orch
            .run(&PipelineRequest::new("Tala", ""), &CancellationToken::new(), &tx)
            .await
            .unwrap();

        assert_eq!(client.calls(), 5);
        assert_eq!(
            result.steps_completed,
            vec!["inventory", "paradigms", "lexicon-1", "corpus", "consistency"]
        );
        assert_eq!(result.state.lexicon.len(), 50);
        assert_eq!(result.state.corpus.len(), 1);
        assert!(result.validation.valid, "{:#?}", result.validation.issues);

        let events = drain(&mut rx);
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        assert!(matches!(events.last(), Some(PipelineEvent::Complete { .. })));
        assert!(matches!(
            &events[0],
            PipelineEvent::Progress { step: 1, total: 5, name } if name == "inventory"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_small_lexicon_skips_corpus() {
        let mut responses = script(49);
        responses.remove(3);
        let client = Arc::new(ScriptedClient::new(responses));
        let cache = Arc::new(MemoryCache::new());
        let mut cfg = config(49);
        cfg.corpus_min_lexicon = 50;
        let orch = orchestrator(&client, &cache, cfg);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = orch
            .run(&PipelineRequest::new("Tala", ""), &CancellationToken::new(), &tx)
            .await
            .unwrap();

        assert_eq!(client.calls(), 4);
        assert!(!result.steps_completed.iter().any(|s| s == "corpus"));
        assert!(result.state.corpus.is_empty());
        assert!(result.validation.warnings().any(|i| i.rule_id == "xmod.min-vocabulary"));

        let progress = progress_of(&drain(&mut rx));
        assert_eq!(progress.first(), Some(&(1, 5)));
        assert_eq!(progress.last(), Some(&(4, 4)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_total_follows_lexicon_batches() {
        let cfg = PipelineConfig::default()
            .with_target_vocabulary(50)
            .with_lexicon_batch_size(25)
            .with_max_lexicon_batches(3);
        assert_eq!(cfg.planned_batches(), 2);

        // one oversized batch reaches the target early
        let client = Arc::new(ScriptedClient::new(script(50)));
        let (tx, mut rx) = mpsc::unbounded_channel();
        orchestrator(&client, &Arc::new(MemoryCache::new()), cfg.clone())
            .run(&PipelineRequest::new("Tala", ""), &CancellationToken::new(), &tx)
            .await
            .unwrap();
        let progress = progress_of(&drain(&mut rx));
        assert_eq!(progress.len(), 5);
        assert_eq!(progress.first(), Some(&(1, 6)));
        assert_eq!(progress.last(), Some(&(5, 5)));

        // a batch of repeats forces a third one
        let client = Arc::new(ScriptedClient::new([
            testing::phonology_json(),
            testing::paradigms_json(),
            testing::lexicon_json(0, 25),
            testing::lexicon_json(0, 25),
            testing::lexicon_json(25, 25),
            testing::corpus_json(),
            "{}".to_string(),
        ]));
        let result = orchestrator(&client, &Arc::new(MemoryCache::new()), cfg)
            .run(&PipelineRequest::new("Tala", ""), &CancellationToken::new(), &tx)
            .await
            .unwrap();
        assert_eq!(result.steps_completed.len(), 7);
        let progress = progress_of(&drain(&mut rx));
        assert!(progress.iter().all(|(step, total)| step <= total));
        assert_eq!(progress.last(), Some(&(7, 7)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_step_keeps_partial_state() {
        let client = Arc::new(ScriptedClient::new([
            testing::phonology_json(),
            "no".to_string(),
            "still no".to_string(),
            "never".to_string(),
        ]));
        let cache = Arc::new(MemoryCache::new());
        let orch = orchestrator(&client, &cache, config(50));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let err = orch
            .run(&PipelineRequest::new("Tala", ""), &CancellationToken::new(), &tx)
            .await
            .unwrap_err();

        let PipelineError::Step { step, source, partial_state } = &err else {
            panic!("expected step failure, got {err:?}");
        };
        assert_eq!(step, "paradigms");
        assert!(matches!(source, OperationError::Exhausted { attempts: 3, .. }));
        assert_eq!(partial_state.phonology.inventory.vowels.len(), 3);
        assert!(partial_state.morphology.paradigms.is_empty());

        let events = drain(&mut rx);
        let terminal: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
        assert_eq!(terminal.len(), 1);
        assert!(matches!(terminal[0], PipelineEvent::Error { step, .. } if step == "paradigms"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_first_step() {
        let client = Arc::new(ScriptedClient::new(script(50)));
        let cache = Arc::new(MemoryCache::new());
        let orch = orchestrator(&client, &cache, config(50));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = orch
            .run(&PipelineRequest::new("Tala", ""), &cancel, &tx)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled { ref step, .. } if step == "inventory"));
        assert_eq!(client.calls(), 0);
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_rerun_still_paced() {
        let cache = Arc::new(MemoryCache::new());
        let mut responses = script(49);
        responses.remove(3);
        let first = Arc::new(ScriptedClient::new(responses));
        let (tx, _rx) = mpsc::unbounded_channel();
        orchestrator(&first, &cache, config(49))
            .run(&PipelineRequest::new("Tala", ""), &CancellationToken::new(), &tx)
            .await
            .unwrap();

        let second = Arc::new(ScriptedClient::new(Vec::<String>::new()));
        let started = Instant::now();
        let result = orchestrator(&second, &cache, config(49))
            .run(&PipelineRequest::new("Tala", ""), &CancellationToken::new(), &tx)
            .await
            .unwrap();

        assert_eq!(second.calls(), 0);
        assert_eq!(result.steps_completed.len(), 4);
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_run_streams_events() {
        let client = Arc::new(ScriptedClient::new(script(50)));
        let cache = Arc::new(MemoryCache::new());
        let mut run = orchestrator(&client, &cache, config(50)).start(PipelineRequest::new("Tala", ""));
        let run_id = run.run_id();

        let mut events = Vec::new();
        while let Some(event) = run.next().await {
            events.push(event);
        }
        let result = run.finish().await.unwrap();

        assert_eq!(result.run_id, run_id);
        let progress = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::Progress { .. }))
            .count();
        assert_eq!(progress, 5);
        assert!(matches!(events.last(), Some(PipelineEvent::Complete { .. })));
    }
}
