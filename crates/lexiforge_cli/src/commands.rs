//! Subcommand implementations. Each writes its report to `out`.

use crate::config::ForgeConfig;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use futures::StreamExt;
use lexiforge_cache::MemoryCache;
use lexiforge_core::LanguageDefinition;
use lexiforge_phonology::WordAnalyzer;
use lexiforge_runtime::operations::{ExplainOperation, ExplainRequest, state_digest};
use lexiforge_runtime::{
    GatedExecutor, ModelClient, Orchestrator, PipelineError, PipelineEvent, PipelineRequest,
    RetryingClient, ScriptedClient,
};
use lexiforge_validate::RuleValidator;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Print a validation report. Returns whether the definition is valid.
pub fn validate(
    def: &LanguageDefinition,
    config: &ForgeConfig,
    json: bool,
    out: &mut impl Write,
) -> Result<bool> {
    let result = RuleValidator::with_config(config.validator.clone()).validate(def);
    if json {
        serde_json::to_writer_pretty(&mut *out, &result)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}: {}", def.name, result.summary())?;
        for issue in &result.issues {
            writeln!(out, "  {issue}")?;
        }
    }
    Ok(result.valid)
}

/// Tokenize, syllabify, and template-match each form
pub fn analyze(def: &LanguageDefinition, forms: &[String], out: &mut impl Write) -> Result<()> {
    let analyzer = WordAnalyzer::new(&def.phonology);
    for err in analyzer.template_errors() {
        writeln!(out, "warning: {err}")?;
    }
    for form in forms {
        let analysis = match analyzer.analyze(form) {
            Ok(analysis) => analysis,
            Err(err) => {
                writeln!(out, "{form}: {err}")?;
                continue;
            }
        };
        let tokens: Vec<&str> = analysis.tokens.iter().map(|t| t.symbol.as_str()).collect();
        let matches: Vec<String> = analysis
            .syllables
            .iter()
            .map(|s| match &s.template {
                Some(template) => format!("{}={template}", s.skeleton),
                None => format!("{}=?", s.skeleton),
            })
            .collect();
        writeln!(
            out,
            "{form}: tokens [{}] syllables {} templates [{}] {}",
            tokens.join(" "),
            analysis.syllabified(),
            matches.join(" "),
            if analysis.is_valid() { "ok" } else { "VIOLATION" }
        )?;
    }
    Ok(())
}

fn scripted_executor(responses: &Path, config: &ForgeConfig) -> Result<GatedExecutor> {
    let text = std::fs::read_to_string(responses)
        .wrap_err_with(|| format!("reading responses {}", responses.display()))?;
    let script = ScriptedClient::from_json(&text)
        .wrap_err_with(|| format!("responses {} must be a JSON array of strings", responses.display()))?;
    let client: Arc<dyn ModelClient> = Arc::new(RetryingClient::new(
        Arc::new(script),
        config.retry.clone(),
    ));
    let cache = Arc::new(MemoryCache::with_config(config.cache.clone()));
    Ok(GatedExecutor::new(client, cache)
        .with_config(config.executor.clone())
        .with_validator(RuleValidator::with_config(config.validator.clone())))
}

fn write_definition(path: &Path, def: &LanguageDefinition) -> Result<()> {
    let json = def.to_json_pretty()?;
    std::fs::write(path, json).wrap_err_with(|| format!("writing {}", path.display()))
}

/// Run the pipeline against recorded responses, printing one JSON event
/// per line. The final (or partial) language is written to `output`.
pub async fn generate(
    request: PipelineRequest,
    responses: &Path,
    output: Option<&Path>,
    config: &ForgeConfig,
    out: &mut impl Write,
) -> Result<()> {
    let executor = scripted_executor(responses, config)?;
    let mut run = Orchestrator::new(executor, config.pipeline.clone()).start(request);
    tracing::info!(run_id = %run.run_id(), "generation started");

    while let Some(event) = run.next().await {
        let line = match &event {
            // the full state goes to `output`, not the event log
            PipelineEvent::Complete { state, duration_ms } => serde_json::json!({
                "type": "complete",
                "language": state.name,
                "words": state.lexicon.len(),
                "durationMs": duration_ms,
            }),
            other => serde_json::to_value(other)?,
        };
        writeln!(out, "{line}")?;
    }

    match run.finish().await {
        Ok(result) => {
            writeln!(out, "{}", result.validation.summary())?;
            if let Some(path) = output {
                write_definition(path, &result.state)?;
            }
            Ok(())
        }
        Err(err) => {
            if let (Some(path), Some(partial)) = (output, err.partial_state()) {
                write_definition(path, partial)?;
                tracing::info!(path = %path.display(), "partial language saved");
            }
            match err {
                PipelineError::Step { step, source, .. } => {
                    Err(eyre!(source).wrap_err(format!("step {step} failed")))
                }
                other => Err(eyre!(other)),
            }
        }
    }
}

/// Ask for an explanation of one feature, served from recorded responses
pub async fn explain(
    def: &LanguageDefinition,
    topic: &str,
    responses: &Path,
    config: &ForgeConfig,
    out: &mut impl Write,
) -> Result<()> {
    let executor = scripted_executor(responses, config)?;
    let request = ExplainRequest {
        topic: topic.to_string(),
        basis: state_digest(def),
    };
    let result = executor.execute(&ExplainOperation, &request, def).await?;
    writeln!(out, "{}", result.data.summary)?;
    for example in &result.data.examples {
        writeln!(out, "  {} {} ({}) '{}'", example.lemma, example.ipa, example.pos, example.gloss)?;
    }
    Ok(())
}
