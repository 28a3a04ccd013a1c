//! Run a batch.

use std::path::PathBuf;
use std::time::Duration;

use clipsmith_common::config::{AppConfig, PipelineConfig};
use clipsmith_edit_model::result::{BatchReport, Outcome};
use clipsmith_pipeline::{BatchOrchestrator, StageAdapters};

/// Command-line overrides for a batch run.
pub struct RunArgs {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub prompt: String,
    pub batch_size: Option<usize>,
    pub stage_timeout_secs: Option<u64>,
    pub max_concurrent_rule_requests: Option<usize>,
}

pub async fn run(app_config: &AppConfig, args: RunArgs) -> anyhow::Result<()> {
    let mut config = PipelineConfig::new(
        args.input_dir,
        args.output_dir,
        args.prompt,
        &app_config.pipeline,
    );
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(secs) = args.stage_timeout_secs {
        config.stage_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(limit) = args.max_concurrent_rule_requests {
        config.max_concurrent_rule_requests = limit;
    }
    tracing::debug!(?config, "Resolved pipeline configuration");

    let adapters = StageAdapters::from_config(app_config)
        .map_err(|e| anyhow::anyhow!("Failed to set up stage adapters: {e}"))?;
    let output_dir = config.output_dir.clone();
    let orchestrator = BatchOrchestrator::new(config, adapters);

    let results = orchestrator
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Batch aborted: {e}"))?;

    for result in &results {
        match &result.outcome {
            Outcome::Success { summary, .. } => println!(
                "[OK]     {} ({} edits, {} scenes, {:.1} BPM) in {:.1}s",
                result.input.name,
                summary.operations.len(),
                summary.scene_count,
                summary.tempo_bpm,
                result.elapsed_secs
            ),
            Outcome::Failed {
                failure,
                saved_rules,
            } => {
                println!("[FAILED] {}: {failure}", result.input.name);
                if let Some(rules) = saved_rules {
                    println!("         rules kept at {}", rules.display());
                }
            }
        }
    }

    let succeeded = results.iter().filter(|r| r.is_success()).count();
    println!();
    println!(
        "Processed {} file(s): {} succeeded, {} failed",
        results.len(),
        succeeded,
        results.len() - succeeded
    );
    println!(
        "Report: {}",
        output_dir.join(BatchReport::FILE_NAME).display()
    );

    Ok(())
}
