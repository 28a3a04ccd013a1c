//! Batch orchestration: discovery, chunked scheduling and the batch report.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use clipsmith_common::config::PipelineConfig;
use clipsmith_common::error::{ClipsmithError, ClipsmithResult};
use clipsmith_edit_model::input::InputVideo;
use clipsmith_edit_model::result::{BatchReport, Outcome, ProcessingResult};
use clipsmith_edit_model::stage::StageFailure;

use crate::adapters::StageAdapters;
use crate::file_pipeline::{FilePipeline, PipelineContext};

/// Runs a whole input directory through the per-file pipeline.
#[derive(Debug)]
pub struct BatchOrchestrator {
    config: PipelineConfig,
    adapters: StageAdapters,
}

impl BatchOrchestrator {
    pub fn new(config: PipelineConfig, adapters: StageAdapters) -> Self {
        Self { config, adapters }
    }

    /// Process every eligible file and return one result per file, in
    /// discovery order.
    ///
    /// Only precondition failures (invalid configuration, missing input
    /// directory, uncreatable output directory, unreadable listing) are
    /// returned as errors; they abort the run before any file is touched.
    /// Per-file failures are recorded in the results.
    pub async fn run(&self) -> ClipsmithResult<Vec<ProcessingResult>> {
        let started_at = Utc::now();
        let started = Instant::now();

        self.check_preconditions()?;
        let inputs = discover_inputs(&self.config)?;
        tracing::info!(
            input_dir = %self.config.input_dir.display(),
            output_dir = %self.config.output_dir.display(),
            files = inputs.len(),
            batch_size = self.config.batch_size,
            "Batch started"
        );

        let context = Arc::new(PipelineContext::new(&self.config));
        let mut results = Vec::with_capacity(inputs.len());

        for (index, chunk) in inputs.chunks(self.config.batch_size).enumerate() {
            tracing::info!(chunk = index, files = chunk.len(), "Processing chunk");
            results.extend(self.run_chunk(chunk, &context).await);
        }

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        tracing::info!(
            total = results.len(),
            succeeded,
            failed = results.len() - succeeded,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Batch finished"
        );

        let report = BatchReport::new(
            started_at,
            &self.config.input_dir,
            &self.config.output_dir,
            &self.config.prompt,
            self.config.batch_size,
            results,
        );
        match report.save(&self.config.output_dir) {
            Ok(path) => tracing::info!(path = %path.display(), "Batch report written"),
            Err(e) => tracing::warn!(error = %e, "Failed to write batch report"),
        }

        Ok(report.results)
    }

    fn check_preconditions(&self) -> ClipsmithResult<()> {
        self.config.validate()?;

        if !self.config.input_dir.is_dir() {
            return Err(ClipsmithError::FileNotFound {
                path: self.config.input_dir.clone(),
            });
        }

        std::fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            tracing::error!(
                output_dir = %self.config.output_dir.display(),
                error = %e,
                "Cannot create output directory"
            );
            ClipsmithError::Io(e)
        })?;
        Ok(())
    }

    /// Run one chunk's files concurrently; results keep the chunk's order.
    async fn run_chunk(
        &self,
        chunk: &[InputVideo],
        context: &Arc<PipelineContext>,
    ) -> Vec<ProcessingResult> {
        let mut running = Vec::with_capacity(chunk.len());
        for input in chunk {
            let pipeline =
                FilePipeline::new(input.clone(), self.adapters.clone(), Arc::clone(context));
            let progress = pipeline.progress();
            running.push((
                input.clone(),
                progress,
                Instant::now(),
                tokio::spawn(pipeline.run()),
            ));
        }

        let mut results = Vec::with_capacity(running.len());
        for (input, progress, spawned, handle) in running {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    let stage = *progress.borrow();
                    tracing::error!(input = %input.name, stage = %stage, error = %e, "Pipeline task aborted");
                    ProcessingResult {
                        input,
                        outcome: Outcome::Failed {
                            failure: StageFailure::new(
                                stage,
                                stage.default_kind(),
                                format!("Pipeline task aborted: {e}"),
                            ),
                            saved_rules: None,
                        },
                        elapsed_secs: spawned.elapsed().as_secs_f64(),
                    }
                }
            };
            results.push(result);
        }
        results
    }
}

/// List eligible files in directory-listing order.
pub fn discover_inputs(config: &PipelineConfig) -> ClipsmithResult<Vec<InputVideo>> {
    let mut inputs = Vec::new();
    for entry in std::fs::read_dir(&config.input_dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        if !is_candidate(config, &path) {
            continue;
        }
        match InputVideo::from_path(&path) {
            Some(input) => inputs.push(input),
            None => tracing::warn!(path = %path.display(), "Skipping file with unusable name"),
        }
    }
    Ok(inputs)
}

fn is_candidate(config: &PipelineConfig, path: &Path) -> bool {
    path.is_file() && config.accepts(path)
}
