//! Stage invocation: timeout, logging and failure tagging.

use std::future::Future;
use std::time::{Duration, Instant};

use clipsmith_common::error::{ClipsmithError, ClipsmithResult};
use clipsmith_edit_model::stage::{Stage, StageFailure, StageResult};

/// Await one stage call, bounded by `timeout` when set.
///
/// The collaborator's error is converted into a [`StageFailure`] tagged with
/// `stage`; expiry of the timeout counts as a failure of that stage.
pub async fn invoke<T, F>(
    stage: Stage,
    timeout: Option<Duration>,
    input: &str,
    call: F,
) -> StageResult<T>
where
    F: Future<Output = ClipsmithResult<T>>,
{
    tracing::info!(input, stage = %stage, "Stage started");
    let started = Instant::now();

    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(ClipsmithError::Timeout {
                secs: limit.as_secs_f64(),
            }),
        },
        None => call.await,
    };

    let elapsed_secs = started.elapsed().as_secs_f64();
    match result {
        Ok(value) => {
            tracing::info!(input, stage = %stage, elapsed_secs, "Stage finished");
            Ok(value)
        }
        Err(error) => {
            let failure = StageFailure::from_error(stage, &error);
            tracing::error!(
                input,
                stage = %stage,
                kind = %failure.kind,
                cause = %failure.cause,
                elapsed_secs,
                "Stage failed"
            );
            Err(failure)
        }
    }
}
