//! Runs a training job off the async runtime.

use std::time::Duration;

use hygieia_core::dataset::Dataset;
use hygieia_core::error::CoreError;
use hygieia_core::training::{
    train_logistic_regression, TrainedModel, TrainingConfig, TrainingError,
};

use super::locks::TrainingGuard;

/// Fit a model on a blocking thread, giving up after `limit`.
///
/// The guard travels with the blocking task, so the hospital's slot stays
/// held until the fit has actually stopped. Dropping the returned future
/// cancels the fit. On timeout the token is cancelled and the blocking task
/// is awaited so the caller never returns while the fit is still using a
/// core.
pub async fn run_training(
    dataset: Dataset,
    guard: TrainingGuard,
    limit: Duration,
) -> Result<(TrainedModel, TrainingGuard), CoreError> {
    let cancel = guard.cancel_token();
    let on_drop = cancel.clone().drop_guard();

    let token = cancel.clone();
    let mut handle = tokio::task::spawn_blocking(move || {
        let result = train_logistic_regression(&dataset, &TrainingConfig::default(), &token);
        (guard, result)
    });

    let joined = match tokio::time::timeout(limit, &mut handle).await {
        Ok(joined) => joined,
        Err(_) => {
            cancel.cancel();
            let _ = handle.await;
            tracing::warn!(limit_secs = limit.as_secs(), "Training run timed out");
            return Err(CoreError::Timeout(format!(
                "Training did not finish within {} seconds",
                limit.as_secs()
            )));
        }
    };
    on_drop.disarm();

    match joined {
        Ok((guard, Ok(model))) => Ok((model, guard)),
        Ok((_, Err(TrainingError::Cancelled))) => {
            Err(CoreError::Conflict("Training was aborted".into()))
        }
        Ok((_, Err(TrainingError::InvalidDataset(msg)))) => Err(CoreError::Validation(msg)),
        Err(e) => Err(CoreError::Internal(format!("Training task failed: {e}"))),
    }
}
