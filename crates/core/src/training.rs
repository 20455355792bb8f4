//! Local model training for a single hospital.
//!
//! Fits an L2-regularised logistic regression classifier on a [`Dataset`].
//! Binary problems produce one coefficient row (scoring the second class in
//! canonical order); problems with `k > 2` classes produce `k` rows and use
//! a softmax. This is the weight layout the dashboard and the central
//! aggregator expect.
//!
//! Training is CPU-bound and synchronous. Callers run it on a blocking
//! thread and may cancel it cooperatively through a [`CancellationToken`],
//! which is checked once per iteration.

use tokio_util::sync::CancellationToken;

use crate::dataset::Dataset;

/// Probabilities are clipped to `[EPS, 1 - EPS]` before taking logs.
const LOG_LOSS_EPS: f64 = 1e-15;

/// Hyper-parameters for [`train_logistic_regression`].
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Upper bound on gradient-descent iterations.
    pub max_iter: usize,
    /// Inverse regularisation strength (larger = weaker penalty).
    pub inverse_regularization: f64,
    /// Stop once the largest absolute gradient component drops below this.
    pub tolerance: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            inverse_regularization: 1.0,
            tolerance: 1e-6,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TrainingError {
    #[error("Training was cancelled")]
    Cancelled,

    #[error("Dataset cannot be trained on: {0}")]
    InvalidDataset(String),
}

/// Result of one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    /// Class labels in canonical order.
    pub classes: Vec<String>,
    pub feature_names: Vec<String>,
    /// `1 x n_features` for binary problems, `k x n_features` otherwise.
    /// Expressed in raw (unscaled) feature units.
    pub coefficients: Vec<Vec<f64>>,
    /// One entry per coefficient row.
    pub intercept: Vec<f64>,
    /// Training-set accuracy in `0.0..=1.0`.
    pub accuracy: f64,
    /// Mean training-set log-loss.
    pub loss: f64,
    pub sample_count: usize,
    pub iterations: usize,
}

/// Fit a logistic regression model on `dataset`.
pub fn train_logistic_regression(
    dataset: &Dataset,
    config: &TrainingConfig,
    cancel: &CancellationToken,
) -> Result<TrainedModel, TrainingError> {
    let classes = dataset.classes();
    if classes.len() < 2 {
        return Err(TrainingError::InvalidDataset(
            "at least two classes are required".into(),
        ));
    }
    if dataset.is_empty() || dataset.feature_count() == 0 {
        return Err(TrainingError::InvalidDataset(
            "dataset has no samples or no features".into(),
        ));
    }

    let n = dataset.len();
    let d = dataset.feature_count();
    let rows = if classes.len() == 2 { 1 } else { classes.len() };

    let targets: Vec<usize> = dataset
        .labels
        .iter()
        .map(|label| classes.iter().position(|c| c == label).unwrap_or(0))
        .collect();

    let (means, scales) = standardization(&dataset.features, d);
    let scaled: Vec<Vec<f64>> = dataset
        .features
        .iter()
        .map(|row| {
            row.iter()
                .zip(means.iter().zip(&scales))
                .map(|(x, (m, s))| (x - m) / s)
                .collect()
        })
        .collect();

    // Step size from a Lipschitz bound on the mean loss gradient.
    let penalty = 1.0 / (config.inverse_regularization * n as f64);
    let max_sq_norm = scaled
        .iter()
        .map(|z| z.iter().map(|v| v * v).sum::<f64>() + 1.0)
        .fold(0.0_f64, f64::max);
    let step = 1.0 / (0.5 * max_sq_norm + penalty);

    let mut weights = vec![vec![0.0; d]; rows];
    let mut bias = vec![0.0; rows];
    let mut iterations = 0;

    for _ in 0..config.max_iter {
        if cancel.is_cancelled() {
            return Err(TrainingError::Cancelled);
        }
        iterations += 1;

        let mut grad_w = vec![vec![0.0; d]; rows];
        let mut grad_b = vec![0.0; rows];

        for (z, &target) in scaled.iter().zip(&targets) {
            let probs = row_probabilities(&weights, &bias, z);
            for r in 0..rows {
                let observed = if rows == 1 {
                    (target == 1) as u8 as f64
                } else {
                    (target == r) as u8 as f64
                };
                let residual = probs[r] - observed;
                for (g, v) in grad_w[r].iter_mut().zip(z) {
                    *g += residual * v;
                }
                grad_b[r] += residual;
            }
        }

        let mut max_grad = 0.0_f64;
        for r in 0..rows {
            for j in 0..d {
                let g = grad_w[r][j] / n as f64 + penalty * weights[r][j];
                weights[r][j] -= step * g;
                max_grad = max_grad.max(g.abs());
            }
            let g = grad_b[r] / n as f64;
            bias[r] -= step * g;
            max_grad = max_grad.max(g.abs());
        }

        if max_grad < config.tolerance {
            break;
        }
    }

    let (accuracy, loss) = evaluate(&weights, &bias, &scaled, &targets, rows);

    // Map weights back to raw feature units: w' = w / s, b' = b - sum(w * m / s).
    let coefficients: Vec<Vec<f64>> = weights
        .iter()
        .map(|w| w.iter().zip(&scales).map(|(wj, s)| wj / s).collect())
        .collect();
    let intercept: Vec<f64> = weights
        .iter()
        .zip(&bias)
        .map(|(w, b)| {
            b - w
                .iter()
                .zip(means.iter().zip(&scales))
                .map(|(wj, (m, s))| wj * m / s)
                .sum::<f64>()
        })
        .collect();

    Ok(TrainedModel {
        classes,
        feature_names: dataset.feature_names.clone(),
        coefficients,
        intercept,
        accuracy,
        loss,
        sample_count: n,
        iterations,
    })
}

/// Per-column mean and standard deviation. Constant columns get scale 1.
fn standardization(features: &[Vec<f64>], d: usize) -> (Vec<f64>, Vec<f64>) {
    let n = features.len() as f64;
    let mut means = vec![0.0; d];
    for row in features {
        for (m, x) in means.iter_mut().zip(row) {
            *m += x / n;
        }
    }
    let mut scales = vec![0.0; d];
    for row in features {
        for (s, (x, m)) in scales.iter_mut().zip(row.iter().zip(&means)) {
            *s += (x - m).powi(2) / n;
        }
    }
    for s in &mut scales {
        *s = s.sqrt();
        if *s < f64::EPSILON {
            *s = 1.0;
        }
    }
    (means, scales)
}

/// Linear score for every coefficient row.
fn scores(weights: &[Vec<f64>], bias: &[f64], z: &[f64]) -> Vec<f64> {
    weights
        .iter()
        .zip(bias)
        .map(|(w, b)| b + w.iter().zip(z).map(|(wj, zj)| wj * zj).sum::<f64>())
        .collect()
}

/// Probability per coefficient row: sigmoid for one row, softmax otherwise.
fn row_probabilities(weights: &[Vec<f64>], bias: &[f64], z: &[f64]) -> Vec<f64> {
    let s = scores(weights, bias, z);
    if s.len() == 1 {
        return vec![sigmoid(s[0])];
    }
    let max = s.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = s.iter().map(|v| (v - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Training-set accuracy and mean log-loss.
fn evaluate(
    weights: &[Vec<f64>],
    bias: &[f64],
    scaled: &[Vec<f64>],
    targets: &[usize],
    rows: usize,
) -> (f64, f64) {
    let mut correct = 0usize;
    let mut loss = 0.0;

    for (z, &target) in scaled.iter().zip(targets) {
        let probs = row_probabilities(weights, bias, z);
        let (predicted, p_target) = if rows == 1 {
            let p1 = probs[0];
            let predicted = usize::from(p1 > 0.5);
            let p_target = if target == 1 { p1 } else { 1.0 - p1 };
            (predicted, p_target)
        } else {
            let predicted = probs
                .iter()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |best, (i, &p)| {
                    if p > best.1 {
                        (i, p)
                    } else {
                        best
                    }
                })
                .0;
            (predicted, probs[target])
        };

        if predicted == target {
            correct += 1;
        }
        loss -= p_target.clamp(LOG_LOSS_EPS, 1.0 - LOG_LOSS_EPS).ln();
    }

    let n = scaled.len() as f64;
    (correct as f64 / n, loss / n)
}
