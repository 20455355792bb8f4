//! Federated averaging of hospital weight snapshots.
//!
//! The central service combines the weights each hospital has sent into one
//! global model by averaging coefficients and intercepts, weighted by the
//! number of samples each hospital trained on (FedAvg).
//!
//! Contributions can only be averaged when they describe the same model:
//! identical class labels, identical feature names and therefore identical
//! weight shapes. The first contribution defines the reference layout;
//! incompatible contributions are skipped and reported back.

use crate::error::CoreError;
use crate::types::DbId;

/// Weights one hospital has sent to the central service.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub hospital_id: DbId,
    pub classes: Vec<String>,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    pub sample_count: i64,
}

/// Output of [`federated_average`].
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedModel {
    pub classes: Vec<String>,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    /// Hospitals whose weights were averaged, in input order.
    pub contributors: Vec<DbId>,
    /// Hospitals whose weights did not match the reference layout.
    pub skipped: Vec<DbId>,
    pub total_samples: i64,
}

/// Sample-weighted average of all compatible contributions.
///
/// Fails with [`CoreError::Precondition`] when `contributions` is empty.
pub fn federated_average(contributions: &[Contribution]) -> Result<AggregatedModel, CoreError> {
    let reference = contributions.first().ok_or_else(|| {
        CoreError::Precondition("No hospital has sent weights to the central service yet".into())
    })?;

    let (compatible, skipped): (Vec<&Contribution>, Vec<&Contribution>) = contributions
        .iter()
        .partition(|c| is_compatible(reference, c));

    let total_samples: i64 = compatible.iter().map(|c| c.sample_count.max(0)).sum();

    // Every contributor counts equally if none reported a sample count.
    let weight_of = |c: &Contribution| -> f64 {
        if total_samples > 0 {
            c.sample_count.max(0) as f64 / total_samples as f64
        } else {
            1.0 / compatible.len() as f64
        }
    };

    let mut coefficients: Vec<Vec<f64>> = reference
        .coefficients
        .iter()
        .map(|row| vec![0.0; row.len()])
        .collect();
    let mut intercept = vec![0.0; reference.intercept.len()];

    for c in &compatible {
        let w = weight_of(c);
        for (acc_row, row) in coefficients.iter_mut().zip(&c.coefficients) {
            for (acc, v) in acc_row.iter_mut().zip(row) {
                *acc += w * v;
            }
        }
        for (acc, v) in intercept.iter_mut().zip(&c.intercept) {
            *acc += w * v;
        }
    }

    Ok(AggregatedModel {
        classes: reference.classes.clone(),
        feature_names: reference.feature_names.clone(),
        coefficients,
        intercept,
        contributors: compatible.iter().map(|c| c.hospital_id).collect(),
        skipped: skipped.iter().map(|c| c.hospital_id).collect(),
        total_samples,
    })
}

fn is_compatible(reference: &Contribution, other: &Contribution) -> bool {
    reference.classes == other.classes
        && reference.feature_names == other.feature_names
        && reference.intercept.len() == other.intercept.len()
        && reference.coefficients.len() == other.coefficients.len()
        && reference
            .coefficients
            .iter()
            .zip(&other.coefficients)
            .all(|(a, b)| a.len() == b.len())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn contribution(id: DbId, coef: Vec<f64>, intercept: f64, samples: i64) -> Contribution {
        Contribution {
            hospital_id: id,
            classes: vec!["0".into(), "1".into()],
            feature_names: vec!["a".into(), "b".into()],
            coefficients: vec![coef],
            intercept: vec![intercept],
            sample_count: samples,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn empty_input_is_a_precondition_failure() {
        assert_matches!(federated_average(&[]), Err(CoreError::Precondition(_)));
    }

    #[test]
    fn single_contribution_is_returned_unchanged() {
        let c = contribution(1, vec![0.5, -1.5], 2.0, 30);
        let model = federated_average(&[c.clone()]).unwrap();
        assert_eq!(model.coefficients, c.coefficients);
        assert_eq!(model.intercept, c.intercept);
        assert_eq!(model.contributors, vec![1]);
        assert!(model.skipped.is_empty());
        assert_eq!(model.total_samples, 30);
    }

    #[test]
    fn average_is_weighted_by_sample_count() {
        let a = contribution(1, vec![1.0, 0.0], 0.0, 10);
        let b = contribution(2, vec![4.0, 3.0], 3.0, 30);
        let model = federated_average(&[a, b]).unwrap();

        assert!(approx(model.coefficients[0][0], 0.25 * 1.0 + 0.75 * 4.0));
        assert!(approx(model.coefficients[0][1], 0.75 * 3.0));
        assert!(approx(model.intercept[0], 0.75 * 3.0));
        assert_eq!(model.total_samples, 40);
    }

    #[test]
    fn zero_sample_counts_fall_back_to_equal_weights() {
        let a = contribution(1, vec![2.0, 2.0], 1.0, 0);
        let b = contribution(2, vec![4.0, 0.0], 3.0, 0);
        let model = federated_average(&[a, b]).unwrap();
        assert!(approx(model.coefficients[0][0], 3.0));
        assert!(approx(model.coefficients[0][1], 1.0));
        assert!(approx(model.intercept[0], 2.0));
    }

    #[test]
    fn incompatible_contributions_are_skipped() {
        let a = contribution(1, vec![1.0, 1.0], 1.0, 10);
        let mut b = contribution(2, vec![9.0, 9.0], 9.0, 10);
        b.feature_names = vec!["x".into(), "y".into()];
        let mut c = contribution(3, vec![3.0, 3.0], 3.0, 10);
        c.coefficients = vec![vec![3.0, 3.0, 3.0]];

        let model = federated_average(&[a.clone(), b, c]).unwrap();
        assert_eq!(model.contributors, vec![1]);
        assert_eq!(model.skipped, vec![2, 3]);
        assert_eq!(model.coefficients, a.coefficients);
    }
}
