//! Relevance classifiers for supervised selection.
//!
//! A classifier is built, fit and dropped inside one document's processing;
//! nothing is shared between documents and nothing is persisted.

use crate::config::ClassifierConfig;
use crate::error::{Result, SummarizerError};
use crate::features::FeatureVector;
use crate::types::Label;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Convergence details from one fit. Non-convergence is reported, not raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub iterations: usize,
    pub converged: bool,
    pub support_vectors: usize,
}

pub trait RelevanceClassifier {
    fn fit(&mut self, features: &Array2<f64>, labels: &[Label]) -> Result<FitReport>;

    /// One label per row, whatever the state of the fit.
    fn predict(&self, features: &Array2<f64>) -> Vec<Label>;

    fn name(&self) -> &str;
}

/// Stack feature vectors into an (n × 7) design matrix.
pub fn design_matrix(vectors: &[FeatureVector]) -> Array2<f64> {
    let rows: Vec<[f64; FeatureVector::DIMENSIONS]> = vectors.iter().map(|v| v.to_row()).collect();
    Array2::from_shape_fn((rows.len(), FeatureVector::DIMENSIONS), |(i, j)| rows[i][j])
}

/// L2-regularized, squared-hinge linear SVM trained by dual coordinate
/// descent. The intercept is learned through a constant `bias` column and is
/// regularized along with the weights.
///
/// Rows are visited in a fixed order, so a fit is reproducible for a given
/// input; near-tied feature patterns can still leave the solution sensitive
/// to floating-point rounding.
#[derive(Debug, Clone)]
pub struct LinearSvm {
    config: ClassifierConfig,
    weights: Array1<f64>,
    intercept: f64,
}

impl LinearSvm {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            weights: Array1::zeros(FeatureVector::DIMENSIONS),
            intercept: 0.0,
        }
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Signed distance-like score per row; positive means relevant.
    pub fn decision_function(&self, features: &Array2<f64>) -> Array1<f64> {
        if features.ncols() != self.weights.len() {
            return Array1::from_elem(features.nrows(), f64::NEG_INFINITY);
        }
        features.dot(&self.weights) + self.intercept
    }
}

impl RelevanceClassifier for LinearSvm {
    fn fit(&mut self, features: &Array2<f64>, labels: &[Label]) -> Result<FitReport> {
        let (n, d) = features.dim();
        if n != labels.len() {
            return Err(SummarizerError::Classifier(format!(
                "{n} feature rows but {} labels",
                labels.len()
            )));
        }
        if n == 0 {
            return Err(SummarizerError::Classifier(
                "cannot fit on an empty document".to_string(),
            ));
        }

        let bias = self.config.bias;
        let diag = 0.5 / self.config.c;
        let y: Vec<f64> = labels.iter().map(|l| l.sign()).collect();
        let qd: Vec<f64> = features
            .rows()
            .into_iter()
            .map(|row| row.dot(&row) + bias * bias + diag)
            .collect();

        let mut alpha = vec![0.0f64; n];
        let mut w = Array1::<f64>::zeros(d);
        let mut w_bias = 0.0f64;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iterations {
            iterations += 1;
            let mut max_violation = 0.0f64;

            for i in 0..n {
                let row = features.row(i);
                let gradient = y[i] * (w.dot(&row) + w_bias * bias) - 1.0 + diag * alpha[i];
                let projected = if alpha[i] == 0.0 {
                    gradient.min(0.0)
                } else {
                    gradient
                };
                max_violation = max_violation.max(projected.abs());

                if projected.abs() > 1e-12 {
                    let previous = alpha[i];
                    alpha[i] = (previous - gradient / qd[i]).max(0.0);
                    let step = (alpha[i] - previous) * y[i];
                    w.scaled_add(step, &row);
                    w_bias += step * bias;
                }
            }

            if max_violation <= self.config.tolerance {
                converged = true;
                break;
            }
        }

        self.weights = w;
        self.intercept = w_bias * bias;

        let report = FitReport {
            iterations,
            converged,
            support_vectors: alpha.iter().filter(|a| **a > 0.0).count(),
        };
        debug!(
            rows = n,
            iterations = report.iterations,
            converged = report.converged,
            support_vectors = report.support_vectors,
            "linear SVM fit finished"
        );
        Ok(report)
    }

    fn predict(&self, features: &Array2<f64>) -> Vec<Label> {
        self.decision_function(features)
            .iter()
            .map(|score| Label::from_bool(*score > 0.0))
            .collect()
    }

    fn name(&self) -> &str {
        "LinearSvm"
    }
}
