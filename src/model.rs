//! Model handle contract and the linear classifier materialization
//!
//! The service consumes models through the single-operation [`Model`]
//! trait: a batch of fixed-width rows goes in, one scalar label per row
//! comes out. The registry artifacts this crate understands are logistic
//! regression coefficients; [`LinearModel`] turns one into an invocable
//! handle. Test doubles live in [`mock`].

use serde::{Deserialize, Serialize};

use crate::error::{PredecirError, Result};

/// An invocable, immutable model handle
///
/// Bound once at startup and shared read-only across requests; `predict`
/// takes no `&mut self` and implementations must be internally stateless.
pub trait Model: Send + Sync {
    /// Predict one scalar label per input row
    ///
    /// # Errors
    ///
    /// Returns `Inference` when a row does not match the model's expected
    /// width or the computation cannot be carried out.
    fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<f64>>;
}

/// Registry artifact for a logistic regression classifier
///
/// This is the JSON document the registry serves for a
/// `models:/{name}@{version}` reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Registered model name
    pub name: String,
    /// Version or alias label this artifact was resolved from
    pub version: String,
    /// Feature names, in model column order
    pub features: Vec<String>,
    /// One coefficient per feature
    pub coefficients: Vec<f64>,
    /// Intercept term
    pub intercept: f64,
}

/// Logistic regression handle: sigmoid over a linear score, 0.5 threshold
#[derive(Debug, Clone)]
pub struct LinearModel {
    features: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    /// Build a handle directly from coefficients (used by tests and demos)
    ///
    /// # Errors
    ///
    /// Returns `ModelLoad` when the feature and coefficient counts differ.
    pub fn new(features: Vec<String>, coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        if features.len() != coefficients.len() {
            return Err(PredecirError::model_load(format!(
                "feature count ({}) does not match coefficient count ({})",
                features.len(),
                coefficients.len()
            )));
        }
        Ok(Self {
            features,
            coefficients,
            intercept,
        })
    }

    /// Materialize a handle from a registry artifact
    ///
    /// # Errors
    ///
    /// Returns `ModelLoad` for inconsistent artifacts.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        Self::new(artifact.features, artifact.coefficients, artifact.intercept)
    }

    /// Number of input features the model expects
    #[must_use]
    pub fn num_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Feature names in model column order
    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    fn score(&self, row: &[f64]) -> f64 {
        let linear: f64 = self
            .coefficients
            .iter()
            .zip(row.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        1.0 / (1.0 + (-linear).exp())
    }
}

impl Model for LinearModel {
    fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<f64>> {
        let mut labels = Vec::with_capacity(batch.len());
        for row in batch {
            if row.len() != self.coefficients.len() {
                return Err(PredecirError::inference(format!(
                    "row has {} features, model expects {}",
                    row.len(),
                    self.coefficients.len()
                )));
            }
            labels.push(if self.score(row) >= 0.5 { 1.0 } else { 0.0 });
        }
        Ok(labels)
    }
}

/// Deterministic model doubles for tests
pub mod mock {
    use super::{Model, PredecirError, Result};

    /// Always predicts the same label for every row
    #[derive(Debug, Clone, Copy)]
    pub struct ConstModel {
        /// Label returned for every input row
        pub label: f64,
    }

    impl Model for ConstModel {
        fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<f64>> {
            Ok(vec![self.label; batch.len()])
        }
    }

    /// Always fails, simulating a broken provider runtime
    #[derive(Debug, Clone, Copy)]
    pub struct FailingModel;

    impl Model for FailingModel {
        fn predict(&self, _batch: &[Vec<f64>]) -> Result<Vec<f64>> {
            Err(PredecirError::inference("provider runtime raised"))
        }
    }

    /// Returns a fixed output sequence regardless of batch size
    ///
    /// Exists to exercise the handler's output-shape check.
    #[derive(Debug, Clone)]
    pub struct ShapedModel {
        /// Outputs returned verbatim from every predict call
        pub outputs: Vec<f64>,
    }

    impl Model for ShapedModel {
        fn predict(&self, _batch: &[Vec<f64>]) -> Result<Vec<f64>> {
            Ok(self.outputs.clone())
        }
    }
}
