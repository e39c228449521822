//! Inference engine - ONNX Runtime integration

use ndarray::Array2;
use ort::session::Session;
use ort::value::Value;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::logic::features::UrlFeatures;

/// Opaque probability-of-phishing scoring function plus the ordered feature
/// schema and optional scaler it was trained with.
pub trait Classifier: Send + Sync {
    /// Ordered feature names the model input vector must follow.
    fn feature_columns(&self) -> &[String];

    /// Fitted scaler, when the artifact ships one.
    fn scaler(&self) -> Option<&StandardScaler>;

    /// Probability of phishing for an already-assembled (and scaled) vector.
    fn predict_probability(&self, vector: &[f32]) -> Result<f32>;
}

/// Fitted standard-scaler parameters loaded from the artifact sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
}

impl StandardScaler {
    pub fn transform_in_place(&self, vector: &mut [f32]) {
        for (i, v) in vector.iter_mut().enumerate() {
            let mean = self.mean.get(i).copied().unwrap_or(0.0);
            let scale = self.scale.get(i).copied().unwrap_or(1.0);
            // Degenerate columns keep their centered value
            let scale = if scale.abs() < 1e-8 { 1.0 } else { scale };
            *v = (*v - mean) / scale;
        }
    }
}

/// Loaded ONNX classifier artifact. Immutable after load; the session lock
/// only serializes access to the runtime's mutable run state.
#[derive(Debug)]
pub struct OnnxModel {
    session: Mutex<Session>,
    columns: Vec<String>,
    scaler: Option<StandardScaler>,
    version: u32,
}

impl OnnxModel {
    pub(crate) fn new(
        session: Session,
        columns: Vec<String>,
        scaler: Option<StandardScaler>,
        version: u32,
    ) -> Self {
        Self {
            session: Mutex::new(session),
            columns,
            scaler,
            version,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

impl Classifier for OnnxModel {
    fn feature_columns(&self) -> &[String] {
        &self.columns
    }

    fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    fn predict_probability(&self, vector: &[f32]) -> Result<f32> {
        let mut session = self.session.lock();

        // The positive-class probability sits in the final column of the
        // final output (sklearn-style converters emit label + probabilities).
        let output_name = session
            .outputs
            .last()
            .map(|o| o.name.clone())
            .ok_or_else(|| Error::Inference("model has no outputs".to_string()))?;

        let input_array = Array2::<f32>::from_shape_vec((1, vector.len()), vector.to_vec())
            .map_err(|e| Error::Inference(format!("input shape: {e}")))?;
        let input_tensor = Value::from_array(input_array)
            .map_err(|e| Error::Inference(format!("input tensor: {e}")))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| Error::Inference(format!("inference failed: {e}")))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| Error::Inference("missing model output".to_string()))?;
        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Inference(format!("output extract: {e}")))?;

        let data = output_tensor.1;
        data.last()
            .copied()
            .ok_or_else(|| Error::Inference("empty model output".to_string()))
    }
}

/// Assemble the model input vector in artifact column order and score it.
///
/// Features missing from the record default to 0; NaN/±infinity are
/// sanitized to 0; the resulting probability is clamped to [0, 1].
pub fn score(classifier: &dyn Classifier, features: &UrlFeatures) -> Result<f32> {
    let columns = classifier.feature_columns();

    let mut vector = Vec::with_capacity(columns.len());
    for name in columns {
        let value = features.get_by_name(name).unwrap_or(0.0);
        vector.push(if value.is_finite() { value } else { 0.0 });
    }

    if let Some(scaler) = classifier.scaler() {
        scaler.transform_in_place(&mut vector);
    }

    let probability = classifier.predict_probability(&vector)?;
    Ok(probability.clamp(0.0, 1.0))
}
