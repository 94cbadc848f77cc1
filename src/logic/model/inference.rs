//! Inference Pipeline - ONNX Runtime Integration
//!
//! Image bytes → 224x224 RGB tensor in [0, 1] → forward pass → top class.

use std::sync::Arc;
use std::time::Instant;

use image::imageops::FilterType;
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;

use super::labels::LabelMap;

/// Square input resolution the classifier was trained on
pub const INPUT_SIZE: u32 = 224;

/// RGB
pub const CHANNELS: usize = 3;

/// Slack allowed on probabilities before the output is rejected
const PROBABILITY_TOLERANCE: f32 = 1e-4;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("could not decode image: {0}")]
    InvalidImage(#[from] image::ImageError),

    #[error("model runtime error: {0}")]
    Runtime(String),

    #[error("invalid model output: {0}")]
    InvalidOutput(String),

    #[error("model emitted {outputs} classes but the label map has {labels}")]
    LabelMismatch { outputs: usize, labels: usize },
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// A frozen image classifier.
///
/// `forward` takes a `(1, 224, 224, 3)` NHWC tensor scaled to `[0, 1]` and
/// returns one probability per class, in label order.
pub trait PestClassifier: Send + Sync {
    fn forward(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError>;

    /// Human readable origin of the model (usually its path)
    fn name(&self) -> &str;
}

/// ONNX Runtime backed classifier
pub struct OnnxClassifier {
    session: Mutex<Session>,
    output_name: String,
    model_path: String,
}

impl OnnxClassifier {
    pub fn load(model_path: &str) -> Result<Self, InferenceError> {
        tracing::info!("Loading ONNX model from: {}", model_path);

        if !std::path::Path::new(model_path).exists() {
            return Err(InferenceError::Runtime(format!("Model not found: {}", model_path)));
        }

        let session = Session::builder()
            .map_err(|e| InferenceError::Runtime(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Runtime(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| InferenceError::Runtime(format!("Failed to load model: {}", e)))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| InferenceError::Runtime("No output defined".to_string()))?;

        tracing::info!("ONNX model loaded successfully (output: {})", output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            model_path: model_path.to_string(),
        })
    }
}

impl PestClassifier for OnnxClassifier {
    fn forward(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let input_tensor = Value::from_array(input)
            .map_err(|e| InferenceError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Runtime(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| InferenceError::InvalidOutput("No output".to_string()))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::InvalidOutput(format!("Extract error: {}", e)))?;

        Ok(data.to_vec())
    }

    fn name(&self) -> &str {
        &self.model_path
    }
}

// ============================================================================
// PREPROCESSING
// ============================================================================

/// Decode, force RGB, resize to 224x224 and scale to `[0, 1]`.
///
/// Nearest-neighbour resampling matches the loader the model was trained with.
pub fn preprocess(bytes: &[u8]) -> Result<Array4<f32>, InferenceError> {
    let decoded = image::load_from_memory(bytes)?;
    let rgb = decoded
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Nearest)
        .to_rgb8();

    let side = INPUT_SIZE as usize;
    let scaled: Vec<f32> = rgb.into_raw().into_iter().map(|v| v as f32 / 255.0).collect();

    Array4::from_shape_vec((1, side, side, CHANNELS), scaled)
        .map_err(|e| InferenceError::Runtime(format!("Array error: {}", e)))
}

/// Arg-max over class probabilities. Ties resolve to the lowest index.
pub fn top_class(probabilities: &[f32]) -> Result<(usize, f32), InferenceError> {
    let mut best: Option<(usize, f32)> = None;

    for (index, &p) in probabilities.iter().enumerate() {
        if !p.is_finite() || p < -PROBABILITY_TOLERANCE || p > 1.0 + PROBABILITY_TOLERANCE {
            return Err(InferenceError::InvalidOutput(format!(
                "unit {} is not a probability: {}",
                index, p
            )));
        }
        if best.map_or(true, |(_, top)| p > top) {
            best = Some((index, p));
        }
    }

    best.map(|(index, p)| (index, p.clamp(0.0, 1.0)))
        .ok_or_else(|| InferenceError::InvalidOutput("empty output".to_string()))
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Prediction output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub class_index: usize,
    pub pest_name: String,
    /// Percent, 0.0 - 100.0, scaled in the model's f32 precision
    pub confidence: f64,
    pub inference_time_us: u64,
}

/// Classifier paired with the label map it was trained against
pub struct PestModel {
    classifier: Arc<dyn PestClassifier>,
    labels: LabelMap,
}

impl PestModel {
    pub fn new(classifier: Arc<dyn PestClassifier>, labels: LabelMap) -> Self {
        Self { classifier, labels }
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    pub fn name(&self) -> &str {
        self.classifier.name()
    }

    pub fn predict(&self, image_bytes: &[u8]) -> Result<Prediction, InferenceError> {
        let start_time = Instant::now();

        let input = preprocess(image_bytes)?;
        let probabilities = self.classifier.forward(input)?;

        if probabilities.len() != self.labels.len() {
            return Err(InferenceError::LabelMismatch {
                outputs: probabilities.len(),
                labels: self.labels.len(),
            });
        }

        let (class_index, probability) = top_class(&probabilities)?;
        let pest_name = self.labels.get(class_index).ok_or(InferenceError::LabelMismatch {
            outputs: probabilities.len(),
            labels: self.labels.len(),
        })?;

        let prediction = Prediction {
            class_index,
            pest_name: pest_name.to_string(),
            confidence: f64::from(probability * 100.0),
            inference_time_us: start_time.elapsed().as_micros() as u64,
        };

        tracing::debug!(
            "Predicted {} (class {}) at {:.2}% in {}us",
            prediction.pest_name,
            prediction.class_index,
            prediction.confidence,
            prediction.inference_time_us
        );

        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    /// Scores classes from the mean of each channel
    struct ChannelMeanClassifier;

    impl PestClassifier for ChannelMeanClassifier {
        fn forward(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
            let pixels = (INPUT_SIZE * INPUT_SIZE) as f32;
            let mut sums = [0.0f32; CHANNELS];
            for ((_, _, _, c), v) in input.indexed_iter() {
                sums[c] += v;
            }
            let means: Vec<f32> = sums.iter().map(|s| s / pixels).collect();
            let total: f32 = means.iter().sum::<f32>().max(f32::EPSILON);
            Ok(means.iter().map(|m| m / total).collect())
        }

        fn name(&self) -> &str {
            "channel-mean"
        }
    }

    fn png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb(color));
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    fn model() -> PestModel {
        let labels: LabelMap = ["Aphid", "Whitefly", "Thrips"].iter().map(|s| s.to_string()).collect();
        PestModel::new(Arc::new(ChannelMeanClassifier), labels)
    }

    #[test]
    fn test_preprocess_shape_and_scale() {
        let tensor = preprocess(&png(64, 32, [255, 0, 51])).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert_eq!(tensor[[0, 0, 0, 0]], 1.0);
        assert_eq!(tensor[[0, 223, 223, 1]], 0.0);
        assert!((tensor[[0, 100, 50, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_preprocess_rejects_garbage() {
        let err = preprocess(b"definitely not an image").unwrap_err();
        assert!(matches!(err, InferenceError::InvalidImage(_)));
    }

    #[test]
    fn test_top_class() {
        assert_eq!(top_class(&[0.1, 0.7, 0.2]).unwrap(), (1, 0.7));
        // Ties keep the first index
        assert_eq!(top_class(&[0.5, 0.5]).unwrap().0, 0);
    }

    #[test]
    fn test_top_class_rejects_non_probabilities() {
        assert!(matches!(top_class(&[]), Err(InferenceError::InvalidOutput(_))));
        assert!(matches!(top_class(&[0.2, f32::NAN]), Err(InferenceError::InvalidOutput(_))));
        assert!(matches!(top_class(&[3.5, 0.1]), Err(InferenceError::InvalidOutput(_))));
    }

    #[test]
    fn test_predict_is_deterministic() {
        let model = model();
        let bytes = png(224, 224, [30, 200, 40]);

        let first = model.predict(&bytes).unwrap();
        let second = model.predict(&bytes).unwrap();

        assert_eq!(first.class_index, 1);
        assert_eq!(first.pest_name, "Whitefly");
        assert_eq!(first.class_index, second.class_index);
        assert_eq!(first.confidence, second.confidence);
        assert!(first.confidence > 0.0 && first.confidence <= 100.0);
    }

    #[test]
    fn test_predict_label_mismatch() {
        let labels: LabelMap = ["Aphid", "Whitefly"].iter().map(|s| s.to_string()).collect();
        let model = PestModel::new(Arc::new(ChannelMeanClassifier), labels);

        let err = model.predict(&png(8, 8, [10, 10, 10])).unwrap_err();
        assert!(matches!(err, InferenceError::LabelMismatch { outputs: 3, labels: 2 }));
    }

    struct FixedClassifier(Vec<f32>);

    impl PestClassifier for FixedClassifier {
        fn forward(&self, _input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_confidence_scaled_in_f32() {
        let labels: LabelMap = ["Aphid", "Whitefly", "Thrips"].iter().map(|s| s.to_string()).collect();
        let model = PestModel::new(Arc::new(FixedClassifier(vec![0.8, 0.1, 0.1])), labels);

        let prediction = model.predict(&png(8, 8, [10, 10, 10])).unwrap();
        // 0.8f32 widened before scaling would land just above 80
        assert_eq!(prediction.confidence, 80.0);
    }

    #[test]
    fn test_missing_model_file() {
        let err = OnnxClassifier::load("/nonexistent/pest_cnn_model.onnx").err().unwrap();
        assert!(matches!(err, InferenceError::Runtime(_)));
    }
}
