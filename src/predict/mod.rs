//! # Prediction Module
//!
//! Turns an image and an instruction into a description using a loaded
//! model/tokenizer pair.
//!
//! The `Predictor` is the context object that owns the pair, the resolved
//! compute device and the decoding parameters. It is built once after
//! `initialize_model` and then used read-only for every request. Calls are
//! not meant to overlap; a caller serving concurrent requests has to queue
//! them in front of a single `Predictor`.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures::FutureExt;
use image::RgbImage;
use tracing::{debug, error, info};

use crate::model::{
    ComputeDevice, Conversation, DeviceInputs, ErrorKind, ModelError, VisionModel,
    VisionTokenizer,
};

mod params;
mod postprocess;

pub use params::GenerationParams;
pub use postprocess::{separate_roles, ASSISTANT_MARKER};

/// Prefix of the legacy error string
pub const ERROR_PREFIX: &str = "Error: ";

/// Outcome of one prediction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prediction {
    /// Post-processed model output
    Described(String),
    /// Any failure between templating and decoding
    Failed(ModelError),
}

impl Prediction {
    /// Legacy string form: the description, or `Error: <message>`.
    ///
    /// Error kinds cannot be told apart in this form; use
    /// [`Prediction::error_kind`] to branch on them.
    pub fn render(&self) -> String {
        match self {
            Prediction::Described(text) => text.clone(),
            Prediction::Failed(e) => format!("{}{}", ERROR_PREFIX, e),
        }
    }

    pub fn is_described(&self) -> bool {
        matches!(self, Prediction::Described(_))
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Prediction::Described(_) => None,
            Prediction::Failed(e) => Some(e.kind()),
        }
    }

    pub fn into_result(self) -> Result<String, ModelError> {
        match self {
            Prediction::Described(text) => Ok(text),
            Prediction::Failed(e) => Err(e),
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Runs single-image predictions against a loaded model.
pub struct Predictor<M, T>
where
    M: VisionModel,
    T: VisionTokenizer<M>,
{
    model: M,
    tokenizer: T,
    device: ComputeDevice,
    params: GenerationParams,
}

impl<M, T> Predictor<M, T>
where
    M: VisionModel,
    T: VisionTokenizer<M>,
{
    /// Creates a predictor with the default decoding parameters.
    ///
    /// # Arguments
    ///
    /// * `model` - Loaded model handle
    /// * `tokenizer` - Tokenizer paired with `model`
    /// * `device` - Device resolved at startup
    pub fn new(model: M, tokenizer: T, device: ComputeDevice) -> Self {
        Self {
            model,
            tokenizer,
            device,
            params: GenerationParams::default(),
        }
    }

    /// Replaces the decoding parameters.
    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn device(&self) -> ComputeDevice {
        self.device
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    /// Describes an image according to an instruction.
    ///
    /// Never fails: backend errors and panics come back as
    /// [`Prediction::Failed`]. The instruction is passed through as given,
    /// including an empty one.
    pub async fn predict(&self, image: &RgbImage, instruction: &str) -> Prediction {
        let started = Instant::now();
        let outcome = AssertUnwindSafe(self.run(image, instruction))
            .catch_unwind()
            .await;

        let prediction = match outcome {
            Ok(Ok(text)) => Prediction::Described(text),
            Ok(Err(e)) => Prediction::Failed(e),
            Err(payload) => Prediction::Failed(ModelError::new(ErrorKind::Panic, panic_message(payload))),
        };

        match &prediction {
            Prediction::Described(text) => info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                chars = text.chars().count(),
                "Prediction finished"
            ),
            Prediction::Failed(e) => error!(
                kind = %e.kind(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Prediction failed: {}", e
            ),
        }

        prediction
    }

    /// Same as [`Predictor::predict`] but returns the legacy string form.
    pub async fn describe(&self, image: &RgbImage, instruction: &str) -> String {
        self.predict(image, instruction).await.render()
    }

    async fn run(&self, image: &RgbImage, instruction: &str) -> Result<String, ModelError> {
        let conversation = Conversation::single_turn(instruction);
        let prompt = self.tokenizer.apply_chat_template(&conversation, true)?;
        debug!("Rendered prompt: {:?}", prompt);

        let inputs = self
            .tokenizer
            .encode(image, &prompt, false)?
            .to_device(self.device)?;

        let output = self.model.generate(inputs, &self.params).await?;
        let decoded = self.tokenizer.decode(&output, true)?;
        debug!("Decoded output: {:?}", decoded);

        Ok(separate_roles(&decoded))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "model backend panicked".to_string()
    }
}
