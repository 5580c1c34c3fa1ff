//! # Model Module
//!
//! Seams between the prediction code and the external vision-language engine.
//!
//! ## Key Components
//!
//! - `VisionModel`: runs generation on prepared inputs
//! - `VisionTokenizer`: renders the chat template, encodes image and prompt,
//!   and decodes generated output. Paired 1:1 with a `VisionModel`.
//! - `ModelLoader`: produces a model/tokenizer pair from a `ModelConfig`
//! - `initialize_model`: the once-per-process entry point
//!
//! The mistral.rs implementation lives in `mistral`. Tests substitute stubs.

use async_trait::async_trait;
use image::RgbImage;
use tracing::info;

use crate::config::{get_config, ModelConfig};
use crate::predict::GenerationParams;

pub mod conversation;
pub mod device;
pub mod error;
pub mod mistral;

pub use conversation::{ContentPart, Conversation, Message, Role};
pub use device::{ComputeDevice, DevicePreference};
pub use error::{ErrorKind, ModelError};

/// Model inputs that can be placed on a compute device.
pub trait DeviceInputs: Sized {
    fn to_device(self, device: ComputeDevice) -> Result<Self, ModelError>;
}

/// A loaded vision-language model.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Prepared inputs produced by the paired tokenizer
    type Inputs: DeviceInputs + Send + 'static;
    /// Raw generation output consumed by the paired tokenizer
    type Output: Send + 'static;

    /// Runs autoregressive generation. Blocks the caller for its full duration.
    async fn generate(
        &self,
        inputs: Self::Inputs,
        params: &GenerationParams,
    ) -> Result<Self::Output, ModelError>;
}

/// Tokenizer and processor paired with a [`VisionModel`].
pub trait VisionTokenizer<M: VisionModel>: Send + Sync {
    /// Renders the conversation through the model's chat template.
    fn apply_chat_template(
        &self,
        conversation: &Conversation,
        add_generation_prompt: bool,
    ) -> Result<String, ModelError>;

    /// Turns an image and a rendered prompt into model inputs.
    fn encode(
        &self,
        image: &RgbImage,
        prompt: &str,
        add_special_tokens: bool,
    ) -> Result<M::Inputs, ModelError>;

    /// Turns generation output back into text.
    fn decode(&self, output: &M::Output, skip_special_tokens: bool) -> Result<String, ModelError>;
}

/// Produces a model/tokenizer pair from a preset.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    type Model: VisionModel;
    type Tokenizer: VisionTokenizer<Self::Model>;

    async fn load(
        &self,
        config: &'static ModelConfig,
        device: ComputeDevice,
    ) -> Result<(Self::Model, Self::Tokenizer), ModelError>;
}

/// Loads the model and tokenizer for a mode selector.
///
/// The preset is looked up with [`get_config`], so unknown selectors load the
/// inference preset. Load failures are returned unchanged. Each call loads the
/// weights again; call it once per process.
///
/// # Arguments
///
/// * `loader` - Backend that performs the load
/// * `mode` - `"inference"` or `"finetuning"`
/// * `device` - Resolved compute device
pub async fn initialize_model<L: ModelLoader>(
    loader: &L,
    mode: Option<&str>,
    device: ComputeDevice,
) -> Result<(L::Model, L::Tokenizer), ModelError> {
    let config = get_config(mode);
    info!(
        model = config.model_name,
        load_in_4bit = config.load_in_4bit,
        dtype = %config.dtype,
        checkpointing = %config.use_gradient_checkpointing,
        max_seq_length = config.max_seq_length,
        cache_dir = config.cache_dir,
        device = %device,
        "Initializing model"
    );
    loader.load(config, device).await
}
