//! mistral.rs backed model, tokenizer and loader.
//!
//! mistral.rs runs template rendering, tokenization, sampling and detokenizing
//! inside a single chat request. The tokenizer handle therefore prepares a
//! `VisionMessages` request and the model handle submits it; the engine applies
//! the model's own chat template and strips special tokens from the reply.
//!
//! The engine returns only the assistant reply, without the echoed
//! `user ... assistant` transcript a raw `generate`/`decode` pass produces.
//! With this backend the role separation step therefore only trims the reply.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use image::{DynamicImage, RgbImage};
use mistralrs::{
    AutoDeviceMapParams, DeviceMapSetting, IsqType, ModelDType, RequestBuilder, TextMessageRole,
    VisionMessages, VisionModelBuilder,
};
use tracing::{debug, info, instrument};

use crate::config::{GradientCheckpointing, ModelConfig, Precision};
use crate::model::{
    ComputeDevice, Conversation, DeviceInputs, ModelError, ModelLoader, VisionModel,
    VisionTokenizer,
};
use crate::predict::GenerationParams;

/// Loads vision models through mistral.rs
#[derive(Debug, Default, Clone, Copy)]
pub struct MistralLoader;

/// Model handle wrapping a mistral.rs engine
pub struct MistralVisionModel {
    model: Arc<mistralrs::Model>,
    name: String,
    device: ComputeDevice,
    loaded_at: DateTime<Utc>,
}

/// Tokenizer handle sharing the engine with its [`MistralVisionModel`]
pub struct MistralTokenizer {
    model: Arc<mistralrs::Model>,
    device: ComputeDevice,
}

/// A prepared chat request
pub struct MistralInputs {
    messages: VisionMessages,
    weights_device: ComputeDevice,
    device: Option<ComputeDevice>,
}

/// Reply of a chat request
#[derive(Debug, Clone)]
pub struct MistralOutput {
    pub content: Option<String>,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

impl MistralVisionModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device(&self) -> ComputeDevice {
        self.device
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

impl fmt::Debug for MistralVisionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MistralVisionModel")
            .field("name", &self.name)
            .field("device", &self.device)
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

impl DeviceInputs for MistralInputs {
    /// The engine places inputs next to the weights, so only the device the
    /// weights were loaded on is accepted.
    fn to_device(mut self, device: ComputeDevice) -> Result<Self, ModelError> {
        if device != self.weights_device {
            return Err(ModelError::device(format!(
                "Cannot move inputs to {}: weights are on {}",
                device, self.weights_device
            )));
        }
        self.device = Some(device);
        Ok(self)
    }
}

impl VisionTokenizer<MistralVisionModel> for MistralTokenizer {
    /// Validates the conversation and returns the user text.
    ///
    /// The engine renders the model's template itself when the request runs
    /// and always appends the generation prompt.
    fn apply_chat_template(
        &self,
        conversation: &Conversation,
        _add_generation_prompt: bool,
    ) -> Result<String, ModelError> {
        if conversation.image_slots() != 1 {
            return Err(ModelError::template(format!(
                "Expected exactly one image slot, found {}",
                conversation.image_slots()
            )));
        }
        conversation
            .last_user_text()
            .ok_or_else(|| ModelError::template("Conversation has no user message"))
    }

    fn encode(
        &self,
        image: &RgbImage,
        prompt: &str,
        _add_special_tokens: bool,
    ) -> Result<MistralInputs, ModelError> {
        let images = vec![DynamicImage::ImageRgb8(image.clone())];
        let messages = VisionMessages::new()
            .add_image_message(TextMessageRole::User, prompt, images, &self.model)
            .map_err(|e| ModelError::encoding(e.to_string()))?;

        Ok(MistralInputs { messages, weights_device: self.device, device: None })
    }

    /// Returns the reply text. The engine has already removed special tokens.
    fn decode(&self, output: &MistralOutput, _skip_special_tokens: bool) -> Result<String, ModelError> {
        output
            .content
            .clone()
            .ok_or_else(|| ModelError::decoding("No response content"))
    }
}

#[async_trait]
impl VisionModel for MistralVisionModel {
    type Inputs = MistralInputs;
    type Output = MistralOutput;

    #[instrument(skip(self, inputs, params), fields(model = %self.name))]
    async fn generate(
        &self,
        inputs: MistralInputs,
        params: &GenerationParams,
    ) -> Result<MistralOutput, ModelError> {
        if inputs.device.is_none() {
            debug!("Inputs were not explicitly placed, using {}", inputs.weights_device);
        }

        let request = RequestBuilder::from(inputs.messages)
            .set_sampler_max_len(params.max_new_tokens)
            .set_sampler_temperature(params.temperature as f64)
            .set_sampler_minp(params.min_p as f64);

        let response = self
            .model
            .send_chat_request(request)
            .await
            .map_err(|e| ModelError::generation(e.to_string()))?;

        debug!(
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "Generation finished"
        );

        Ok(MistralOutput {
            content: response.choices.first().and_then(|c| c.message.content.clone()),
            prompt_tokens: response.usage.prompt_tokens as usize,
            completion_tokens: response.usage.completion_tokens as usize,
        })
    }
}

#[async_trait]
impl ModelLoader for MistralLoader {
    type Model = MistralVisionModel;
    type Tokenizer = MistralTokenizer;

    #[instrument(skip(self, config), fields(model = config.model_name))]
    async fn load(
        &self,
        config: &'static ModelConfig,
        device: ComputeDevice,
    ) -> Result<(MistralVisionModel, MistralTokenizer), ModelError> {
        // hf-hub resolves its download cache from HF_HOME
        std::env::set_var("HF_HOME", config.cache_path());
        info!("Loading mistral.rs vision model: {}", config.model_name);

        let mut builder = VisionModelBuilder::new(config.model_name)
            .with_dtype(model_dtype(config.dtype))
            .with_device_mapping(device_map(device));

        // The dummy map alone still lets the engine pick its best device
        if forces_cpu(device) {
            builder = builder.with_force_cpu();
        }

        if let Some(isq) = isq_type(config) {
            builder = builder.with_isq(isq);
            debug!("ISQ quantization enabled: {:?}", isq);
        }

        if config.use_gradient_checkpointing != GradientCheckpointing::Disabled {
            debug!(
                "Gradient checkpointing '{}' only applies to training, ignored for inference",
                config.use_gradient_checkpointing
            );
        }
        debug!("Max sequence length {} has no load-time setting in mistral.rs", config.max_seq_length);

        builder = builder.with_logging();

        let model = builder
            .build()
            .await
            .map_err(|e| ModelError::load(format!("Failed to load {}: {}", config.model_name, e)))?;
        let model = Arc::new(model);

        info!("Vision model loaded successfully: {}", config.model_name);

        Ok((
            MistralVisionModel {
                model: Arc::clone(&model),
                name: config.model_name.to_string(),
                device,
                loaded_at: Utc::now(),
            },
            MistralTokenizer { model, device },
        ))
    }
}

fn model_dtype(precision: Precision) -> ModelDType {
    match precision {
        Precision::BFloat16 => ModelDType::BF16,
        Precision::Float16 => ModelDType::F16,
    }
}

fn isq_type(config: &ModelConfig) -> Option<IsqType> {
    config.load_in_4bit.then_some(IsqType::Q4K)
}

fn forces_cpu(device: ComputeDevice) -> bool {
    device == ComputeDevice::Cpu
}

fn device_map(device: ComputeDevice) -> DeviceMapSetting {
    match device {
        ComputeDevice::Cpu => DeviceMapSetting::dummy(),
        ComputeDevice::Cuda(_) | ComputeDevice::Metal => {
            DeviceMapSetting::Auto(AutoDeviceMapParams::default_vision())
        }
    }
}
