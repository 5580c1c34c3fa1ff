#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use image::RgbImage;

use radigenius::config::ModelConfig;
use radigenius::model::{
    ComputeDevice, Conversation, DeviceInputs, ModelError, ModelLoader, VisionModel,
    VisionTokenizer,
};
use radigenius::predict::GenerationParams;

/// Inputs as the stub tokenizer prepares them
#[derive(Debug, Clone, PartialEq)]
pub struct StubInputs {
    pub prompt: String,
    pub image_size: (u32, u32),
    pub add_special_tokens: bool,
    pub device: Option<ComputeDevice>,
}

impl DeviceInputs for StubInputs {
    fn to_device(mut self, device: ComputeDevice) -> Result<Self, ModelError> {
        self.device = Some(device);
        Ok(self)
    }
}

/// What the stub model should do when asked to generate
pub enum Behavior {
    Reply(String),
    Fail(ModelError),
    Panic(&'static str),
}

pub struct StubModel {
    behavior: Behavior,
    pub calls: Mutex<Vec<(StubInputs, GenerationParams)>>,
}

impl StubModel {
    pub fn replying(text: &str) -> Self {
        Self::new(Behavior::Reply(text.to_string()))
    }

    pub fn new(behavior: Behavior) -> Self {
        Self { behavior, calls: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl VisionModel for StubModel {
    type Inputs = StubInputs;
    type Output = String;

    async fn generate(
        &self,
        inputs: StubInputs,
        params: &GenerationParams,
    ) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push((inputs, *params));
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail(e) => Err(e.clone()),
            Behavior::Panic(msg) => panic!("{}", msg),
        }
    }
}

#[derive(Default)]
pub struct StubTokenizer {
    pub template_error: Option<String>,
    pub generation_prompt_flags: Mutex<Vec<bool>>,
    pub skip_special_flags: Mutex<Vec<bool>>,
}

impl StubTokenizer {
    pub fn failing_template(message: &str) -> Self {
        Self { template_error: Some(message.to_string()), ..Default::default() }
    }
}

impl VisionTokenizer<StubModel> for StubTokenizer {
    fn apply_chat_template(
        &self,
        conversation: &Conversation,
        add_generation_prompt: bool,
    ) -> Result<String, ModelError> {
        self.generation_prompt_flags.lock().unwrap().push(add_generation_prompt);
        if let Some(message) = &self.template_error {
            return Err(ModelError::template(message.clone()));
        }
        let text = conversation.last_user_text().unwrap_or_default();
        Ok(format!("<|image|>{}", text))
    }

    fn encode(
        &self,
        image: &RgbImage,
        prompt: &str,
        add_special_tokens: bool,
    ) -> Result<StubInputs, ModelError> {
        Ok(StubInputs {
            prompt: prompt.to_string(),
            image_size: image.dimensions(),
            add_special_tokens,
            device: None,
        })
    }

    fn decode(&self, output: &String, skip_special_tokens: bool) -> Result<String, ModelError> {
        self.skip_special_flags.lock().unwrap().push(skip_special_tokens);
        Ok(output.clone())
    }
}

/// Loader that records the preset it was handed
#[derive(Default)]
pub struct StubLoader {
    pub fail_with: Option<String>,
    pub loaded: Mutex<Vec<(&'static ModelConfig, ComputeDevice)>>,
}

#[async_trait]
impl ModelLoader for StubLoader {
    type Model = StubModel;
    type Tokenizer = StubTokenizer;

    async fn load(
        &self,
        config: &'static ModelConfig,
        device: ComputeDevice,
    ) -> Result<(StubModel, StubTokenizer), ModelError> {
        self.loaded.lock().unwrap().push((config, device));
        if let Some(message) = &self.fail_with {
            return Err(ModelError::load(message.clone()));
        }
        Ok((StubModel::replying("assistant: ok"), StubTokenizer::default()))
    }
}

pub fn test_image() -> RgbImage {
    RgbImage::new(4, 3)
}
