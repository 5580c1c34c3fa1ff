//! Static model-loading presets.
//!
//! Two fixed records exist: one tuned for inference and one tuned for
//! fine-tuning. They trade VRAM footprint against quality. The inference
//! preset keeps full bf16 weights, a long context and no checkpointing. The
//! fine-tuning preset quantizes to 4 bits and recomputes activations so that
//! training state fits on a 24GB card.

use std::fmt;
use std::path::Path;
use serde::Serialize;
use tracing::warn;

/// Hugging Face identifier of the radiology fine-tune both presets load.
pub const MODEL_NAME: &str = "0llheaven/Llama-3.2-11B-Vision-Radiology-mini";

/// Directory used as the weights download cache.
pub const CACHE_DIR: &str = "/base-model";

/// Which preset to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Inference,
    Finetuning,
}

impl Mode {
    /// Parses a mode selector.
    ///
    /// Matching is case-insensitive. Anything other than `"finetuning"`,
    /// including a missing selector, selects [`Mode::Inference`]. An
    /// unrecognized selector is logged but never rejected.
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector.map(|s| s.to_lowercase()) {
            Some(s) if s == "finetuning" => Mode::Finetuning,
            Some(s) if s == "inference" => Mode::Inference,
            Some(other) => {
                warn!("Unrecognized model mode '{}', falling back to inference", other);
                Mode::Inference
            }
            None => Mode::Inference,
        }
    }

    /// The preset for this mode.
    pub fn config(self) -> &'static ModelConfig {
        match self {
            Mode::Inference => &INFERENCE_CONFIG,
            Mode::Finetuning => &FINETUNING_CONFIG,
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Inference
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Inference => write!(f, "inference"),
            Mode::Finetuning => write!(f, "finetuning"),
        }
    }
}

/// Floating point precision the weights are loaded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Precision {
    BFloat16,
    Float16,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::BFloat16 => write!(f, "bf16"),
            Precision::Float16 => write!(f, "f16"),
        }
    }
}

/// Gradient checkpointing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GradientCheckpointing {
    Disabled,
    Enabled,
    /// Activation recomputation tuned for Llama-style models.
    Unsloth,
}

impl fmt::Display for GradientCheckpointing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradientCheckpointing::Disabled => write!(f, "disabled"),
            GradientCheckpointing::Enabled => write!(f, "enabled"),
            GradientCheckpointing::Unsloth => write!(f, "unsloth"),
        }
    }
}

/// Load-time parameters forwarded to the model loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelConfig {
    /// Hub identifier of the model
    pub model_name: &'static str,
    /// Quantize weights to 4 bits on load
    pub load_in_4bit: bool,
    /// Weight precision
    pub dtype: Precision,
    /// Activation checkpointing strategy
    pub use_gradient_checkpointing: GradientCheckpointing,
    /// Maximum sequence length in tokens
    pub max_seq_length: usize,
    /// Weights cache location
    pub cache_dir: &'static str,
}

impl ModelConfig {
    pub fn cache_path(&self) -> &Path {
        Path::new(self.cache_dir)
    }
}

/// Full precision and a 4096 token context. Roughly 22GB of VRAM.
pub static INFERENCE_CONFIG: ModelConfig = ModelConfig {
    model_name: MODEL_NAME,
    load_in_4bit: false,
    dtype: Precision::BFloat16,
    use_gradient_checkpointing: GradientCheckpointing::Disabled,
    max_seq_length: 4096,
    cache_dir: CACHE_DIR,
};

/// 4-bit weights (about 5.5GB) leave room for gradients and optimizer state.
pub static FINETUNING_CONFIG: ModelConfig = ModelConfig {
    model_name: MODEL_NAME,
    load_in_4bit: true,
    dtype: Precision::BFloat16,
    use_gradient_checkpointing: GradientCheckpointing::Unsloth,
    max_seq_length: 2048,
    cache_dir: CACHE_DIR,
};

/// Returns the preset for a mode selector.
///
/// # Arguments
///
/// * `mode` - `"inference"` or `"finetuning"` in any case. Any other value,
///   or `None`, returns the inference preset.
pub fn get_config(mode: Option<&str>) -> &'static ModelConfig {
    Mode::from_selector(mode).config()
}
