use serde::{Deserialize, Serialize};

/// Decoding parameters applied to every generation call.
///
/// Defaults reproduce the values the radiology model was tuned with. They can
/// be overridden from the `[generation]` settings table, never per call.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct GenerationParams {
    /// Upper bound on generated tokens
    pub max_new_tokens: usize,
    /// Sampling temperature
    pub temperature: f32,
    /// Min-p threshold: tokens below `min_p` times the top probability are dropped
    pub min_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 256,
            temperature: 1.5,
            min_p: 0.1,
        }
    }
}
