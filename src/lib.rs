//! RadiGenius: describes radiology images with a pretrained vision-language
//! model.
//!
//! - `config`: model presets and layered application settings
//! - `model`: backend traits, compute device, model initialization and the
//!   mistral.rs backend
//! - `predict`: the prediction context and output post-processing
//! - `chat`: interactive and one-shot drivers
//! - `cli`: command line definition

pub mod chat;
pub mod cli;
pub mod config;
pub mod model;
pub mod predict;
