use std::error::Error;
use std::path::Path;
use colored::*;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde::Serialize;
use tracing::info;

use crate::config::Settings;
use crate::model::{ErrorKind, VisionModel, VisionTokenizer};
use crate::predict::{Prediction, Predictor};

use super::display::{print_menu, spinner, RESULT_SEPARATOR};
use super::images::{list_image_names, load_rgb_image, menu_options};

/// JSON shape printed by `describe --json`
#[derive(Debug, Serialize)]
pub struct DescribeReport {
    pub image: String,
    pub prompt: String,
    pub output: String,
    pub error_kind: Option<ErrorKind>,
}

impl DescribeReport {
    pub fn new(image: &Path, prompt: &str, prediction: &Prediction) -> Self {
        Self {
            image: image.display().to_string(),
            prompt: prompt.to_string(),
            output: prediction.render(),
            error_kind: prediction.error_kind(),
        }
    }
}

/// Picks the typed instruction, or the default when nothing was typed.
pub fn resolve_instruction(typed: &str, default: &str) -> String {
    if typed.is_empty() {
        default.to_string()
    } else {
        typed.to_string()
    }
}

// --- Main Chat Loop ---

/// Interactive loop: pick an image, optionally type an instruction, print the
/// description, repeat.
///
/// Runs until Ctrl-C or Ctrl-D. A name without a matching image file ends the
/// loop with the I/O or decode error.
pub async fn chat_loop<M, T>(
    settings: &Settings,
    predictor: &Predictor<M, T>,
) -> Result<(), Box<dyn Error + Send + Sync>>
where
    M: VisionModel,
    T: VisionTokenizer<M>,
{
    let names = list_image_names(&settings.images.directory)?;
    let image_options = menu_options(&names);
    let default_prompt = &settings.images.default_instruction;
    info!("Interactive session started with {} images", names.len());

    let mut rl = DefaultEditor::new()?;

    loop {
        print_menu(&image_options);
        let input_image = match rl.readline("> ") {
            Ok(line) => line.trim().to_string(),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => return Err(e.into()),
        };
        let _ = rl.add_history_entry(input_image.as_str());

        let user_prompt = match rl.readline(&format!(
            "Enter your prompt or press enter to use default prompt: (default: {})",
            default_prompt
        )) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => return Err(e.into()),
        };
        let instruction = resolve_instruction(&user_prompt, default_prompt);

        let image_path = settings.images.path_for(&input_image);
        let image = load_rgb_image(&image_path)?;

        println!("{} {}", "using image:".green(), image_path.display());
        println!("{} {}", "using prompt:".green(), instruction);
        println!("generating description...");

        let pb = spinner("Generating...");
        let output = predictor.describe(&image, &instruction).await;
        pb.finish_and_clear();

        println!("{}", output);
        println!("{}", RESULT_SEPARATOR);
    }
    Ok(())
}

/// Describes a single image and prints the result.
///
/// # Arguments
///
/// * `image_path` - Image file to describe
/// * `prompt` - Instruction, or `None` for the configured default
/// * `json` - Print a [`DescribeReport`] instead of the plain text
pub async fn describe_image<M, T>(
    settings: &Settings,
    predictor: &Predictor<M, T>,
    image_path: &Path,
    prompt: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn Error + Send + Sync>>
where
    M: VisionModel,
    T: VisionTokenizer<M>,
{
    let instruction = resolve_instruction(prompt.unwrap_or_default(), &settings.images.default_instruction);
    let image = load_rgb_image(image_path)?;

    let pb = spinner("Generating...");
    let prediction = predictor.predict(&image, &instruction).await;
    pb.finish_and_clear();

    if json {
        let report = DescribeReport::new(image_path, &instruction, &prediction);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", prediction);
    }
    Ok(())
}
