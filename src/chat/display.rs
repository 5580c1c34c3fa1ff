use std::time::Duration;
use colored::*;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::ModelConfig;
use crate::model::ComputeDevice;
use crate::predict::GenerationParams;

/// Separator printed after every result in the interactive loop
pub const RESULT_SEPARATOR: &str = "\n--------------------------------\n";

/// Starts a spinner on stderr with the given message.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message.to_string());
    pb
}

/// Builds the table shown by `radigenius config`.
pub fn config_table(config: &ModelConfig, params: &GenerationParams, device: ComputeDevice) -> Table {
    let header = |text: &str| {
        Cell::new(text).fg(comfy_table::Color::Cyan).add_attribute(Attribute::Bold)
    };
    let row = |key: &str, value: String| {
        vec![
            Cell::new(key).fg(comfy_table::Color::Green),
            Cell::new(value).fg(comfy_table::Color::White).set_alignment(CellAlignment::Left),
        ]
    };

    let mut table = Table::new();
    table
        .set_header(vec![header("Setting"), header("Value")])
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(row("model_name", config.model_name.to_string()));
    table.add_row(row("load_in_4bit", config.load_in_4bit.to_string()));
    table.add_row(row("dtype", config.dtype.to_string()));
    table.add_row(row("gradient_checkpointing", config.use_gradient_checkpointing.to_string()));
    table.add_row(row("max_seq_length", config.max_seq_length.to_string()));
    table.add_row(row("cache_dir", config.cache_dir.to_string()));
    table.add_row(row("max_new_tokens", params.max_new_tokens.to_string()));
    table.add_row(row("temperature", params.temperature.to_string()));
    table.add_row(row("min_p", params.min_p.to_string()));
    table.add_row(row("device", device.to_string()));
    table
}

pub fn display_config_table(config: &ModelConfig, params: &GenerationParams, device: ComputeDevice) {
    println!("\n{}", config_table(config, params, device));
}

pub fn print_menu(options: &str) {
    println!("{}", "Enter image name. Available options are:".cyan());
    if options.is_empty() {
        println!("{}", "(no images found)".yellow());
    } else {
        println!("{}", options);
    }
}
