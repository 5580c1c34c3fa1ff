use std::path::PathBuf;
use clap::{Parser, Subcommand};

use crate::config::Settings;

/// Radiology image descriptions from a vision-language model
#[derive(Debug, Parser)]
#[command(name = "radigenius", version, about)]
pub struct Cli {
    /// Model preset: inference or finetuning (unknown values load inference)
    #[arg(long, global = true)]
    pub mode: Option<String>,

    /// Directory holding the images offered in the interactive menu
    #[arg(long, global = true)]
    pub images_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Pick images from the image directory and describe them in a loop (default)
    Interactive,
    /// Describe one image file and exit
    Describe {
        /// Path of the image file
        image: PathBuf,
        /// Instruction for the model; the configured default when omitted
        #[arg(short, long)]
        prompt: Option<String>,
        /// Print a JSON report instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Show the model preset, decoding parameters and device, then exit
    Config,
}

impl Cli {
    /// Applies command line overrides on top of the loaded settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(mode) = &self.mode {
            settings.model.mode = mode.clone();
        }
        if let Some(dir) = &self.images_dir {
            settings.images.directory = dir.clone();
        }
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Interactive)
    }
}
