// Declare the display submodule
mod display;

// Image directory helpers
mod images;

// Declare the chat submodule (containing the chat_loop logic)
mod chat;

pub use chat::{chat_loop, describe_image, resolve_instruction, DescribeReport};
pub use display::{config_table, display_config_table, spinner};
pub use images::{image_names, list_image_names, load_rgb_image, menu_options};
