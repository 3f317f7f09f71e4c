// Library exports for the binary and for tests
pub mod cli;
pub mod config_file;
pub mod image_processing;
pub mod json_output;
pub mod utils;

// Re-export commonly used types
pub use cli::Args;
pub use image_processing::{
    discover_images, BatchReport, Outcome, ResizeEngine, SkipReason, StickerConfig,
};
pub use image_processing::overwrite::{OverwriteDecider, PromptDecider};
pub use image_processing::tally::Tally;
pub use image_processing::upscale::{Upscaler, Waifu2x};
pub use json_output::JsonMessage;
