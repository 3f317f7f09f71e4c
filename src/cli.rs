use clap::Parser;
use std::path::PathBuf;

use crate::image_processing::upscale::{DEFAULT_NOISE_LEVEL, DEFAULT_WAIFU2X_BIN};

#[derive(Parser, Debug)]
#[command(
    name = "sticker-resizer",
    version,
    about = "Resize images to fit the Telegram sticker size restrictions",
    long_about = "
Telegram Sticker Resizer

Every supported image (png, jpg, jpeg, bmp) found directly inside INPUT_DIR is scaled
uniformly so that it fits inside 512x512 with one side exactly 512 pixels, and written
as PNG to INPUT_DIR/out. Images that already satisfy the limits are left alone.

Example Usage:
  # Resize everything in ~/Stickers, asking before overwriting
  sticker-resizer ~/Stickers

  # Overwrite existing outputs without asking
  sticker-resizer -f ~/Stickers

  # Upscale small images with waifu2x first
  sticker-resizer -w --waifu2x-bin /opt/waifu2x/waifu2x-ncnn-vulkan ~/Stickers"
)]
pub struct Args {
    /// Directory containing the input images
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Force overwriting of existing output files
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Use waifu2x to upscale the images first
    #[arg(short = 'w', long = "waifu2x")]
    pub waifu2x: bool,

    /// Path of the waifu2x-ncnn-vulkan executable
    #[arg(long = "waifu2x-bin", value_name = "FILE")]
    pub waifu2x_bin: Option<PathBuf>,

    /// waifu2x denoise level (-1 to 3)
    #[arg(long = "noise-level", value_name = "N", allow_negative_numbers = true)]
    pub noise_level: Option<i32>,

    /// Enable verbose output with detailed information for each image
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Emit progress and results as JSON lines instead of console text
    #[arg(long = "json-progress")]
    pub json_progress: bool,

    /// Load settings from a JSON config file (command-line flags take precedence)
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

impl Args {
    pub fn noise_level(&self) -> i32 {
        self.noise_level.unwrap_or(DEFAULT_NOISE_LEVEL)
    }

    pub fn waifu2x_bin(&self) -> PathBuf {
        self.waifu2x_bin
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WAIFU2X_BIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from(["sticker-resizer", "-f", "-w", "stickers"]).unwrap();
        assert!(args.force);
        assert!(args.waifu2x);
        assert!(!args.verbose);
        assert_eq!(args.input_dir, PathBuf::from("stickers"));
    }

    #[test]
    fn test_input_dir_required() {
        assert!(Args::try_parse_from(["sticker-resizer", "-f"]).is_err());
    }

    #[test]
    fn test_help_flag() {
        let err = Args::try_parse_from(["sticker-resizer", "-h"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_negative_noise_level() {
        let args =
            Args::try_parse_from(["sticker-resizer", "--noise-level", "-1", "dir"]).unwrap();
        assert_eq!(args.noise_level(), -1);
    }

    #[test]
    fn test_defaults() {
        let args = Args::default();
        assert_eq!(args.noise_level(), DEFAULT_NOISE_LEVEL);
        assert_eq!(args.waifu2x_bin(), PathBuf::from(DEFAULT_WAIFU2X_BIN));
    }
}

// Default implementation for tests
#[cfg(test)]
impl Default for Args {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            force: false,
            waifu2x: false,
            waifu2x_bin: None,
            noise_level: None,
            verbose: false,
            json_progress: false,
            config_file: None,
        }
    }
}
