pub mod alpha;
pub mod overwrite;
pub mod resize;
pub mod tally;
pub mod upscale;

use anyhow::{Context, Result};
use image::{GenericImageView, ImageFormat};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::WalkDir;

use crate::json_output::JsonMessage;
use crate::utils::{
    create_spinner, detail_println, ensure_writable_dir, error_println, has_supported_extension,
    info_println, validate_input_dir, verbose_println, warn_println,
};

use overwrite::OverwriteDecider;
use resize::{plan_resize, resize_image, ResizePlan, STICKER_MAX_HEIGHT, STICKER_MAX_WIDTH};
use tally::Tally;
use upscale::{Upscaler, UPSCALE_FACTOR, WAIFU2X_TMP_DIR};

/// Name of the output directory created under the input directory
pub const OUTPUT_DIR_NAME: &str = "out";

#[derive(Debug, Clone)]
pub struct StickerConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub max_width: u32,
    pub max_height: u32,
    pub force: bool,
    pub waifu2x: bool,
    pub verbose: bool,
    pub json_progress: bool,
}

impl StickerConfig {
    /// Sticker bounds, output in `<input_dir>/out`, every option off
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        let input_dir = input_dir.into();
        let output_dir = input_dir.join(OUTPUT_DIR_NAME);
        Self {
            input_dir,
            output_dir,
            max_width: STICKER_MAX_WIDTH,
            max_height: STICKER_MAX_HEIGHT,
            force: false,
            waifu2x: false,
            verbose: false,
            json_progress: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyFeasible,
    OverwriteDeclined,
}

impl SkipReason {
    pub fn description(&self) -> &'static str {
        match self {
            SkipReason::AlreadyFeasible => "Size already feasible",
            SkipReason::OverwriteDeclined => "File exists",
        }
    }
}

/// Result of handling a single image
#[derive(Debug)]
pub enum Outcome {
    Processed {
        output_path: PathBuf,
        width: u32,
        height: u32,
    },
    Skipped(SkipReason),
    Failed(anyhow::Error),
}

/// Totals of a run and whether it was cut short
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub tally: Tally,
    pub interrupted: bool,
}

/// Supported images directly inside `dir`, sorted by path
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>> {
    validate_input_dir(dir)?;

    let mut image_files = Vec::new();
    let walker = WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false);

    for entry in walker {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        if path.is_file() && has_supported_extension(path) {
            image_files.push(path.to_path_buf());
        }
    }

    image_files.sort();
    Ok(image_files)
}

pub struct ResizeEngine {
    config: StickerConfig,
}

impl ResizeEngine {
    pub fn new(config: StickerConfig) -> Self {
        Self { config }
    }

    fn info(&self, message: &str) {
        if !self.config.json_progress {
            info_println(message);
        }
    }

    fn detail(&self, message: &str) {
        if !self.config.json_progress {
            detail_println(message);
        }
    }

    fn verbose(&self, message: &str) {
        if !self.config.json_progress {
            verbose_println(self.config.verbose, message);
        }
    }

    fn warn(&self, message: &str) {
        if self.config.json_progress {
            JsonMessage::warning(message);
        } else {
            warn_println(message);
        }
    }

    /// Full pipeline: optional alpha fix and upscale pass, then the resize pass.
    /// Fatal setup problems are returned as errors, per-file problems are tallied.
    pub fn execute(
        &self,
        upscaler: &dyn Upscaler,
        decider: &mut dyn OverwriteDecider,
        interrupted: &AtomicBool,
    ) -> Result<BatchReport> {
        let input_dir = &self.config.input_dir;
        validate_input_dir(input_dir)?;
        ensure_writable_dir(&self.config.output_dir)?;

        let originals = discover_images(input_dir)?;
        self.verbose(&format!(
            "Found {} image file(s) in {}",
            originals.len(),
            input_dir.display()
        ));

        if !self.config.waifu2x {
            return Ok(self.run(&originals, decider, interrupted));
        }

        self.info("Fixing alpha channel in case it's wrong.");
        let rewritten = alpha::normalize_alpha(&originals)?;
        for path in &rewritten {
            self.verbose(&format!("Converted to RGBA: {}", path.display()));
        }

        let tmp_dir = input_dir.join(WAIFU2X_TMP_DIR);
        ensure_writable_dir(&tmp_dir)?;

        self.info("Using waifu2x to scale the images");
        let sources = self.upscale_sources(upscaler, &tmp_dir, originals);
        let report = self.run(&sources, decider, interrupted);

        if let Err(e) = fs::remove_dir_all(&tmp_dir) {
            self.warn(&format!("Failed to remove {}: {}", tmp_dir.display(), e));
        }

        Ok(report)
    }

    /// Run the upscaler and pick the files the resize pass should read.
    /// Each original is replaced by the upscaled copy with the same stem; originals
    /// without a copy, or all of them when the upscaler fails, are resized as they are.
    fn upscale_sources(
        &self,
        upscaler: &dyn Upscaler,
        tmp_dir: &Path,
        originals: Vec<PathBuf>,
    ) -> Vec<PathBuf> {
        let spinner = if self.config.json_progress {
            None
        } else {
            Some(create_spinner("Waiting for waifu2x..."))
        };
        let result = upscaler.upscale(&self.config.input_dir, tmp_dir, UPSCALE_FACTOR);
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        if let Err(e) = result {
            self.warn(&format!("{:#}. Resizing the original images", e));
            return originals;
        }

        let upscaled: HashMap<OsString, PathBuf> = match discover_images(tmp_dir) {
            Ok(files) => files
                .into_iter()
                .filter_map(|path| Some((path.file_stem()?.to_os_string(), path)))
                .collect(),
            Err(e) => {
                self.warn(&format!("{:#}. Resizing the original images", e));
                return originals;
            }
        };
        if upscaled.is_empty() {
            self.warn("waifu2x produced no images. Resizing the original images");
            return originals;
        }

        let mut missing = Vec::new();
        let sources: Vec<PathBuf> = originals
            .into_iter()
            .map(|original| {
                let copy = original.file_stem().and_then(|stem| upscaled.get(stem));
                match copy {
                    Some(path) => path.clone(),
                    None => {
                        missing.push(original.display().to_string());
                        original
                    }
                }
            })
            .collect();

        if !missing.is_empty() {
            self.warn(&format!(
                "waifu2x produced no copy of {}. Resizing the original instead",
                missing.join(", ")
            ));
        }
        sources
    }

    /// Resize `files` in order, stopping early once `interrupted` is set
    pub fn run(
        &self,
        files: &[PathBuf],
        decider: &mut dyn OverwriteDecider,
        interrupted: &AtomicBool,
    ) -> BatchReport {
        let mut tally = Tally::default();

        for path in files {
            if interrupted.load(Ordering::SeqCst) {
                return BatchReport {
                    tally,
                    interrupted: true,
                };
            }

            let outcome = self.process(path, decider);
            self.report_outcome(path, &outcome);
            tally.record(&outcome);
        }

        BatchReport {
            tally,
            interrupted: interrupted.load(Ordering::SeqCst),
        }
    }

    /// Resize a single image into the output directory
    pub fn process(&self, input_path: &Path, decider: &mut dyn OverwriteDecider) -> Outcome {
        self.info(&format!("Opening {} ...", input_path.display()));
        match self.try_process(input_path, decider) {
            Ok(outcome) => outcome,
            Err(e) => Outcome::Failed(e),
        }
    }

    fn try_process(
        &self,
        input_path: &Path,
        decider: &mut dyn OverwriteDecider,
    ) -> Result<Outcome> {
        let img = image::open(input_path).with_context(|| {
            format!("Can't load {}, probably broken?", input_path.display())
        })?;

        let (width, height) = img.dimensions();
        self.detail(&format!("Size : {} x {}", width, height));

        let (scale, new_width, new_height) =
            match plan_resize(width, height, self.config.max_width, self.config.max_height)? {
                ResizePlan::AlreadyFeasible => {
                    return Ok(Outcome::Skipped(SkipReason::AlreadyFeasible))
                }
                ResizePlan::Scale {
                    scale,
                    width,
                    height,
                } => (scale, width, height),
            };

        let output_path = self.output_path_for(input_path)?;
        if output_path.is_dir() {
            return Err(anyhow::anyhow!(
                "{} is an existing directory",
                output_path.display()
            ));
        }
        if output_path.is_file() && !self.config.force && !decider.confirm_overwrite(&output_path)
        {
            return Ok(Outcome::Skipped(SkipReason::OverwriteDeclined));
        }

        let resized = resize_image(&img, new_width, new_height)?;
        self.detail(&format!(
            "Resized : {} x {}, scale = {:.6}",
            new_width, new_height, scale
        ));
        self.verbose(&format!("Color type: {:?}", resized.color()));

        resized
            .save_with_format(&output_path, ImageFormat::Png)
            .with_context(|| format!("Failed to save output to {}", output_path.display()))?;

        Ok(Outcome::Processed {
            output_path,
            width: new_width,
            height: new_height,
        })
    }

    /// `<output_dir>/<stem>.png`
    pub fn output_path_for(&self, input_path: &Path) -> Result<PathBuf> {
        let stem = input_path
            .file_stem()
            .ok_or_else(|| anyhow::anyhow!("No file name in {}", input_path.display()))?;
        let mut file_name = stem.to_os_string();
        file_name.push(".png");
        Ok(self.config.output_dir.join(file_name))
    }

    fn report_outcome(&self, input_path: &Path, outcome: &Outcome) {
        if self.config.json_progress {
            match outcome {
                Outcome::Processed {
                    output_path,
                    width,
                    height,
                } => JsonMessage::file_processed(input_path, output_path, *width, *height),
                Outcome::Skipped(reason) => {
                    JsonMessage::file_skipped(input_path, reason.description())
                }
                Outcome::Failed(e) => JsonMessage::file_failed(input_path, format!("{:#}", e)),
            }
            return;
        }

        match outcome {
            Outcome::Processed { output_path, .. } => {
                detail_println(&format!("Successfully saved to {}", output_path.display()))
            }
            Outcome::Skipped(reason) => {
                detail_println(&format!("{}. Skipping", reason.description()))
            }
            Outcome::Failed(e) => error_println(&format!("{:#}. Skipping", e)),
        }
    }
}
