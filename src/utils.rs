use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::cli::Args;

/// Extensions picked up by the directory scanner
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "bmp", "jpeg"];

/// Create a spinner for blocking steps with no measurable progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", mins, secs)
    } else if total_secs > 0 {
        format!("{}.{:03}s", total_secs, millis)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Validate command line arguments
pub fn validate_inputs(args: &Args) -> Result<()> {
    validate_input_dir(&args.input_dir)?;

    if !(-1..=3).contains(&args.noise_level()) {
        return Err(anyhow::anyhow!(
            "Noise level must be between -1 and 3, got: {}",
            args.noise_level()
        ));
    }

    Ok(())
}

/// The input path must exist and be a directory
pub fn validate_input_dir(input_dir: &Path) -> Result<()> {
    if !input_dir.exists() {
        return Err(anyhow::anyhow!(
            "\"{}\" does not exist",
            input_dir.display()
        ));
    }
    if !input_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "\"{}\" is not a directory",
            input_dir.display()
        ));
    }
    Ok(())
}

/// Create `dir` if needed and make sure we can write into it
pub fn ensure_writable_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let metadata = fs::metadata(dir)
        .with_context(|| format!("Failed to inspect {}", dir.display()))?;
    if !metadata.is_dir() {
        return Err(anyhow::anyhow!("{} is not a directory", dir.display()));
    }
    // Mode bits alone miss ownership and ACLs, so create and drop a real file
    tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("No permission to write in {}", dir.display()))?;
    Ok(())
}

/// Get file extension in lowercase
pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if a file has one of the supported image extensions
pub fn has_supported_extension(path: &Path) -> bool {
    match get_file_extension(path) {
        Some(ext) => SUPPORTED_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}

/// Print a regular progress line
pub fn info_println(message: &str) {
    println!("{} {}", style("[-]").blue().bold(), message);
}

/// Print an indented per-file detail line
pub fn detail_println(message: &str) {
    println!("        {}", message);
}

/// Print verbose message if verbose mode is enabled
pub fn verbose_println(verbose: bool, message: &str) {
    if verbose {
        println!("{} {}", style("[VERBOSE]").dim(), message);
    }
}

/// Print warning message
pub fn warn_println(message: &str) {
    println!("{} {}", style("[WARNING]").yellow().bold(), message);
}

/// Print error message
pub fn error_println(message: &str) {
    eprintln!("{} {}", style("[ERROR]").red().bold(), message);
}
