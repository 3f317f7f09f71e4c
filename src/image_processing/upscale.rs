use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Fixed enlargement requested from the upscaler
pub const UPSCALE_FACTOR: u32 = 2;

/// waifu2x denoise level used unless configured otherwise
pub const DEFAULT_NOISE_LEVEL: i32 = 2;

/// Directory created under the input directory for upscaled copies
pub const WAIFU2X_TMP_DIR: &str = "_waifu2x_tmp";

#[cfg(windows)]
pub const DEFAULT_WAIFU2X_BIN: &str =
    "waifu2x-ncnn-vulkan-20210521-windows\\waifu2x-ncnn-vulkan.exe";
#[cfg(not(windows))]
pub const DEFAULT_WAIFU2X_BIN: &str = "waifu2x-ncnn-vulkan";

/// Upscales every image of `input_dir` into `output_dir`
pub trait Upscaler {
    fn upscale(&self, input_dir: &Path, output_dir: &Path, scale: u32) -> Result<()>;
}

/// waifu2x-ncnn-vulkan invoked as a child process
pub struct Waifu2x {
    binary: PathBuf,
    noise_level: i32,
}

impl Waifu2x {
    pub fn new(binary: PathBuf, noise_level: i32) -> Self {
        Self {
            binary,
            noise_level,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Build the command line: input dir, output dir, denoise level, scale, TTA on
    pub fn command(&self, input_dir: &Path, output_dir: &Path, scale: u32) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-i")
            .arg(absolute_or_same(input_dir))
            .arg("-o")
            .arg(absolute_or_same(output_dir))
            .arg("-n")
            .arg(self.noise_level.to_string())
            .arg("-s")
            .arg(scale.to_string())
            .arg("-x");
        cmd
    }
}

impl Upscaler for Waifu2x {
    fn upscale(&self, input_dir: &Path, output_dir: &Path, scale: u32) -> Result<()> {
        let output = self
            .command(input_dir, output_dir, scale)
            .output()
            .with_context(|| format!("Failed to run {}", self.binary.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow::anyhow!(
                "waifu2x failed ({}): {}",
                output.status,
                stderr.trim()
            ));
        }

        Ok(())
    }
}

fn absolute_or_same(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_command_line() {
        let waifu2x = Waifu2x::new(PathBuf::from("/opt/waifu2x/waifu2x-ncnn-vulkan"), 2);
        let cmd = waifu2x.command(Path::new("/data/in"), Path::new("/data/in/_waifu2x_tmp"), 2);

        assert_eq!(cmd.get_program(), OsStr::new("/opt/waifu2x/waifu2x-ncnn-vulkan"));
        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(
            args,
            vec![
                OsStr::new("-i"),
                OsStr::new("/data/in"),
                OsStr::new("-o"),
                OsStr::new("/data/in/_waifu2x_tmp"),
                OsStr::new("-n"),
                OsStr::new("2"),
                OsStr::new("-s"),
                OsStr::new("2"),
                OsStr::new("-x"),
            ]
        );
    }

    #[test]
    fn test_relative_dirs_are_made_absolute() {
        let waifu2x = Waifu2x::new(PathBuf::from(DEFAULT_WAIFU2X_BIN), DEFAULT_NOISE_LEVEL);
        let cmd = waifu2x.command(Path::new("stickers"), Path::new("stickers/tmp"), UPSCALE_FACTOR);
        let input = cmd.get_args().nth(1).unwrap();
        assert!(Path::new(input).is_absolute());
    }

    #[test]
    fn test_missing_binary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let waifu2x = Waifu2x::new(dir.path().join("no-such-waifu2x"), DEFAULT_NOISE_LEVEL);
        let err = waifu2x
            .upscale(dir.path(), &dir.path().join("out"), UPSCALE_FACTOR)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to run"));
    }
}
