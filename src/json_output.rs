//! JSON output for scripting
//!
//! When --json-progress flag is enabled, per-file results and the final summary
//! are emitted as JSON lines to stdout, replacing the console output.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Image resized and written
    FileProcessed {
        input_path: String,
        output_path: String,
        width: u32,
        height: u32,
    },
    /// Image left untouched
    FileSkipped { input_path: String, reason: String },
    /// Image could not be processed
    FileFailed { input_path: String, error: String },
    /// Non-fatal problem with the run itself
    Warning { message: String },
    /// Run summary
    Summary {
        processed: usize,
        skipped: usize,
        errors: usize,
        interrupted: bool,
        duration_secs: f64,
    },
}

impl JsonMessage {
    /// Emit JSON message to stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn file_processed(input_path: &Path, output_path: &Path, width: u32, height: u32) {
        Self::FileProcessed {
            input_path: input_path.display().to_string(),
            output_path: output_path.display().to_string(),
            width,
            height,
        }
        .emit();
    }

    pub fn file_skipped(input_path: &Path, reason: impl Into<String>) {
        Self::FileSkipped {
            input_path: input_path.display().to_string(),
            reason: reason.into(),
        }
        .emit();
    }

    pub fn file_failed(input_path: &Path, error: impl Into<String>) {
        Self::FileFailed {
            input_path: input_path.display().to_string(),
            error: error.into(),
        }
        .emit();
    }

    pub fn warning(message: impl Into<String>) {
        Self::Warning {
            message: message.into(),
        }
        .emit();
    }

    pub fn summary(
        processed: usize,
        skipped: usize,
        errors: usize,
        interrupted: bool,
        duration_secs: f64,
    ) {
        Self::Summary {
            processed,
            skipped,
            errors,
            interrupted,
            duration_secs,
        }
        .emit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_tagged() {
        let msg = JsonMessage::FileSkipped {
            input_path: "in/a.png".to_string(),
            reason: "already feasible".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"file_skipped""#));
        assert!(json.contains(r#""reason":"already feasible""#));
    }

    #[test]
    fn test_summary_parses_back() {
        let json = r#"{"type":"summary","processed":1,"skipped":2,"errors":0,"interrupted":false,"duration_secs":0.5}"#;
        let msg: JsonMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            JsonMessage::Summary {
                processed: 1,
                skipped: 2,
                errors: 0,
                interrupted: false,
                duration_secs: 0.5,
            }
        );
    }
}
