use crate::engines::{FaceComparison, FaceVerifier};
use crate::utils::FaceError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Deserialize)]
struct FaceCommandOutput {
    #[serde(default)]
    verified: bool,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    threshold: f64,
    #[serde(default)]
    error: Option<String>,
}

/// Face-similarity collaborator backed by an external command. The command
/// is invoked as `<program> <document-image> <selfie-image>` and must print a
/// JSON object with `verified`, `distance` and `threshold` fields, or an
/// `error` field on failure.
pub struct CommandFaceVerifier {
    program: PathBuf,
}

impl CommandFaceVerifier {
    pub fn new(program: PathBuf) -> Self {
        CommandFaceVerifier { program }
    }
}

impl FaceVerifier for CommandFaceVerifier {
    fn compare(&self, document: &Path, selfie: &Path) -> Result<FaceComparison, FaceError> {
        log::info!(
            "Comparing faces: {} vs {}",
            document.display(),
            selfie.display()
        );

        let output = Command::new(&self.program)
            .arg(document)
            .arg(selfie)
            .output()
            .map_err(|e| FaceError::Engine(format!("Failed to run face command: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FaceError::Engine(format!(
                "Face command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let parsed: FaceCommandOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| FaceError::Engine(format!("Unparseable face command output: {}", e)))?;

        if let Some(message) = parsed.error {
            let lowered = message.to_lowercase();
            if lowered.contains("face") && lowered.contains("detect") {
                return Err(FaceError::NoFaceDetected(message));
            }
            return Err(FaceError::Engine(message));
        }

        Ok(FaceComparison {
            verified: parsed.verified,
            distance: parsed.distance,
            threshold: parsed.threshold,
        })
    }
}
