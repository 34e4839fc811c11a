//! Nullable camera: writes placeholder stills instead of capturing.

use driveguard_types::CollaboratorError;
use driveguard_verification::ImageCapture;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const PLACEHOLDER: &[u8] = b"driveguard-null-still";

/// A camera that "captures" by writing a small placeholder file.
pub struct NullCamera {
    captured: Mutex<Vec<PathBuf>>,
    fault: Option<String>,
}

impl NullCamera {
    pub fn new() -> Self {
        Self {
            captured: Mutex::new(Vec::new()),
            fault: None,
        }
    }

    /// A camera whose every capture is a hardware fault.
    pub fn faulty(reason: impl Into<String>) -> Self {
        Self {
            captured: Mutex::new(Vec::new()),
            fault: Some(reason.into()),
        }
    }

    /// Paths captured so far, in order.
    pub fn captured(&self) -> Vec<PathBuf> {
        self.captured.lock().unwrap().clone()
    }
}

impl Default for NullCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCapture for NullCamera {
    fn capture_stable(&self, target: &Path) -> Result<PathBuf, CollaboratorError> {
        if let Some(reason) = &self.fault {
            return Err(CollaboratorError::HardwareFault(reason.clone()));
        }
        std::fs::write(target, PLACEHOLDER)
            .map_err(|e| CollaboratorError::HardwareFault(e.to_string()))?;
        self.captured.lock().unwrap().push(target.to_path_buf());
        Ok(target.to_path_buf())
    }
}
