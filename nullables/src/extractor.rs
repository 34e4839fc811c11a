//! Nullable document extractor: returns scripted fields.

use driveguard_types::{CollaboratorError, LicenseFields};
use driveguard_verification::DocumentExtractor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns a fixed extraction result and writes a fake raw-text dump.
pub struct NullExtractor {
    result: Result<Option<LicenseFields>, CollaboratorError>,
    calls: AtomicUsize,
}

impl NullExtractor {
    pub fn returning(fields: LicenseFields) -> Self {
        Self::with_result(Ok(Some(fields)))
    }

    /// Nothing legible on the document.
    pub fn unreadable() -> Self {
        Self::with_result(Ok(None))
    }

    pub fn with_result(result: Result<Option<LicenseFields>, CollaboratorError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentExtractor for NullExtractor {
    fn extract(
        &self,
        _image: &Path,
        doc_label: &str,
        raw_text_out: &Path,
    ) -> Result<Option<LicenseFields>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fields = self.result.clone()?;
        if let Some(fields) = &fields {
            let mut raw = format!("{doc_label}\n");
            for name in fields.names() {
                raw.push_str(&format!("{name}: {}\n", fields.get(name).unwrap_or_default()));
            }
            std::fs::write(raw_text_out, raw)
                .map_err(|e| CollaboratorError::HardwareFault(e.to_string()))?;
        }
        Ok(fields)
    }
}
