//! Offline license validation.
//!
//! Stands in for the remote registry: a license is valid when every
//! required field is present and the expiry date has not passed.

use crate::collaborators::LicenseValidator;
use chrono::NaiveDate;
use driveguard_types::license::EXPIRY_DATE;
use driveguard_types::{Clock, CollaboratorError, LicenseFields};
use std::sync::Arc;

const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%d-%m-%Y"];

/// Parse a `dd/mm/yyyy` or `dd-mm-yyyy` date. Separators may not be mixed.
pub fn parse_document_date(raw: &str) -> Result<NaiveDate, CollaboratorError> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| CollaboratorError::FormatFailure(format!("invalid date {raw:?}")))
}

/// Validates extracted fields locally against the controller's clock.
pub struct LocalLicenseValidator {
    clock: Arc<dyn Clock>,
}

impl LocalLicenseValidator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl LicenseValidator for LocalLicenseValidator {
    fn verify(&self, fields: &LicenseFields) -> Result<bool, CollaboratorError> {
        let missing = fields.missing_required();
        if !missing.is_empty() {
            tracing::warn!(?missing, "license rejected: missing fields");
            return Ok(false);
        }

        let raw_expiry = fields.get(EXPIRY_DATE).unwrap_or_default();
        let expiry = parse_document_date(raw_expiry)?;
        let today = self.clock.now().local_date();

        if expiry < today {
            tracing::warn!(%expiry, %today, "license rejected: expired");
            return Ok(false);
        }

        tracing::debug!(%expiry, "license accepted");
        Ok(true)
    }
}
