//! Check names, per-check results, and the sink the pipeline records into.

use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The fixed set of checks an attempt is judged on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    Liveness,
    Ocr,
    FaceMatch,
    LicenseApi,
    Alcohol,
}

impl CheckName {
    /// Every check, in execution order.
    pub const ALL: [CheckName; 5] = [
        CheckName::Liveness,
        CheckName::Ocr,
        CheckName::FaceMatch,
        CheckName::LicenseApi,
        CheckName::Alcohol,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liveness => "liveness",
            Self::Ocr => "ocr",
            Self::FaceMatch => "face_match",
            Self::LicenseApi => "license_api",
            Self::Alcohol => "alcohol",
        }
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| format!("unknown check name: {s}"))
    }
}

/// Outcome of one executed check. Never mutated once recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: CheckName,
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub timestamp: Timestamp,
}

impl CheckResult {
    /// A JSON `null` detail is stored as `None`, which is how it reads back
    /// from disk.
    pub fn new(name: CheckName, status: bool, details: Option<Value>, timestamp: Timestamp) -> Self {
        Self {
            name,
            status,
            details: details.filter(|d| !d.is_null()),
            timestamp,
        }
    }
}

/// Append-only sink for check results.
///
/// The pipeline writes through this trait so that whatever it managed to
/// record survives an aborted or interrupted run.
pub trait CheckRecorder {
    fn record(&mut self, name: CheckName, status: bool, details: Option<Value>);
}

impl CheckRecorder for Vec<CheckResult> {
    fn record(&mut self, name: CheckName, status: bool, details: Option<Value>) {
        self.push(CheckResult::new(name, status, details, Timestamp::now()));
    }
}
