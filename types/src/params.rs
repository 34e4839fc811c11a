//! Gate parameters, the thresholds that turn raw collaborator readings into
//! pass/fail checks.

use serde::{Deserialize, Serialize};

/// Maximum face-embedding distance that still counts as the same person.
pub const FACE_MATCH_THRESHOLD: f64 = 0.6;

/// Raw ADC value at or above which alcohol is considered detected.
pub const ALCOHOL_THRESHOLD: u16 = 450;

/// Stabilization delay the gas sensor needs before its readings are trusted.
pub const SENSOR_WARMUP_SECS: u64 = 20;

/// Tunable thresholds shared by the collaborators and the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateParams {
    // ── Identity ─────────────────────────────────────────────────────────
    /// Face distance `<=` this value is a match.
    #[serde(default = "default_face_threshold")]
    pub face_match_threshold: f64,

    // ── Sobriety ─────────────────────────────────────────────────────────
    /// Raw sensor value `>=` this value means alcohol detected.
    #[serde(default = "default_alcohol_threshold")]
    pub alcohol_threshold: u16,

    /// Gas sensor stabilization delay in seconds.
    #[serde(default = "default_warmup_secs")]
    pub sensor_warmup_secs: u64,
}

fn default_face_threshold() -> f64 {
    FACE_MATCH_THRESHOLD
}

fn default_alcohol_threshold() -> u16 {
    ALCOHOL_THRESHOLD
}

fn default_warmup_secs() -> u64 {
    SENSOR_WARMUP_SECS
}

impl Default for GateParams {
    fn default() -> Self {
        Self {
            face_match_threshold: FACE_MATCH_THRESHOLD,
            alcohol_threshold: ALCOHOL_THRESHOLD,
            sensor_warmup_secs: SENSOR_WARMUP_SECS,
        }
    }
}
