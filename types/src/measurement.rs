//! Readings returned by the matcher and the gas sensor.

use serde::{Deserialize, Serialize};

/// Result of comparing the document face with the live face.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceMatch {
    pub matched: bool,
    /// Embedding distance; `None` when no usable face was found in one of
    /// the images.
    pub distance: Option<f64>,
}

impl FaceMatch {
    /// Classify a distance against a threshold (`distance <= threshold`
    /// matches). The stored distance is rounded to four decimals.
    pub fn from_distance(distance: f64, threshold: f64) -> Self {
        Self {
            matched: distance <= threshold,
            distance: Some((distance * 10_000.0).round() / 10_000.0),
        }
    }

    pub fn no_face() -> Self {
        Self {
            matched: false,
            distance: None,
        }
    }
}

/// One gas-sensor sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorReading {
    pub detected: bool,
    pub raw_value: u16,
}

impl SensorReading {
    /// Classify a raw ADC value (`raw >= threshold` is detected).
    pub fn from_raw(raw_value: u16, threshold: u16) -> Self {
        Self {
            detected: raw_value >= threshold,
            raw_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ALCOHOL_THRESHOLD, FACE_MATCH_THRESHOLD};

    #[test]
    fn face_threshold_is_inclusive() {
        assert!(FaceMatch::from_distance(0.3, FACE_MATCH_THRESHOLD).matched);
        assert!(FaceMatch::from_distance(0.6, FACE_MATCH_THRESHOLD).matched);
        assert!(!FaceMatch::from_distance(0.61, FACE_MATCH_THRESHOLD).matched);
    }

    #[test]
    fn face_distance_rounded() {
        let m = FaceMatch::from_distance(0.123456, FACE_MATCH_THRESHOLD);
        assert_eq!(m.distance, Some(0.1235));
    }

    #[test]
    fn alcohol_threshold_is_inclusive() {
        assert!(!SensorReading::from_raw(300, ALCOHOL_THRESHOLD).detected);
        assert!(!SensorReading::from_raw(449, ALCOHOL_THRESHOLD).detected);
        assert!(SensorReading::from_raw(450, ALCOHOL_THRESHOLD).detected);
        assert!(SensorReading::from_raw(500, ALCOHOL_THRESHOLD).detected);
    }
}
