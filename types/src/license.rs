//! Fields extracted from a driving-license image.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const LICENSE_NUMBER: &str = "LicenseNumber";
pub const NAME: &str = "Name";
pub const DOB: &str = "DOB";
pub const ISSUED_DATE: &str = "IssuedDate";
pub const EXPIRY_DATE: &str = "ExpiryDate";

/// Fields a validator needs before it will even look at a license.
pub const REQUIRED_FIELDS: [&str; 4] = [LICENSE_NUMBER, NAME, DOB, EXPIRY_DATE];

/// Named text fields read off a document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseFields(BTreeMap<String, String>);

impl LicenseFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Field names present, in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// Required fields that are absent.
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|f| !self.0.contains_key(*f))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LicenseFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
