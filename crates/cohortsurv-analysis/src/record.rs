//! Raw per-case survival records
//!
//! This module provides data structures for the clinical survival data that
//! cohorts are built from, as exported by the data loader.
//!
//! # Data Structure
//!
//! ```text
//! SurvivalData
//! └─ cases: Vec<(case_id, RawCaseRecord)>   (document order)
//!     ├─ case_id            (optional, defaults to the key)
//!     ├─ os_months / os_status
//!     └─ dfs_months / dfs_status
//! ```
//!
//! # Missing Values
//!
//! Each field may be a number, a string, `null` or absent. The strings `"NA"`
//! and `""` mean the value is unknown. A case may also map to an empty string
//! instead of a record, in which case it is skipped entirely.
//!
//! # Serialization
//!
//! ```json
//! {
//!   "TCGA-01": {
//!     "case_id": "TCGA-01",
//!     "os_months": "23.5",
//!     "os_status": "DECEASED",
//!     "dfs_months": "NA",
//!     "dfs_status": ""
//!   },
//!   "TCGA-02": ""
//! }
//! ```
//!
//! The order of the JSON object is kept: it is the input order that breaks
//! ties between equal times when cohorts are sorted.

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, MapAccess, Visitor},
};

/// A single raw field value as found in the export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

/// A time field that is present but cannot be read as a number.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unparseable time value {value:?}")]
pub struct UnparseableTimeError {
    #[error(not(source))]
    pub value: String,
}

/// One case's survival fields for both event definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCaseRecord {
    pub case_id: Option<String>,
    pub os_months: Option<RawValue>,
    pub os_status: Option<RawValue>,
    pub dfs_months: Option<RawValue>,
    pub dfs_status: Option<RawValue>,
}

/// Survival records of all cases, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurvivalData {
    cases: Vec<(String, RawCaseRecord)>,
}

impl RawValue {
    /// Returns `true` for the markers of an unknown value.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(text) => {
                let text = text.trim();
                text.is_empty() || text.eq_ignore_ascii_case("NA")
            }
        }
    }

    /// Reads the value as a time in months.
    ///
    /// Returns `Ok(None)` for missing markers. Range checks happen when the
    /// observation is placed in a cohort.
    pub fn as_time(&self) -> Result<Option<f64>, UnparseableTimeError> {
        if self.is_missing() {
            return Ok(None);
        }
        match self {
            Self::Number(time) => Ok(Some(*time)),
            Self::Text(text) => {
                text.trim()
                    .parse()
                    .map(Some)
                    .map_err(|_| UnparseableTimeError {
                        value: text.clone(),
                    })
            }
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl RawCaseRecord {
    /// Record with overall survival fields only.
    pub fn overall(months: impl Into<RawValue>, status: impl Into<RawValue>) -> Self {
        Self {
            os_months: Some(months.into()),
            os_status: Some(status.into()),
            ..Self::default()
        }
    }

    /// Record with disease-free survival fields only.
    pub fn disease_free(months: impl Into<RawValue>, status: impl Into<RawValue>) -> Self {
        Self {
            dfs_months: Some(months.into()),
            dfs_status: Some(status.into()),
            ..Self::default()
        }
    }
}

impl SurvivalData {
    /// Iterates over `(key, record)` pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawCaseRecord)> {
        self.cases.iter().map(|(key, record)| (key.as_str(), record))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl<K> FromIterator<(K, RawCaseRecord)> for SurvivalData
where
    K: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, RawCaseRecord)>>(iter: T) -> Self {
        Self {
            cases: iter
                .into_iter()
                .map(|(key, record)| (key.into(), record))
                .collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CaseEntry {
    Record(RawCaseRecord),
    Blank(String),
}

impl<'de> Deserialize<'de> for SurvivalData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CasesVisitor;

        impl<'de> Visitor<'de> for CasesVisitor {
            type Value = SurvivalData;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from case id to survival record")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut cases = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, entry)) = map.next_entry::<String, CaseEntry>()? {
                    match entry {
                        CaseEntry::Record(record) => cases.push((key, record)),
                        CaseEntry::Blank(text) if text.trim().is_empty() => {
                            log::debug!("case {key} has no survival record, skipped");
                        }
                        CaseEntry::Blank(text) => {
                            return Err(de::Error::custom(format!(
                                "invalid survival record for case {key}: {text:?}"
                            )));
                        }
                    }
                }
                Ok(SurvivalData { cases })
            }
        }

        deserializer.deserialize_map(CasesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_markers() {
        assert!(RawValue::from("NA").is_missing());
        assert!(RawValue::from("na").is_missing());
        assert!(RawValue::from("").is_missing());
        assert!(RawValue::from("  ").is_missing());
        assert!(!RawValue::from("0").is_missing());
        assert!(!RawValue::from(0.0).is_missing());
    }

    #[test]
    fn test_as_time() {
        assert_eq!(RawValue::from("12.5").as_time(), Ok(Some(12.5)));
        assert_eq!(RawValue::from(" 3 ").as_time(), Ok(Some(3.0)));
        assert_eq!(RawValue::from(7.0).as_time(), Ok(Some(7.0)));
        assert_eq!(RawValue::from("NA").as_time(), Ok(None));
        assert_eq!(
            RawValue::from("soon").as_time(),
            Err(UnparseableTimeError {
                value: "soon".to_owned()
            })
        );
    }

    #[test]
    fn test_deserialize_keeps_document_order() {
        let json = r#"{
            "z-case": { "case_id": "z-case", "os_months": 3, "os_status": "1" },
            "a-case": { "os_months": "NA", "os_status": "0" },
            "m-case": { "dfs_months": "4.5", "dfs_status": "Recurred/Progressed" }
        }"#;
        let data: SurvivalData = serde_json::from_str(json).unwrap();
        let keys = data.iter().map(|(key, _)| key).collect::<Vec<_>>();
        assert_eq!(keys, ["z-case", "a-case", "m-case"]);

        let (_, first) = data.iter().next().unwrap();
        assert_eq!(first.case_id.as_deref(), Some("z-case"));
        assert_eq!(first.os_months, Some(RawValue::Number(3.0)));
        assert_eq!(first.dfs_months, None);
    }

    #[test]
    fn test_deserialize_skips_blank_entries() {
        let json = r#"{ "a": "", "b": { "os_months": null, "os_status": "1" } }"#;
        let data: SurvivalData = serde_json::from_str(json).unwrap();
        assert_eq!(data.len(), 1);
        let (key, record) = data.iter().next().unwrap();
        assert_eq!(key, "b");
        assert_eq!(record.os_months, None);
    }

    #[test]
    fn test_deserialize_rejects_non_blank_strings() {
        let json = r#"{ "a": "garbage" }"#;
        assert!(serde_json::from_str::<SurvivalData>(json).is_err());
    }

    #[test]
    fn test_from_iterator() {
        let data = [
            ("x", RawCaseRecord::overall(1.0, "1")),
            ("y", RawCaseRecord::disease_free("NA", "0")),
        ]
        .into_iter()
        .collect::<SurvivalData>();
        assert_eq!(data.len(), 2);
        assert!(!data.is_empty());
    }
}
