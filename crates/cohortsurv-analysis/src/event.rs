//! Event definitions: which raw fields describe the time-to-event

use std::fmt;

use cohortsurv_stats::status::{EventStatus, InvalidStatusError};
use serde::{Deserialize, Serialize};

use crate::record::{RawCaseRecord, RawValue};

/// The event whose time is being measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventDefinition {
    /// Time until death.
    #[serde(rename = "os")]
    OverallSurvival,
    /// Time until recurrence or progression.
    #[serde(rename = "dfs")]
    DiseaseFree,
}

impl EventDefinition {
    pub const ALL: [Self; 2] = [Self::OverallSurvival, Self::DiseaseFree];

    /// Short identifier, used in file names.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::OverallSurvival => "os",
            Self::DiseaseFree => "dfs",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::OverallSurvival => "Overall Survival",
            Self::DiseaseFree => "Disease Free Survival",
        }
    }

    /// Label of the time axis in months.
    #[must_use]
    pub fn time_label(self) -> &'static str {
        match self {
            Self::OverallSurvival => "Months Survival",
            Self::DiseaseFree => "Months Disease Free",
        }
    }

    #[must_use]
    pub fn time_of(self, record: &RawCaseRecord) -> Option<&RawValue> {
        match self {
            Self::OverallSurvival => record.os_months.as_ref(),
            Self::DiseaseFree => record.dfs_months.as_ref(),
        }
    }

    #[must_use]
    pub fn status_of(self, record: &RawCaseRecord) -> Option<&RawValue> {
        match self {
            Self::OverallSurvival => record.os_status.as_ref(),
            Self::DiseaseFree => record.dfs_status.as_ref(),
        }
    }

    /// Parses a raw status for this event definition.
    ///
    /// Accepts the numeric codes `1`/`0` (as numbers or strings) and the clinical terms of
    /// the definition, case-insensitively:
    ///
    /// | definition | event                                     | censored                   |
    /// |------------|-------------------------------------------|----------------------------|
    /// | OS         | `DECEASED`                                | `LIVING`                   |
    /// | DFS        | `Recurred/Progressed`, `Recurred`, `Progressed` | `DiseaseFree`, `Disease Free` |
    pub fn parse_status(self, raw: Option<&RawValue>) -> Result<EventStatus, InvalidStatusError> {
        let text = match raw {
            None => String::new(),
            Some(RawValue::Number(code)) => code.to_string(),
            Some(RawValue::Text(text)) => text.trim().to_owned(),
        };
        if let Ok(status) = EventStatus::from_code(&text) {
            return Ok(status);
        }

        let (events, censored): (&[&str], &[&str]) = match self {
            Self::OverallSurvival => (&["DECEASED"][..], &["LIVING"][..]),
            Self::DiseaseFree => (
                &["Recurred/Progressed", "Recurred", "Progressed"][..],
                &["DiseaseFree", "Disease Free"][..],
            ),
        };
        let any_term = |terms: &[&str]| terms.iter().any(|t| t.eq_ignore_ascii_case(&text));
        if any_term(events) {
            Ok(EventStatus::Event)
        } else if any_term(censored) {
            Ok(EventStatus::Censored)
        } else {
            Err(InvalidStatusError { code: text })
        }
    }
}

impl fmt::Display for EventDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.name(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(event: EventDefinition, raw: &str) -> Result<EventStatus, InvalidStatusError> {
        event.parse_status(Some(&RawValue::from(raw)))
    }

    #[test]
    fn test_numeric_codes() {
        for event in EventDefinition::ALL {
            assert_eq!(parse(event, "1"), Ok(EventStatus::Event));
            assert_eq!(parse(event, "0"), Ok(EventStatus::Censored));
            assert_eq!(
                event.parse_status(Some(&RawValue::Number(1.0))),
                Ok(EventStatus::Event)
            );
            assert_eq!(
                event.parse_status(Some(&RawValue::Number(0.0))),
                Ok(EventStatus::Censored)
            );
        }
    }

    #[test]
    fn test_clinical_terms() {
        use EventDefinition::{DiseaseFree, OverallSurvival};

        assert_eq!(parse(OverallSurvival, "DECEASED"), Ok(EventStatus::Event));
        assert_eq!(parse(OverallSurvival, "living"), Ok(EventStatus::Censored));
        assert_eq!(
            parse(DiseaseFree, "Recurred/Progressed"),
            Ok(EventStatus::Event)
        );
        assert_eq!(parse(DiseaseFree, "progressed"), Ok(EventStatus::Event));
        assert_eq!(parse(DiseaseFree, "DiseaseFree"), Ok(EventStatus::Censored));
        assert_eq!(
            parse(DiseaseFree, " Disease Free "),
            Ok(EventStatus::Censored)
        );
    }

    #[test]
    fn test_terms_do_not_cross_definitions() {
        assert!(parse(EventDefinition::DiseaseFree, "DECEASED").is_err());
        assert!(parse(EventDefinition::OverallSurvival, "DiseaseFree").is_err());
    }

    #[test]
    fn test_invalid_status() {
        let err = parse(EventDefinition::OverallSurvival, "2").unwrap_err();
        assert_eq!(err.code, "2");
        let err = EventDefinition::OverallSurvival
            .parse_status(Some(&RawValue::Number(0.5)))
            .unwrap_err();
        assert_eq!(err.code, "0.5");
        let err = EventDefinition::DiseaseFree.parse_status(None).unwrap_err();
        assert_eq!(err.code, "");
    }

    #[test]
    fn test_fields() {
        let record = RawCaseRecord {
            case_id: None,
            os_months: Some(RawValue::from(1.0)),
            os_status: Some(RawValue::from("1")),
            dfs_months: Some(RawValue::from(2.0)),
            dfs_status: Some(RawValue::from("0")),
        };
        assert_eq!(
            EventDefinition::OverallSurvival.time_of(&record),
            Some(&RawValue::Number(1.0))
        );
        assert_eq!(
            EventDefinition::DiseaseFree.status_of(&record),
            Some(&RawValue::from("0"))
        );
    }
}
