use serde::{Deserialize, Serialize};

/// Outcome of one subject's observation.
///
/// Clinical exports encode the outcome as `1` (event observed) or `0`
/// (censored). Parsing into this type is the only place an unknown code can
/// appear, so every downstream computation works with exactly two cases.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// The event of interest was observed at the recorded time.
    Event,
    /// Observation ended before the event occurred.
    Censored,
}

/// A status code that is neither the event nor the censored sentinel.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid event status {code:?} (expected \"1\" or \"0\")")]
pub struct InvalidStatusError {
    #[error(not(source))]
    pub code: String,
}

impl EventStatus {
    /// Parses the numeric status code used by clinical exports.
    ///
    /// Surrounding whitespace is ignored. Anything other than `1` or `0` is
    /// rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cohortsurv_stats::status::EventStatus;
    /// assert_eq!(EventStatus::from_code("1").unwrap(), EventStatus::Event);
    /// assert_eq!(EventStatus::from_code(" 0 ").unwrap(), EventStatus::Censored);
    /// assert!(EventStatus::from_code("2").is_err());
    /// ```
    pub fn from_code(code: &str) -> Result<Self, InvalidStatusError> {
        match code.trim() {
            "1" => Ok(Self::Event),
            "0" => Ok(Self::Censored),
            other => Err(InvalidStatusError {
                code: other.to_owned(),
            }),
        }
    }

    /// Returns the numeric code (`1` for an event, `0` for censoring).
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Event => 1,
            Self::Censored => 0,
        }
    }

    /// Failure count contributed by one record with this status.
    #[must_use]
    pub(crate) fn failures(self) -> usize {
        usize::from(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(EventStatus::Event.code(), 1);
        assert_eq!(EventStatus::Censored.code(), 0);
        assert_eq!(EventStatus::Event.failures(), 1);
        assert_eq!(EventStatus::Censored.failures(), 0);
    }

    #[test]
    fn test_rejects_unknown_codes() {
        for code in ["", "NA", "2", "-1", "yes", "1.0"] {
            let err = EventStatus::from_code(code).unwrap_err();
            assert_eq!(err.code, code);
        }
    }

    #[test]
    fn test_error_message_names_code() {
        let err = EventStatus::from_code("x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid event status \"x\" (expected \"1\" or \"0\")"
        );
    }
}
