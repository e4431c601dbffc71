//! Time-ordered cohorts with at-risk bookkeeping
//!
//! A [`Cohort`] is the input of both the Kaplan-Meier estimator and the
//! log-rank test. It can only be built through [`Cohort::from_observations`],
//! which sorts the observations and assigns at-risk counts, so every cohort
//! satisfies the ordering and at-risk invariants by construction.

use std::ops::Deref;

use serde::Serialize;

use crate::status::EventStatus;

/// One subject's observation within a cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseRecord {
    /// Identifier of the case this observation belongs to.
    pub case_id: String,
    /// Months until the event or until censoring.
    pub time: f64,
    /// Whether the event was observed at `time`.
    pub status: EventStatus,
    /// Number of subjects still under observation at this time, this one included.
    pub num_at_risk: usize,
}

/// A single (time, status) observation before it is placed in a cohort.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub case_id: String,
    pub time: f64,
    pub status: EventStatus,
}

/// A time value that cannot be placed on the time axis.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("invalid observation time {time} for case {case_id} (must be finite and non-negative)")]
pub struct InvalidTimeError {
    #[error(not(source))]
    pub case_id: String,
    pub time: f64,
}

/// Observations for one comparison group, ascending by time.
///
/// Ties in time keep their input order. The first record's `num_at_risk` is
/// the cohort size and each following record has one fewer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cohort {
    records: Vec<CaseRecord>,
}

impl Observation {
    pub fn new(case_id: impl Into<String>, time: f64, status: EventStatus) -> Self {
        Self {
            case_id: case_id.into(),
            time,
            status,
        }
    }
}

impl Cohort {
    /// Builds a cohort from observations in input order.
    ///
    /// Observations are stable-sorted by time, then numbered with a
    /// decreasing at-risk count ending at 1.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTimeError`] if any time is negative or not finite.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cohortsurv_stats::{cohort::{Cohort, Observation}, status::EventStatus};
    /// let cohort = Cohort::from_observations(vec![
    ///     Observation::new("b", 5.0, EventStatus::Censored),
    ///     Observation::new("a", 2.0, EventStatus::Event),
    /// ])
    /// .unwrap();
    /// assert_eq!(cohort[0].case_id, "a");
    /// assert_eq!(cohort[0].num_at_risk, 2);
    /// assert_eq!(cohort[1].num_at_risk, 1);
    /// ```
    pub fn from_observations<I>(observations: I) -> Result<Self, InvalidTimeError>
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut observations = observations.into_iter().collect::<Vec<_>>();
        if let Some(bad) = observations
            .iter()
            .find(|obs| !obs.time.is_finite() || obs.time < 0.0)
        {
            return Err(InvalidTimeError {
                case_id: bad.case_id.clone(),
                time: bad.time,
            });
        }

        // `total_cmp` orders -0.0 before 0.0, so fold it into 0.0 to keep them tied
        for obs in &mut observations {
            obs.time += 0.0;
        }
        // `sort_by` is stable, so ties stay in input order
        observations.sort_by(|a, b| a.time.total_cmp(&b.time));

        let total = observations.len();
        let records = observations
            .into_iter()
            .enumerate()
            .map(|(i, obs)| CaseRecord {
                case_id: obs.case_id,
                time: obs.time,
                status: obs.status,
                num_at_risk: total - i,
            })
            .collect();

        Ok(Self { records })
    }

    /// Convenience constructor for anonymous `(time, status)` pairs.
    ///
    /// Case identifiers are the zero-based input positions.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, InvalidTimeError>
    where
        I: IntoIterator<Item = (f64, EventStatus)>,
    {
        Self::from_observations(
            pairs
                .into_iter()
                .enumerate()
                .map(|(i, (time, status))| Observation::new(i.to_string(), time, status)),
        )
    }

    #[must_use]
    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    /// Number of observed events in the cohort.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status.is_event())
            .count()
    }

    /// Number of censored observations in the cohort.
    #[must_use]
    pub fn censored_count(&self) -> usize {
        self.records.len() - self.event_count()
    }
}

impl Deref for Cohort {
    type Target = [CaseRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::status::EventStatus::{Censored, Event};

    #[test]
    fn test_empty_cohort() {
        let cohort = Cohort::from_pairs(Vec::new()).unwrap();
        assert!(cohort.is_empty());
        assert_eq!(cohort.event_count(), 0);
        assert_eq!(cohort.censored_count(), 0);
    }

    #[test]
    fn test_sorted_with_decreasing_at_risk() {
        let cohort = Cohort::from_pairs([(3.0, Event), (1.0, Censored), (2.0, Event)]).unwrap();
        let times = cohort.iter().map(|r| r.time).collect::<Vec<_>>();
        let at_risk = cohort.iter().map(|r| r.num_at_risk).collect::<Vec<_>>();
        assert_eq!(times, [1.0, 2.0, 3.0]);
        assert_eq!(at_risk, [3, 2, 1]);
        assert_eq!(cohort.event_count(), 2);
        assert_eq!(cohort.censored_count(), 1);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let cohort = Cohort::from_observations([
            Observation::new("late", 9.0, Event),
            Observation::new("first", 4.0, Censored),
            Observation::new("second", 4.0, Event),
            Observation::new("third", 4.0, Censored),
        ])
        .unwrap();
        let ids = cohort.iter().map(|r| r.case_id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["first", "second", "third", "late"]);
    }

    #[test]
    fn test_rejects_negative_time() {
        let err = Cohort::from_observations([
            Observation::new("ok", 1.0, Event),
            Observation::new("bad", -0.5, Event),
        ])
        .unwrap_err();
        assert_eq!(err.case_id, "bad");
    }

    #[test]
    fn test_rejects_non_finite_time() {
        assert!(Cohort::from_pairs([(f64::NAN, Event)]).is_err());
        assert!(Cohort::from_pairs([(f64::INFINITY, Censored)]).is_err());
    }

    #[test]
    fn test_negative_zero_ties_with_zero() {
        let cohort = Cohort::from_observations([
            Observation::new("a1", 0.0, Event),
            Observation::new("a2", -0.0, Censored),
        ])
        .unwrap();
        let ids = cohort.iter().map(|r| r.case_id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["a1", "a2"]);
        assert!(cohort[1].time.is_sign_positive());
    }

    #[test]
    fn test_zero_time_is_valid() {
        let cohort = Cohort::from_pairs([(0.0, Event)]).unwrap();
        assert_eq!(cohort[0].num_at_risk, 1);
    }

    fn observations() -> impl Strategy<Value = Vec<(f64, EventStatus)>> {
        proptest::collection::vec(
            (0u32..50, any::<bool>()).prop_map(|(t, event)| {
                (f64::from(t) / 2.0, if event { Event } else { Censored })
            }),
            0..40,
        )
    }

    proptest! {
        #[test]
        fn proptest_at_risk_counts_down_to_one(pairs in observations()) {
            let cohort = Cohort::from_pairs(pairs.clone()).unwrap();
            let at_risk = cohort.iter().map(|r| r.num_at_risk).collect::<Vec<_>>();
            let expected = (1..=pairs.len()).rev().collect::<Vec<_>>();
            prop_assert_eq!(at_risk, expected);
            prop_assert!(cohort.windows(2).all(|w| w[0].time <= w[1].time));
        }

        #[test]
        fn proptest_rebuild_is_identical(pairs in observations()) {
            let first = Cohort::from_pairs(pairs.clone()).unwrap();
            let second = Cohort::from_pairs(pairs).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
