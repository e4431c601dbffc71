//! Building the altered/unaltered cohorts of one event definition
//!
//! The builder walks the raw survival data in input order and routes every
//! usable case into the cohort of its group. A case is used when it has a
//! known time for the event definition and a recognized group label; other
//! cases are left out without error. Statuses are parsed only for cases that
//! are used, so a malformed status on an excluded case never fails a build.

use cohortsurv_stats::{
    cohort::{Cohort, InvalidTimeError, Observation},
    status::InvalidStatusError,
    survival::KaplanMeierCurve,
};
use serde::Serialize;

use crate::{
    event::EventDefinition,
    group::{CaseGroups, GroupLabel},
    record::{RawValue, SurvivalData},
};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum BuildError {
    #[display("invalid {event} status for case {case_id}: {source}")]
    InvalidStatus {
        #[error(not(source))]
        case_id: String,
        event: EventDefinition,
        source: InvalidStatusError,
    },
    #[display("invalid {event} time for case {case_id}: {value:?}")]
    InvalidTime {
        #[error(not(source))]
        case_id: String,
        event: EventDefinition,
        value: String,
    },
}

/// Cases that were left out of both cohorts, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Exclusions {
    /// Cases without a group label, or with a label other than `altered`/`unaltered`.
    pub unassigned: usize,
    /// Assigned cases whose time is unknown.
    pub missing_time: usize,
}

/// The two cohorts compared for one event definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortPair {
    pub event: EventDefinition,
    pub altered: Cohort,
    pub unaltered: Cohort,
    pub exclusions: Exclusions,
}

/// A [`CohortPair`] with the Kaplan-Meier curve of each cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimatedCohortPair {
    pub cohorts: CohortPair,
    pub altered_curve: KaplanMeierCurve,
    pub unaltered_curve: KaplanMeierCurve,
}

/// Builds cohorts for one event definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CohortBuilder {
    event: EventDefinition,
}

impl CohortBuilder {
    #[must_use]
    pub fn new(event: EventDefinition) -> Self {
        Self { event }
    }

    /// Splits the survival data into the altered and unaltered cohorts.
    ///
    /// Group labels are looked up by the key a case is stored under. The record's own
    /// `case_id`, when present, only names the case in its cohort.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidTime`] if a used case has a time that is not a
    /// non-negative number, and [`BuildError::InvalidStatus`] if its status is not
    /// recognized for the event definition.
    pub fn build(&self, data: &SurvivalData, groups: &CaseGroups) -> Result<CohortPair, BuildError> {
        let event = self.event;
        let mut altered = vec![];
        let mut unaltered = vec![];
        let mut exclusions = Exclusions::default();

        for (key, record) in data.iter() {
            let Some(group) = groups.group_of(key) else {
                log::debug!("{event}: case {key} has no recognized group, excluded");
                exclusions.unassigned += 1;
                continue;
            };
            let case_id = record.case_id.as_deref().unwrap_or(key);

            let time = event
                .time_of(record)
                .map(RawValue::as_time)
                .transpose()
                .map_err(|err| BuildError::InvalidTime {
                    case_id: case_id.to_owned(),
                    event,
                    value: err.value,
                })?
                .flatten();
            let Some(time) = time else {
                log::debug!("{event}: case {case_id} has no known time, excluded");
                exclusions.missing_time += 1;
                continue;
            };

            let status = event.parse_status(event.status_of(record)).map_err(|source| {
                BuildError::InvalidStatus {
                    case_id: case_id.to_owned(),
                    event,
                    source,
                }
            })?;

            let observation = Observation::new(case_id, time, status);
            match group {
                GroupLabel::Altered => altered.push(observation),
                GroupLabel::Unaltered => unaltered.push(observation),
            }
        }

        let to_build_error = |err: InvalidTimeError| BuildError::InvalidTime {
            case_id: err.case_id,
            event,
            value: err.time.to_string(),
        };
        let pair = CohortPair {
            event,
            altered: Cohort::from_observations(altered).map_err(to_build_error)?,
            unaltered: Cohort::from_observations(unaltered).map_err(to_build_error)?,
            exclusions,
        };
        log::debug!(
            "{event}: {} altered, {} unaltered, {} unassigned, {} without time",
            pair.altered.len(),
            pair.unaltered.len(),
            exclusions.unassigned,
            exclusions.missing_time,
        );
        Ok(pair)
    }
}

impl CohortPair {
    #[must_use]
    pub fn cohort(&self, group: GroupLabel) -> &Cohort {
        match group {
            GroupLabel::Altered => &self.altered,
            GroupLabel::Unaltered => &self.unaltered,
        }
    }

    /// Annotates both cohorts with their Kaplan-Meier estimates.
    #[must_use]
    pub fn estimate(self) -> EstimatedCohortPair {
        EstimatedCohortPair {
            altered_curve: KaplanMeierCurve::estimate(&self.altered),
            unaltered_curve: KaplanMeierCurve::estimate(&self.unaltered),
            cohorts: self,
        }
    }
}

impl EstimatedCohortPair {
    #[must_use]
    pub fn curve(&self, group: GroupLabel) -> &KaplanMeierCurve {
        match group {
            GroupLabel::Altered => &self.altered_curve,
            GroupLabel::Unaltered => &self.unaltered_curve,
        }
    }
}

/// Builds both cohorts of `event` and estimates their survival curves.
///
/// # Errors
///
/// See [`CohortBuilder::build`].
pub fn build_and_estimate(
    data: &SurvivalData,
    groups: &CaseGroups,
    event: EventDefinition,
) -> Result<EstimatedCohortPair, BuildError> {
    CohortBuilder::new(event)
        .build(data, groups)
        .map(CohortPair::estimate)
}
