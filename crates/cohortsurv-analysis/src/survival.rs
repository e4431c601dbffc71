//! Two-cohort survival comparison reports
//!
//! This module runs the whole comparison for each requested event definition:
//! build the altered and unaltered cohorts, estimate their Kaplan-Meier
//! curves, and compare them with the log-rank test.
//!
//! # Overview
//!
//! Cases are split by whether they carry an alteration in the queried gene
//! set. For each event definition the report holds:
//!
//! - **Cohort summaries**: case and event counts, censoring rate, KM median
//! - **Survival curves**: one Kaplan-Meier curve per cohort
//! - **Log-rank outcome**: the chi-square statistic, or why it is undefined
//!
//! An undefined statistic (for example when one cohort is empty) is part of
//! the report rather than an error, so the other event definition is still
//! analyzed.
//!
//! # Examples
//!
//! ```
//! use cohortsurv_analysis::{
//!     config::AnalysisConfig,
//!     group::CaseGroups,
//!     record::{RawCaseRecord, SurvivalData},
//!     survival::SurvivalAnalysis,
//! };
//!
//! let data = [
//!     ("a", RawCaseRecord::overall(1.0, "1")),
//!     ("b", RawCaseRecord::overall(2.0, "1")),
//!     ("c", RawCaseRecord::overall(3.0, "0")),
//! ]
//! .into_iter()
//! .collect::<SurvivalData>();
//! let groups = [("a", "altered"), ("b", "unaltered"), ("c", "unaltered")]
//!     .into_iter()
//!     .collect::<CaseGroups>();
//!
//! let report = SurvivalAnalysis::run(&data, &groups, &AnalysisConfig::default()).unwrap();
//! for comparison in &report.comparisons {
//!     match comparison.log_rank.chi_square() {
//!         Some(chi_square) => println!("{}: chi-square {chi_square:.3}", comparison.event),
//!         None => println!("{}: not comparable", comparison.event),
//!     }
//! }
//! ```

use cohortsurv_stats::{
    log_rank::{ChiSquarePValue, LogRankError, LogRankTest, TailPolicy},
    survival::KaplanMeierCurve,
};
use serde::{Serialize, Serializer};

use crate::{
    builder::{BuildError, CohortBuilder, EstimatedCohortPair, Exclusions},
    config::AnalysisConfig,
    event::EventDefinition,
    group::{CaseGroups, GroupLabel},
    record::SurvivalData,
};

/// Survival statistics of one cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortSummary {
    pub group: GroupLabel,
    /// Number of cases labelled with the group, with or without survival data
    pub assigned: usize,
    /// Number of cases in the cohort
    pub cases: usize,
    /// Number of observed events
    pub events: usize,
    /// Number of censored cases
    pub censored_count: usize,
    /// Kaplan-Meier median survival in months
    pub median_km: Option<f64>,
    /// Kaplan-Meier survival curve
    pub km_curve: KaplanMeierCurve,
}

/// Result of the log-rank comparison, kept in the report even when undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LogRankOutcome {
    Computed(LogRankTest),
    Undefined {
        #[serde(serialize_with = "serialize_display")]
        reason: LogRankError,
    },
}

/// Comparison of the altered and unaltered cohorts for one event definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub event: EventDefinition,
    pub tail_policy: TailPolicy,
    pub exclusions: Exclusions,
    pub altered: CohortSummary,
    pub unaltered: CohortSummary,
    pub log_rank: LogRankOutcome,
}

/// Comparisons for every configured event definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurvivalReport {
    /// Number of cases in the survival data
    pub total_cases: usize,
    pub comparisons: Vec<ComparisonReport>,
}

/// Failure to turn a chi-square statistic into a p-value.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PValueError {
    #[display("p-value provider failed: {_0}")]
    Provider(#[error(not(source))] Box<dyn std::error::Error + Send + Sync>),
    #[display("p-value provider returned {value}, outside [0, 1]")]
    OutOfRange { value: f64 },
}

pub struct SurvivalAnalysis;

impl CohortSummary {
    #[must_use]
    pub fn from_curve(group: GroupLabel, assigned: usize, km_curve: KaplanMeierCurve) -> Self {
        Self {
            group,
            assigned,
            cases: km_curve.len(),
            events: km_curve.event_count(),
            censored_count: km_curve.censored_count(),
            median_km: km_curve.median_survival(),
            km_curve,
        }
    }

    /// Censoring rate as percentage, `None` for an empty cohort
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn censoring_rate(&self) -> Option<f64> {
        (self.cases > 0).then(|| 100.0 * self.censored_count as f64 / self.cases as f64)
    }
}

impl LogRankOutcome {
    #[must_use]
    pub fn chi_square(&self) -> Option<f64> {
        self.test().map(|test| test.chi_square)
    }

    #[must_use]
    pub fn test(&self) -> Option<&LogRankTest> {
        match self {
            Self::Computed(test) => Some(test),
            Self::Undefined { .. } => None,
        }
    }
}

impl From<Result<LogRankTest, LogRankError>> for LogRankOutcome {
    fn from(result: Result<LogRankTest, LogRankError>) -> Self {
        match result {
            Ok(test) => Self::Computed(test),
            Err(reason) => Self::Undefined { reason },
        }
    }
}

impl ComparisonReport {
    /// Compares the two estimated cohorts of an event definition.
    ///
    /// `groups` is the assignment the pair was built from.
    #[must_use]
    pub fn from_pair(
        pair: EstimatedCohortPair,
        groups: &CaseGroups,
        tail_policy: TailPolicy,
    ) -> Self {
        let EstimatedCohortPair {
            cohorts,
            altered_curve,
            unaltered_curve,
        } = pair;
        let log_rank = LogRankOutcome::from(LogRankTest::compute(
            &cohorts.altered,
            &cohorts.unaltered,
            tail_policy,
        ));
        if let LogRankOutcome::Undefined { reason } = &log_rank {
            log::warn!("{}: {reason}", cohorts.event);
        }

        Self {
            event: cohorts.event,
            tail_policy,
            exclusions: cohorts.exclusions,
            altered: CohortSummary::from_curve(
                GroupLabel::Altered,
                groups.count(GroupLabel::Altered),
                altered_curve,
            ),
            unaltered: CohortSummary::from_curve(
                GroupLabel::Unaltered,
                groups.count(GroupLabel::Unaltered),
                unaltered_curve,
            ),
            log_rank,
        }
    }

    #[must_use]
    pub fn summary(&self, group: GroupLabel) -> &CohortSummary {
        match group {
            GroupLabel::Altered => &self.altered,
            GroupLabel::Unaltered => &self.unaltered,
        }
    }

    /// Looks up the p-value of the log-rank statistic.
    ///
    /// Returns `Ok(None)` without consulting `provider` when the statistic is undefined.
    ///
    /// # Errors
    ///
    /// Returns [`PValueError::Provider`] if the provider fails, and
    /// [`PValueError::OutOfRange`] if it returns something that is not a probability.
    pub fn p_value<P>(&self, provider: &P) -> Result<Option<f64>, PValueError>
    where
        P: ChiSquarePValue + ?Sized,
        P::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let Some(test) = self.log_rank.test() else {
            return Ok(None);
        };
        let value = test
            .p_value(provider)
            .map_err(|err| PValueError::Provider(err.into()))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(PValueError::OutOfRange { value });
        }
        Ok(Some(value))
    }
}

impl SurvivalAnalysis {
    /// Runs the comparison for every event definition in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if a case that belongs in a cohort has an invalid time or
    /// status. Undefined log-rank statistics are reported in the result instead.
    pub fn run(
        data: &SurvivalData,
        groups: &CaseGroups,
        config: &AnalysisConfig,
    ) -> Result<SurvivalReport, BuildError> {
        log::info!(
            "Analyzing {} cases ({} with group labels)",
            data.len(),
            groups.len()
        );
        let comparisons = config
            .events
            .iter()
            .map(|&event| {
                log::info!("Building {event} cohorts...");
                let pair = CohortBuilder::new(event).build(data, groups)?.estimate();
                Ok(ComparisonReport::from_pair(pair, groups, config.tail_policy))
            })
            .collect::<Result<Vec<_>, BuildError>>()?;

        Ok(SurvivalReport {
            total_cases: data.len(),
            comparisons,
        })
    }
}

fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: std::fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
