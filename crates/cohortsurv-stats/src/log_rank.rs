//! Log-rank test comparing the survival experience of two cohorts
//!
//! The test walks both cohorts in time order, collecting one
//! [`MergedTimePoint`] per time at which at least one event was observed.
//! At each point the failures expected in cohort 1 under the null hypothesis
//! of equal hazards are proportional to its share of the risk set, with a
//! hypergeometric variance. The summed observed-minus-expected failures and
//! variances yield a chi-square statistic with one degree of freedom:
//!
//! ```text
//! chi_square = (O1 - E1)^2 / V
//! ```
//!
//! Converting the statistic into a p-value is left to the caller (see
//! [`ChiSquarePValue`]).
//!
//! # Example
//!
//! ```
//! use cohortsurv_stats::{cohort::Cohort, log_rank, status::EventStatus::{Censored, Event}};
//!
//! let a = Cohort::from_pairs([(1.0, Event), (2.0, Censored), (3.0, Event)]).unwrap();
//! let b = Cohort::from_pairs([(1.0, Event), (2.0, Event)]).unwrap();
//! let chi_square = log_rank::log_rank_statistic(&a, &b).unwrap();
//! assert!((chi_square - 169.0 / 131.0).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

use crate::cohort::{CaseRecord, Cohort};

/// Degrees of freedom of the two-cohort log-rank statistic.
pub const DEGREES_OF_FREEDOM: u32 = 1;

/// How the merge treats the unmatched tail once one cohort is exhausted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailPolicy {
    /// Stop as soon as either cohort runs out of records.
    #[default]
    Truncate,
    /// Keep scanning the remaining cohort, with nobody at risk on the exhausted side.
    Extend,
}

/// One distinct event time in the union of both cohorts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedTimePoint {
    pub time: f64,
    pub num_of_failure_1: usize,
    pub num_of_failure_2: usize,
    pub num_at_risk_1: usize,
    pub num_at_risk_2: usize,
    /// Failures expected in cohort 1 under equal hazards.
    pub expectation: f64,
    /// Hypergeometric variance of cohort 1 failures, `None` when the risk set has one subject.
    pub variance: Option<f64>,
}

/// Outcome of a log-rank comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRankTest {
    /// Observed failures in cohort 1 (`O1`).
    pub observed: f64,
    /// Expected failures in cohort 1 (`E1`).
    pub expected: f64,
    /// Summed variance (`V`).
    pub variance: f64,
    /// `(O1 - E1)^2 / V`
    pub chi_square: f64,
    /// Merged event times, including excluded ones.
    pub merged_points: Vec<MergedTimePoint>,
    /// Number of merged points left out of the sums because their variance is undefined.
    pub excluded_points: usize,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum LogRankError {
    /// A merged point's risk set has a single subject, so `n - 1 = 0`.
    #[display("variance undefined at time {time}: only one subject at risk")]
    DegenerateVariance { time: f64 },
    /// The summed variance is zero, so the chi-square statistic is undefined.
    #[display(
        "log-rank statistic undefined: total variance is zero ({merged_points} comparable event times)"
    )]
    ZeroTotalVariance { merged_points: usize },
}

/// Converts a chi-square statistic with one degree of freedom into a p-value.
///
/// The statistics crate does not evaluate the chi-square distribution itself; callers plug
/// in whatever service or library they trust. Any `Fn(f64) -> Result<f64, E>` works.
pub trait ChiSquarePValue {
    type Error;

    fn p_value(&self, chi_square: f64) -> Result<f64, Self::Error>;
}

impl<F, E> ChiSquarePValue for F
where
    F: Fn(f64) -> Result<f64, E>,
{
    type Error = E;

    fn p_value(&self, chi_square: f64) -> Result<f64, E> {
        self(chi_square)
    }
}

impl MergedTimePoint {
    #[expect(clippy::cast_precision_loss)]
    fn new(time: f64, failures: (usize, usize), at_risk: (usize, usize)) -> Self {
        let (m1, m2) = failures;
        let (n1, n2) = at_risk;
        let m = (m1 + m2) as f64;
        let n = (n1 + n2) as f64;
        let (n1f, n2f) = (n1 as f64, n2 as f64);

        let expectation = n1f / n * m;
        let variance = (n1 + n2 > 1).then(|| m * (n - m) * n1f * n2f / (n * n * (n - 1.0)));

        Self {
            time,
            num_of_failure_1: m1,
            num_of_failure_2: m2,
            num_at_risk_1: n1,
            num_at_risk_2: n2,
            expectation,
            variance,
        }
    }

    /// Total failures at this time in both cohorts.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.num_of_failure_1 + self.num_of_failure_2
    }

    /// Total subjects at risk at this time in both cohorts.
    #[must_use]
    pub fn at_risk(&self) -> usize {
        self.num_at_risk_1 + self.num_at_risk_2
    }

    /// Variance contribution of this point.
    ///
    /// # Errors
    ///
    /// Returns [`LogRankError::DegenerateVariance`] when only one subject is at risk.
    pub fn checked_variance(&self) -> Result<f64, LogRankError> {
        self.variance
            .ok_or(LogRankError::DegenerateVariance { time: self.time })
    }
}

/// Merges two cohorts into their shared event times.
///
/// Both cohorts are walked with one cursor each. The cohort whose current record is earlier
/// advances; a point is emitted only when that record is an observed event. On equal times
/// both cursors advance and a single point carries the failures of either side. At-risk
/// counts come from the current record of each cohort.
#[must_use]
pub fn merge_cohorts(
    cohort_1: &Cohort,
    cohort_2: &Cohort,
    tail_policy: TailPolicy,
) -> Vec<MergedTimePoint> {
    let (mut rest_1, mut rest_2) = (cohort_1.records(), cohort_2.records());
    let mut merged = Vec::new();

    while let (Some(r1), Some(r2)) = (rest_1.first(), rest_2.first()) {
        if r1.time < r2.time {
            if r1.status.is_event() {
                merged.push(MergedTimePoint::new(
                    r1.time,
                    (1, 0),
                    (r1.num_at_risk, r2.num_at_risk),
                ));
            }
            rest_1 = &rest_1[1..];
        } else if r2.time < r1.time {
            if r2.status.is_event() {
                merged.push(MergedTimePoint::new(
                    r2.time,
                    (0, 1),
                    (r1.num_at_risk, r2.num_at_risk),
                ));
            }
            rest_2 = &rest_2[1..];
        } else {
            if r1.status.is_event() || r2.status.is_event() {
                merged.push(MergedTimePoint::new(
                    r1.time,
                    (r1.status.failures(), r2.status.failures()),
                    (r1.num_at_risk, r2.num_at_risk),
                ));
            }
            rest_1 = &rest_1[1..];
            rest_2 = &rest_2[1..];
        }
    }

    if tail_policy == TailPolicy::Extend {
        let tail_events = |rest: &[CaseRecord]| {
            rest.iter()
                .filter(|r| r.status.is_event())
                .map(|r| (r.time, r.num_at_risk))
                .collect::<Vec<_>>()
        };
        // At most one side still has records
        for (time, at_risk) in tail_events(rest_1) {
            merged.push(MergedTimePoint::new(time, (1, 0), (at_risk, 0)));
        }
        for (time, at_risk) in tail_events(rest_2) {
            merged.push(MergedTimePoint::new(time, (0, 1), (0, at_risk)));
        }
    }

    merged
}

impl LogRankTest {
    /// Runs the log-rank test on two cohorts of the same event definition.
    ///
    /// Merged points whose variance is undefined (a single subject at risk) are excluded from
    /// `O1`, `E1` and `V` and counted in [`LogRankTest::excluded_points`]. The lone subject
    /// at such a point is the failure, so its observed-minus-expected contribution is zero
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns [`LogRankError::ZeroTotalVariance`] when the summed variance is zero, e.g.
    /// when a cohort is empty or the cohorts share no comparable event time.
    #[expect(clippy::cast_precision_loss)]
    pub fn compute(
        cohort_1: &Cohort,
        cohort_2: &Cohort,
        tail_policy: TailPolicy,
    ) -> Result<Self, LogRankError> {
        let merged_points = merge_cohorts(cohort_1, cohort_2, tail_policy);

        let mut observed = 0.0;
        let mut expected = 0.0;
        let mut variance = 0.0;
        let mut excluded_points = 0;
        for point in &merged_points {
            match point.checked_variance() {
                Ok(v) => {
                    observed += point.num_of_failure_1 as f64;
                    expected += point.expectation;
                    variance += v;
                }
                Err(err) => {
                    log::debug!("excluding merged point: {err}");
                    excluded_points += 1;
                }
            }
        }

        if variance <= 0.0 {
            return Err(LogRankError::ZeroTotalVariance {
                merged_points: merged_points.len(),
            });
        }

        let chi_square = (observed - expected).powi(2) / variance;
        Ok(Self {
            observed,
            expected,
            variance,
            chi_square,
            merged_points,
            excluded_points,
        })
    }

    /// Looks up the p-value of this statistic through an external provider.
    ///
    /// # Errors
    ///
    /// Propagates the provider's own error. The statistical result itself is unaffected.
    pub fn p_value<P>(&self, provider: &P) -> Result<f64, P::Error>
    where
        P: ChiSquarePValue + ?Sized,
    {
        provider.p_value(self.chi_square)
    }
}

/// Computes the log-rank chi-square statistic of two cohorts with the default tail policy.
///
/// The statistic is symmetric in the order of the cohorts.
///
/// # Errors
///
/// Returns [`LogRankError::ZeroTotalVariance`] when the statistic is undefined.
pub fn log_rank_statistic(cohort_1: &Cohort, cohort_2: &Cohort) -> Result<f64, LogRankError> {
    LogRankTest::compute(cohort_1, cohort_2, TailPolicy::default()).map(|test| test.chi_square)
}
