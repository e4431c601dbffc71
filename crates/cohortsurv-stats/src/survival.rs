use serde::Serialize;

use crate::{
    cohort::{CaseRecord, Cohort},
    status::EventStatus,
};

/// A cohort record annotated with its Kaplan-Meier survival estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurvivalPoint {
    pub case_id: String,
    pub time: f64,
    pub status: EventStatus,
    pub num_at_risk: usize,
    /// Cumulative survival probability after this record, in `[0.0, 1.0]`.
    pub survival_rate: f64,
}

/// Kaplan-Meier survival curve for one cohort.
///
/// The Kaplan-Meier estimator is a non-parametric statistic used to estimate the survival
/// function from lifetime data. It accounts for censored data (observations where the event
/// of interest has not occurred by the end of the study period).
///
/// The curve keeps one point per cohort record, in the cohort's time order, so censored
/// records remain on the curve (for plotting and risk tables) without moving it. Records
/// sharing a time are processed one at a time rather than batched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KaplanMeierCurve {
    points: Vec<SurvivalPoint>,
}

impl KaplanMeierCurve {
    /// Computes the Kaplan-Meier survival curve of a cohort.
    ///
    /// Starting from a survival value of 1.0, every observed event multiplies the running
    /// value by `(at_risk - 1) / at_risk`. Censored records carry the running value unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cohortsurv_stats::{cohort::Cohort, status::EventStatus, survival::KaplanMeierCurve};
    /// let cohort = Cohort::from_pairs([
    ///     (10.0, EventStatus::Event),
    ///     (20.0, EventStatus::Censored),
    ///     (30.0, EventStatus::Event),
    /// ])
    /// .unwrap();
    /// let curve = KaplanMeierCurve::estimate(&cohort);
    /// let rates = curve.iter().map(|p| p.survival_rate).collect::<Vec<_>>();
    /// assert!((rates[0] - 2.0 / 3.0).abs() < 1e-12);
    /// assert_eq!(rates[1], rates[0]);
    /// assert_eq!(rates[2], 0.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn estimate(cohort: &Cohort) -> Self {
        let mut current_survival = 1.0;
        let points = cohort
            .iter()
            .map(|record| {
                let CaseRecord {
                    case_id,
                    time,
                    status,
                    num_at_risk,
                } = record;
                if status.is_event() {
                    let at_risk = *num_at_risk as f64;
                    current_survival = current_survival * (at_risk - 1.0) / at_risk;
                }
                SurvivalPoint {
                    case_id: case_id.clone(),
                    time: *time,
                    status: *status,
                    num_at_risk: *num_at_risk,
                    survival_rate: current_survival,
                }
            })
            .collect();
        Self { points }
    }

    #[must_use]
    pub fn points(&self) -> &[SurvivalPoint] {
        &self.points
    }

    /// Returns the median survival time.
    ///
    /// The median survival time is the earliest time at which the survival probability
    /// drops to or below 50%. If the survival probability never reaches 50%, this method
    /// returns `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cohortsurv_stats::{cohort::Cohort, status::EventStatus, survival::KaplanMeierCurve};
    /// let cohort = Cohort::from_pairs([
    ///     (10.0, EventStatus::Event),
    ///     (20.0, EventStatus::Event),
    ///     (30.0, EventStatus::Event),
    /// ])
    /// .unwrap();
    /// let curve = KaplanMeierCurve::estimate(&cohort);
    /// assert_eq!(curve.median_survival(), Some(20.0));
    /// ```
    #[must_use]
    pub fn median_survival(&self) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.survival_rate <= 0.5)
            .map(|p| p.time)
    }

    /// Returns the survival probability at a specific time.
    ///
    /// This method uses a step function: the survival probability remains constant
    /// between event times and decreases only when an event occurs.
    ///
    /// Returns `1.0` if the time is before the first record, or the last known survival
    /// probability if the time is after the last record.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cohortsurv_stats::{cohort::Cohort, status::EventStatus, survival::KaplanMeierCurve};
    /// let cohort = Cohort::from_pairs([(10.0, EventStatus::Event), (20.0, EventStatus::Event)])
    ///     .unwrap();
    /// let curve = KaplanMeierCurve::estimate(&cohort);
    ///
    /// assert_eq!(curve.survival_at(5.0), 1.0); // Before first event
    /// assert!(curve.survival_at(15.0) < 1.0); // After first event
    /// ```
    #[must_use]
    pub fn survival_at(&self, time: f64) -> f64 {
        // Points are sorted by time, so everything before the partition point is <= time
        let idx = self.points.partition_point(|p| p.time <= time);
        idx.checked_sub(1)
            .map_or(1.0, |last| self.points[last].survival_rate)
    }

    /// Number of points with an observed event.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.points.iter().filter(|p| p.status.is_event()).count()
    }

    /// Number of censored points.
    #[must_use]
    pub fn censored_count(&self) -> usize {
        self.points.len() - self.event_count()
    }
}

impl std::ops::Deref for KaplanMeierCurve {
    type Target = [SurvivalPoint];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}
