//! Survival statistics for comparing two cohorts.
//!
//! This crate provides the computational core of a two-cohort survival comparison:
//!
//! - **Event status**: a two-valued outcome parsed from clinical status codes
//! - **Cohorts**: time-ordered observations annotated with at-risk counts
//! - **Survival analysis**: Kaplan-Meier estimator for time-to-event data with censoring
//! - **Log-rank test**: chi-square statistic comparing two survival distributions
//!
//! Every operation is a pure function over immutable inputs; nothing here performs I/O.
//!
//! # Modules
//!
//! - [`status`]: Event-observed vs censored outcome
//! - [`cohort`]: Cohort construction with at-risk bookkeeping
//! - [`survival`]: Kaplan-Meier survival curves
//! - [`log_rank`]: Log-rank merge, expectation, variance and chi-square statistic
//!
//! # Examples
//!
//! ## Estimating a survival curve
//!
//! ```
//! use cohortsurv_stats::{cohort::Cohort, status::EventStatus, survival::KaplanMeierCurve};
//!
//! // Data: (months, status)
//! let cohort = Cohort::from_pairs([
//!     (10.0, EventStatus::Event),    // Event occurred at month 10
//!     (20.0, EventStatus::Censored), // Censored at month 20
//!     (30.0, EventStatus::Event),    // Event occurred at month 30
//! ])
//! .unwrap();
//! let curve = KaplanMeierCurve::estimate(&cohort);
//! assert_eq!(curve.len(), 3);
//! ```
//!
//! ## Comparing two cohorts
//!
//! ```
//! use cohortsurv_stats::{cohort::Cohort, log_rank::log_rank_statistic, status::EventStatus};
//!
//! let altered = Cohort::from_pairs([(2.0, EventStatus::Event), (8.0, EventStatus::Event)])
//!     .unwrap();
//! let unaltered = Cohort::from_pairs([(5.0, EventStatus::Censored), (9.0, EventStatus::Event)])
//!     .unwrap();
//! let chi_square = log_rank_statistic(&altered, &unaltered).unwrap();
//! assert!(chi_square >= 0.0);
//! ```

pub mod cohort;
pub mod log_rank;
pub mod status;
pub mod survival;
