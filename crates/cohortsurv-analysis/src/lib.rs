//! Cohort construction and survival comparison for clinical case data
//!
//! This crate turns exported clinical survival data and a case → group
//! assignment into the inputs of [`cohortsurv_stats`], and collects the
//! results into serializable reports.
//!
//! # Overview
//!
//! An analysis request carries two maps keyed by case identifier:
//!
//! 1. **Survival data** ([`record::SurvivalData`]): per-case months and status
//!    for overall survival and disease-free survival, with `"NA"`/empty markers
//!    for unknown values
//! 2. **Case groups** ([`group::CaseGroups`]): whether each case is `altered` or
//!    `unaltered` in the queried gene set
//!
//! For every [`event::EventDefinition`] the workflow is:
//!
//! 1. **Build Cohorts** ([`builder::CohortBuilder`]): route cases with a known time
//!    and a recognized label into the altered or unaltered cohort
//! 2. **Estimate Curves** ([`builder::build_and_estimate`]): Kaplan-Meier curve per cohort
//! 3. **Compare** ([`survival::SurvivalAnalysis`]): log-rank test between the cohorts
//!
//! # Examples
//!
//! ```
//! use cohortsurv_analysis::{
//!     builder::build_and_estimate,
//!     event::EventDefinition,
//!     group::{CaseGroups, GroupLabel},
//!     record::SurvivalData,
//! };
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let data: SurvivalData = serde_json::from_str(
//!     r#"{
//!         "P-1": { "os_months": "10.5", "os_status": "DECEASED" },
//!         "P-2": { "os_months": "NA", "os_status": "LIVING" },
//!         "P-3": { "os_months": 20, "os_status": "LIVING" }
//!     }"#,
//! )?;
//! let groups: CaseGroups =
//!     serde_json::from_str(r#"{ "P-1": "altered", "P-2": "altered", "P-3": "unaltered" }"#)?;
//!
//! let pair = build_and_estimate(&data, &groups, EventDefinition::OverallSurvival)?;
//! assert_eq!(pair.curve(GroupLabel::Altered).len(), 1);
//! assert_eq!(pair.curve(GroupLabel::Unaltered).len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod event;
pub mod group;
pub mod record;
pub mod survival;
