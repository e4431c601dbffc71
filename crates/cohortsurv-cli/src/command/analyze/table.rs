//! Survival comparison table display
//!
//! This module provides functions for displaying cohort summaries and
//! log-rank results in a consistent tabular format.

use cohortsurv_analysis::{
    group::GroupLabel,
    survival::{CohortSummary, ComparisonReport, LogRankOutcome},
};
use cohortsurv_stats::log_rank::DEGREES_OF_FREEDOM;

/// Print table header
fn print_summary_table_header() {
    println!(
        "  {:<22} {:>8} {:>8} {:>8} {:>10} {:>12}",
        "Group", "Assigned", "Cases", "Events", "Censored%", "Median(KM)",
    );
}

/// Print table separator line
fn print_summary_table_separator() {
    // group(22) + assigned(8) + cases(8) + events(8) + censored%(10) + median_km(12) + spaces(5)
    println!("  {}", "-".repeat(73));
}

/// Print a single table row
fn print_summary_table_row(summary: &CohortSummary) {
    println!(
        "  {:<22} {:>8} {:>8} {:>8} {:>10} {:>12}",
        summary.group.display_name(),
        summary.assigned,
        summary.cases,
        summary.events,
        format_rate(summary.censoring_rate()),
        format_median(summary.median_km),
    );
}

/// Print the cohort summaries and log-rank result of one event definition
pub(super) fn print_comparison(comparison: &ComparisonReport) {
    println!("{} ({})", comparison.event, comparison.event.id());
    print_summary_table_header();
    print_summary_table_separator();
    for group in GroupLabel::ALL {
        print_summary_table_row(comparison.summary(group));
    }
    println!(
        "  (Excluded: {} without group, {} without {})",
        comparison.exclusions.unassigned,
        comparison.exclusions.missing_time,
        comparison.event.time_label(),
    );
    println!("  {}", log_rank_line(&comparison.log_rank));
}

/// Print legend explaining table columns
pub(super) fn print_legend() {
    println!("Legend:");
    println!("  Assigned    : Cases labelled with the group");
    println!("  Cases       : Assigned cases with a known time");
    println!("  Censored%   : Share of cases whose event was not observed");
    println!("  Median(KM)  : Kaplan-Meier median survival in months (N/A if never reached)");
    println!("  Chi-square  : Log-rank statistic comparing altered and unaltered cases");
}

fn format_median(median: Option<f64>) -> String {
    median.map_or("N/A".to_string(), |m| format!("{m:.1}"))
}

fn format_rate(rate: Option<f64>) -> String {
    rate.map_or("N/A".to_string(), |r| format!("{r:.1}%"))
}

fn log_rank_line(outcome: &LogRankOutcome) -> String {
    match outcome {
        LogRankOutcome::Computed(test) => {
            let excluded = if test.excluded_points > 0 {
                format!(", {} excluded", test.excluded_points)
            } else {
                String::new()
            };
            format!(
                "Log-rank: chi-square = {:.4} (df = {DEGREES_OF_FREEDOM}), O = {:.1}, E = {:.3}, V = {:.3}, {} event times{excluded}",
                test.chi_square,
                test.observed,
                test.expected,
                test.variance,
                test.merged_points.len(),
            )
        }
        LogRankOutcome::Undefined { reason } => format!("Log-rank: undefined ({reason})"),
    }
}

#[cfg(test)]
mod tests {
    use cohortsurv_stats::{
        cohort::Cohort,
        log_rank::{LogRankTest, TailPolicy},
        status::EventStatus::{Censored, Event},
    };

    use super::*;

    #[test]
    fn test_format_missing_values() {
        assert_eq!(format_median(None), "N/A");
        assert_eq!(format_median(Some(12.345)), "12.3");
        assert_eq!(format_rate(None), "N/A");
        assert_eq!(format_rate(Some(100.0 / 3.0)), "33.3%");
    }

    #[test]
    fn test_log_rank_line() {
        let a = Cohort::from_pairs([(1.0, Event), (2.0, Censored), (3.0, Event)]).unwrap();
        let b = Cohort::from_pairs([(1.0, Event), (2.0, Event)]).unwrap();

        let computed = LogRankOutcome::from(LogRankTest::compute(&a, &b, TailPolicy::Truncate));
        let line = log_rank_line(&computed);
        assert!(line.starts_with("Log-rank: chi-square = 1.2901 (df = 1)"), "{line}");
        assert!(line.ends_with("2 event times"), "{line}");

        let extended = LogRankOutcome::from(LogRankTest::compute(&a, &b, TailPolicy::Extend));
        assert!(log_rank_line(&extended).ends_with("3 event times, 1 excluded"));

        let undefined =
            LogRankOutcome::from(LogRankTest::compute(&a, &Cohort::default(), TailPolicy::Truncate));
        assert!(log_rank_line(&undefined).starts_with("Log-rank: undefined ("));
    }
}
