//! Survival comparison command
//!
//! Builds the altered and unaltered cohorts for each event definition,
//! estimates their Kaplan-Meier curves and compares them with the log-rank
//! test.

mod export;
mod table;

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use cohortsurv_analysis::{
    config::AnalysisConfig, event::EventDefinition, survival::SurvivalAnalysis,
};
use cohortsurv_stats::log_rank::TailPolicy;

use crate::util::{self, Output};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
enum EventArg {
    Os,
    Dfs,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
enum TailPolicyArg {
    #[default]
    Truncate,
    Extend,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    /// Path to the survival data JSON file (case id → record)
    pub survival_data: PathBuf,

    /// Path to the case groups JSON file (case id → "altered" / "unaltered")
    pub case_groups: PathBuf,

    /// Event definitions to analyze (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = ["os", "dfs"])]
    events: Vec<EventArg>,

    /// What to do with the remaining records once one cohort is exhausted
    #[arg(long, default_value = "truncate")]
    tail_policy: TailPolicyArg,

    /// Output directory for KM curve CSV files
    #[arg(long)]
    pub km_output_dir: Option<PathBuf>,

    /// Write the full report as JSON to this path (`-` for stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl From<EventArg> for EventDefinition {
    fn from(arg: EventArg) -> Self {
        match arg {
            EventArg::Os => EventDefinition::OverallSurvival,
            EventArg::Dfs => EventDefinition::DiseaseFree,
        }
    }
}

impl From<TailPolicyArg> for TailPolicy {
    fn from(arg: TailPolicyArg) -> Self {
        match arg {
            TailPolicyArg::Truncate => TailPolicy::Truncate,
            TailPolicyArg::Extend => TailPolicy::Extend,
        }
    }
}

impl AnalyzeArg {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            events: self.events.iter().copied().map(Into::into).collect(),
            tail_policy: self.tail_policy.into(),
        }
    }
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let data = util::read_survival_data_file(&arg.survival_data)?;
    let groups = util::read_case_groups_file(&arg.case_groups)?;
    let config = arg.config();

    let report = SurvivalAnalysis::run(&data, &groups, &config).with_context(|| {
        format!(
            "Failed to build cohorts from {}",
            arg.survival_data.display()
        )
    })?;

    let mut output = arg
        .output
        .as_deref()
        .map(Output::from_output_path)
        .transpose()?;

    // stdout is reserved for the JSON report when requested
    if !output.as_ref().is_some_and(Output::is_stdout) {
        println!("Survival Comparison Report");
        println!("==========================\n");

        table::print_legend();
        println!();

        for comparison in &report.comparisons {
            table::print_comparison(comparison);
            println!();
        }
    }

    if let Some(dir) = &arg.km_output_dir {
        for comparison in &report.comparisons {
            export::save_km_curves(dir, comparison)?;
        }
    }

    if let Some(output) = &mut output {
        output.write_json(&report)?;
        log::info!("Report saved to: {}", output.display_path());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestArgs {
        #[clap(flatten)]
        analyze: AnalyzeArg,
    }

    fn parse(args: &[&str]) -> AnalyzeArg {
        TestArgs::try_parse_from(["cohortsurv"].iter().chain(args))
            .unwrap()
            .analyze
    }

    #[test]
    fn test_defaults() {
        let arg = parse(&["data.json", "groups.json"]);
        assert_eq!(arg.config(), AnalysisConfig::default());
        assert_eq!(arg.output, None);
        assert_eq!(arg.km_output_dir, None);
    }

    #[test]
    fn test_events_and_tail_policy() {
        let arg = parse(&[
            "data.json",
            "groups.json",
            "--events",
            "dfs",
            "--tail-policy",
            "extend",
        ]);
        let config = arg.config();
        assert_eq!(config.events, [EventDefinition::DiseaseFree]);
        assert_eq!(config.tail_policy, TailPolicy::Extend);
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let result =
            TestArgs::try_parse_from(["cohortsurv", "a.json", "b.json", "--events", "pfs"]);
        assert!(result.is_err());
    }
}
