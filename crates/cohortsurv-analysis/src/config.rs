use cohortsurv_stats::log_rank::TailPolicy;
use serde::{Deserialize, Serialize};

use crate::event::EventDefinition;

/// Parameters of a [`SurvivalAnalysis`](crate::survival::SurvivalAnalysis) run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Event definitions to analyze, in report order.
    pub events: Vec<EventDefinition>,
    pub tail_policy: TailPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            events: EventDefinition::ALL.to_vec(),
            tail_policy: TailPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_analyzes_both_events() {
        let config = AnalysisConfig::default();
        assert_eq!(
            config.events,
            [EventDefinition::OverallSurvival, EventDefinition::DiseaseFree]
        );
        assert_eq!(config.tail_policy, TailPolicy::Truncate);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: AnalysisConfig = serde_json::from_str(r#"{ "events": ["dfs"] }"#).unwrap();
        assert_eq!(config.events, [EventDefinition::DiseaseFree]);
        assert_eq!(config.tail_policy, TailPolicy::Truncate);

        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "tail_policy": "extend" }"#).unwrap();
        assert_eq!(config.events.len(), 2);
        assert_eq!(config.tail_policy, TailPolicy::Extend);
    }
}
