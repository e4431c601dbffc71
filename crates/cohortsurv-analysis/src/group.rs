//! Case → comparison group assignment

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The two comparison groups of a survival analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupLabel {
    /// Cases carrying an alteration in the queried gene set.
    Altered,
    /// Cases without any alteration in the queried gene set.
    Unaltered,
}

impl GroupLabel {
    pub const ALL: [Self; 2] = [Self::Altered, Self::Unaltered];

    /// Recognizes an assignment label. Labels other than `altered` and `unaltered` are not
    /// part of either cohort and yield `None`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "altered" => Some(Self::Altered),
            "unaltered" => Some(Self::Unaltered),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Altered => "altered",
            Self::Unaltered => "unaltered",
        }
    }

    /// Legend text used in reports.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Altered => "Gene Set Altered",
            Self::Unaltered => "Gene Set Not Altered",
        }
    }
}

/// Group label of every case, as produced by the alteration query.
///
/// Labels are kept verbatim so that unrecognized ones can be reported, not just dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseGroups {
    labels: BTreeMap<String, String>,
}

impl CaseGroups {
    /// Returns the recognized group of a case, if any.
    #[must_use]
    pub fn group_of(&self, case_id: &str) -> Option<GroupLabel> {
        self.labels
            .get(case_id)
            .and_then(|label| GroupLabel::from_label(label))
    }

    /// Number of cases assigned to `group`, regardless of whether they have survival data.
    #[must_use]
    pub fn count(&self, group: GroupLabel) -> usize {
        self.labels
            .values()
            .filter(|label| GroupLabel::from_label(label) == Some(group))
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for CaseGroups
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            labels: iter
                .into_iter()
                .map(|(case_id, label)| (case_id.into(), label.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label() {
        assert_eq!(GroupLabel::from_label("altered"), Some(GroupLabel::Altered));
        assert_eq!(
            GroupLabel::from_label("unaltered"),
            Some(GroupLabel::Unaltered)
        );
        assert_eq!(GroupLabel::from_label("Altered"), None);
        assert_eq!(GroupLabel::from_label("unknown"), None);
        assert_eq!(GroupLabel::from_label(""), None);
        for group in GroupLabel::ALL {
            assert_eq!(GroupLabel::from_label(group.as_str()), Some(group));
        }
    }

    #[test]
    fn test_case_groups() {
        let groups = [
            ("a", "altered"),
            ("b", "unaltered"),
            ("c", "altered"),
            ("d", "not_sequenced"),
        ]
        .into_iter()
        .collect::<CaseGroups>();

        assert_eq!(groups.len(), 4);
        assert_eq!(groups.group_of("a"), Some(GroupLabel::Altered));
        assert_eq!(groups.group_of("b"), Some(GroupLabel::Unaltered));
        assert_eq!(groups.group_of("d"), None);
        assert_eq!(groups.group_of("missing"), None);
        assert_eq!(groups.count(GroupLabel::Altered), 2);
        assert_eq!(groups.count(GroupLabel::Unaltered), 1);
    }

    #[test]
    fn test_deserialize() {
        let groups: CaseGroups =
            serde_json::from_str(r#"{ "x": "altered", "y": "unaltered" }"#).unwrap();
        assert_eq!(groups.group_of("x"), Some(GroupLabel::Altered));
        assert_eq!(groups.group_of("y"), Some(GroupLabel::Unaltered));
    }
}
