use crate::grading::default_grading_remarks;
use crate::model::StaffMember;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_RECOMMENDATION: &str = "Recommended to attend extra classes for weak areas.";

pub fn default_core_subjects() -> BTreeSet<String> {
    ["English Language", "Mathematics", "Science", "Social Studies"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Settings the grading engine reads. Passed explicitly on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GradingSettings {
    pub core_subjects: BTreeSet<String>,
    /// Grade code (`"A1"`..`"F9"`) to category text.
    pub grading_remarks: BTreeMap<String, String>,
    /// Subject to facilitator name, used when no staff member claims the subject.
    pub facilitator_mapping: BTreeMap<String, String>,
    pub staff_list: Vec<StaffMember>,
    pub default_recommendation: String,
}

impl Default for GradingSettings {
    fn default() -> Self {
        Self {
            core_subjects: default_core_subjects(),
            grading_remarks: default_grading_remarks(),
            facilitator_mapping: BTreeMap::new(),
            staff_list: Vec::new(),
            default_recommendation: DEFAULT_RECOMMENDATION.to_string(),
        }
    }
}

impl GradingSettings {
    pub fn is_core(&self, subject: &str) -> bool {
        self.core_subjects.contains(subject)
    }

    /// Roster first, then the fallback mapping, then "TBA".
    pub fn facilitator_for(&self, subject: &str) -> String {
        if let Some(staff) = self
            .staff_list
            .iter()
            .find(|s| s.subjects.iter().any(|x| x == subject))
        {
            return staff.name.clone();
        }
        self.facilitator_mapping
            .get(subject)
            .filter(|name| !name.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| "TBA".to_string())
    }

    /// Returns a copy with every field present in `patch` replaced.
    pub fn with_patch(&self, patch: &SettingsPatch) -> Self {
        let mut next = self.clone();
        next.apply(patch.clone());
        next
    }

    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.core_subjects {
            self.core_subjects = v;
        }
        if let Some(v) = patch.grading_remarks {
            self.grading_remarks = v;
        }
        if let Some(v) = patch.facilitator_mapping {
            self.facilitator_mapping = v;
        }
        if let Some(v) = patch.staff_list {
            self.staff_list = v;
        }
        if let Some(v) = patch.default_recommendation {
            self.default_recommendation = v;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsPatch {
    pub core_subjects: Option<BTreeSet<String>>,
    pub grading_remarks: Option<BTreeMap<String, String>>,
    pub facilitator_mapping: Option<BTreeMap<String, String>>,
    pub staff_list: Option<Vec<StaffMember>>,
    pub default_recommendation: Option<String>,
}
