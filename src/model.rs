use crate::grading::{Grade, PromotionCategory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Raw student record as supplied by the host. Never mutated by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub scores: HashMap<String, f64>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub attendance: Option<String>,
    #[serde(default)]
    pub conduct: Option<String>,
    #[serde(default)]
    pub interest: Option<String>,
    #[serde(default)]
    pub promoted_to: Option<String>,
    /// Class teacher's free-text remark, appended to the synthesized remark.
    #[serde(default)]
    pub overall_remark: Option<String>,
    /// Manually edited final remark; replaces synthesis entirely when non-blank.
    #[serde(default)]
    pub final_remark: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
    /// Directly entered indicator ratings.
    #[serde(default)]
    pub skills: BTreeMap<String, String>,
    /// Raw 1..=9 observation points per indicator.
    #[serde(default)]
    pub observation_scores: BTreeMap<String, Vec<u8>>,
}

impl StudentRecord {
    pub fn score(&self, subject: &str) -> f64 {
        self.scores.get(subject).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResult {
    pub subject: String,
    pub score: f64,
    pub grade: Grade,
    pub grade_value: u32,
    pub grade_category: String,
    pub remark: String,
    pub facilitator: String,
    pub z_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedStudent {
    pub id: i64,
    pub name: String,
    pub subjects: Vec<SubjectResult>,
    pub total_score: f64,
    pub best_six_aggregate: u32,
    pub best_core_subjects: Vec<SubjectResult>,
    pub best_elective_subjects: Vec<SubjectResult>,
    pub category: PromotionCategory,
    pub rank: usize,
    pub overall_remark: String,
    pub weakness_analysis: String,
    pub recommendation: String,
    pub attendance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promoted_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conduct: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest: Option<String>,
    pub skills: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilitatorStats {
    pub facilitator_name: String,
    pub subject: String,
    pub student_count: usize,
    pub grade_counts: BTreeMap<Grade, usize>,
    pub total_grade_value: u32,
    pub average_grade_value: f64,
    pub performance_percentage: f64,
    pub performance_grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub student_count: usize,
    pub class_average_aggregate: f64,
    pub category_counts: BTreeMap<PromotionCategory, usize>,
    pub subject_means: BTreeMap<String, f64>,
}
