use crate::model::StudentRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDistribution {
    pub mean: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStatistics {
    pub subject_means: BTreeMap<String, f64>,
    pub subject_std_devs: BTreeMap<String, f64>,
}

impl ClassStatistics {
    /// Subjects absent from the maps read as `{0, 0}`, which grades as no variance.
    pub fn distribution(&self, subject: &str) -> SubjectDistribution {
        SubjectDistribution {
            mean: self.subject_means.get(subject).copied().unwrap_or(0.0),
            std_dev: self.subject_std_devs.get(subject).copied().unwrap_or(0.0),
        }
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / (values.len() as f64)
}

/// Population standard deviation (divides by N).
pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() as f64)).sqrt()
}

pub fn compute_class_statistics(students: &[StudentRecord], subjects: &[String]) -> ClassStatistics {
    let mut out = ClassStatistics::default();
    for subject in subjects {
        let scores: Vec<f64> = students.iter().map(|s| s.score(subject)).collect();
        // Summing identical fractional scores can drift the mean by an ulp,
        // which would leave a tiny non-zero sd. Pin both for a uniform column.
        let (m, sd) = match scores.split_first() {
            Some((first, rest)) if rest.iter().all(|v| v == first) => (*first, 0.0),
            _ => {
                let m = mean(&scores);
                (m, population_std_dev(&scores, m))
            }
        };
        if sd == 0.0 && !scores.is_empty() {
            tracing::debug!(subject = %subject, mean = m, "subject has no variance");
        }
        out.subject_means.insert(subject.clone(), m);
        out.subject_std_devs.insert(subject.clone(), sd);
    }
    tracing::debug!(
        students = students.len(),
        subjects = out.subject_means.len(),
        "class statistics computed"
    );
    out
}
