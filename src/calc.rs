use crate::config::GradingSettings;
use crate::grading::{
    grade_category, grade_from_distribution, observation_rating, round_off_2_decimal,
    subject_remark, z_score, PromotionCategory,
};
use crate::model::{ClassSummary, ProcessedStudent, StudentRecord, SubjectResult};
use crate::stats::ClassStatistics;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

pub const BEST_CORE_COUNT: usize = 4;
pub const BEST_ELECTIVE_COUNT: usize = 2;
/// Subjects at or below this grade value (D7, E8, F9) are listed as weaknesses.
pub const WEAK_GRADE_VALUE: u32 = 7;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("student {student_id} has a non-finite score for {subject}")]
    NonFiniteScore { student_id: i64, subject: String },
}

impl CalcError {
    pub fn code(&self) -> &'static str {
        match self {
            CalcError::NonFiniteScore { .. } => "bad_score",
        }
    }
}

/// Subject list with duplicates removed, first occurrence kept.
pub fn unique_subjects(subjects: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    subjects
        .iter()
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect()
}

fn check_scores(students: &[StudentRecord], subjects: &[String]) -> Result<(), CalcError> {
    for s in students {
        for subject in subjects {
            if !s.score(subject).is_finite() {
                return Err(CalcError::NonFiniteScore {
                    student_id: s.id,
                    subject: subject.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Lower grade value first, then higher raw score.
fn best_subject_order(a: &SubjectResult, b: &SubjectResult) -> Ordering {
    a.grade_value
        .cmp(&b.grade_value)
        .then_with(|| b.score.total_cmp(&a.score))
}

/// Lower aggregate first, then higher total score, then lower id.
fn class_rank_order(a: &ProcessedStudent, b: &ProcessedStudent) -> Ordering {
    a.best_six_aggregate
        .cmp(&b.best_six_aggregate)
        .then_with(|| b.total_score.total_cmp(&a.total_score))
        .then_with(|| a.id.cmp(&b.id))
}

fn grade_subject(
    student: &StudentRecord,
    subject: &str,
    stats: &ClassStatistics,
    settings: &GradingSettings,
) -> SubjectResult {
    let score = student.score(subject);
    let dist = stats.distribution(subject);
    let grade = grade_from_distribution(score, dist.mean, dist.std_dev);
    SubjectResult {
        subject: subject.to_string(),
        score,
        grade,
        grade_value: grade.value(),
        grade_category: grade_category(grade, &settings.grading_remarks),
        remark: subject_remark(score).to_string(),
        facilitator: settings.facilitator_for(subject),
        z_score: z_score(score, dist.mean, dist.std_dev),
    }
}

/// Best four core and best two elective results. Fewer are returned when the
/// class offers fewer; nothing is padded.
pub fn select_best_six(
    subjects: &[SubjectResult],
    settings: &GradingSettings,
) -> (Vec<SubjectResult>, Vec<SubjectResult>) {
    let (mut cores, mut electives): (Vec<SubjectResult>, Vec<SubjectResult>) = subjects
        .iter()
        .cloned()
        .partition(|s| settings.is_core(&s.subject));
    cores.sort_by(best_subject_order);
    electives.sort_by(best_subject_order);
    cores.truncate(BEST_CORE_COUNT);
    electives.truncate(BEST_ELECTIVE_COUNT);
    (cores, electives)
}

fn non_blank(v: Option<&String>) -> Option<&str> {
    v.map(|s| s.as_str()).filter(|s| !s.trim().is_empty())
}

/// Returns `(overall_remark, weakness_analysis)`.
fn synthesize_remark(
    student: &StudentRecord,
    subjects: &[SubjectResult],
    category: PromotionCategory,
) -> (String, String) {
    if let Some(manual) = non_blank(student.final_remark.as_ref()) {
        return (manual.to_string(), String::new());
    }

    let weak: Vec<&str> = subjects
        .iter()
        .filter(|s| s.grade_value >= WEAK_GRADE_VALUE)
        .map(|s| s.subject.as_str())
        .collect();
    let weakness = if weak.is_empty() {
        String::new()
    } else {
        format!("Needs urgent improvement in: {}.", weak.join(", "))
    };

    let teacher_remark = non_blank(student.overall_remark.as_ref())
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("Overall performance is {}.", category));

    let overall = [weakness.as_str(), teacher_remark.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n\n");
    (overall, weakness)
}

/// Direct ratings win; observation points only fill indicators left blank.
pub fn merge_indicator_ratings(student: &StudentRecord) -> BTreeMap<String, String> {
    let mut merged = student.skills.clone();
    for (indicator, samples) in &student.observation_scores {
        let has_direct = merged
            .get(indicator)
            .map(|r| !r.is_empty())
            .unwrap_or(false);
        if has_direct {
            continue;
        }
        if let Some(rating) = observation_rating(samples) {
            merged.insert(indicator.clone(), rating.code().to_string());
        }
    }
    merged
}

fn process_one(
    student: &StudentRecord,
    stats: &ClassStatistics,
    subjects: &[String],
    settings: &GradingSettings,
) -> ProcessedStudent {
    let results: Vec<SubjectResult> = subjects
        .iter()
        .map(|subject| grade_subject(student, subject, stats, settings))
        .collect();
    let total_score: f64 = results.iter().map(|r| r.score).sum();

    let (best_core, best_elective) = select_best_six(&results, settings);
    let best_six_aggregate: u32 = best_core
        .iter()
        .chain(best_elective.iter())
        .map(|r| r.grade_value)
        .sum();
    let category = PromotionCategory::from_aggregate(best_six_aggregate);

    let (overall_remark, weakness_analysis) = synthesize_remark(student, &results, category);
    let recommendation = non_blank(student.recommendation.as_ref())
        .map(|s| s.to_string())
        .unwrap_or_else(|| settings.default_recommendation.clone());

    ProcessedStudent {
        id: student.id,
        name: student.name.clone(),
        subjects: results,
        total_score,
        best_six_aggregate,
        best_core_subjects: best_core,
        best_elective_subjects: best_elective,
        category,
        rank: 0,
        overall_remark,
        weakness_analysis,
        recommendation,
        attendance: student
            .attendance
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "0".to_string()),
        age: student.age.clone(),
        promoted_to: student.promoted_to.clone(),
        conduct: student.conduct.clone(),
        interest: student.interest.clone(),
        skills: merge_indicator_ratings(student),
    }
}

/// Grades every student against the class distribution and ranks the class.
///
/// Rank depends on the whole class, so it is assigned only after every
/// aggregate is known.
pub fn process_students(
    stats: &ClassStatistics,
    students: &[StudentRecord],
    subjects: &[String],
    settings: &GradingSettings,
) -> Result<Vec<ProcessedStudent>, CalcError> {
    let subjects = unique_subjects(subjects);
    check_scores(students, &subjects)?;

    let mut processed: Vec<ProcessedStudent> = students
        .iter()
        .map(|s| process_one(s, stats, &subjects, settings))
        .collect();
    processed.sort_by(class_rank_order);
    for (idx, p) in processed.iter_mut().enumerate() {
        p.rank = idx + 1;
    }

    tracing::debug!(
        students = processed.len(),
        subjects = subjects.len(),
        "class graded and ranked"
    );
    Ok(processed)
}

pub fn summarize_class(processed: &[ProcessedStudent], stats: &ClassStatistics) -> ClassSummary {
    let mut category_counts: BTreeMap<PromotionCategory, usize> =
        PromotionCategory::ALL.iter().map(|c| (*c, 0)).collect();
    for p in processed {
        *category_counts.entry(p.category).or_insert(0) += 1;
    }
    let class_average_aggregate = if processed.is_empty() {
        0.0
    } else {
        let sum: u32 = processed.iter().map(|p| p.best_six_aggregate).sum();
        round_off_2_decimal(f64::from(sum) / (processed.len() as f64))
    };
    ClassSummary {
        student_count: processed.len(),
        class_average_aggregate,
        category_counts,
        subject_means: stats.subject_means.clone(),
    }
}
