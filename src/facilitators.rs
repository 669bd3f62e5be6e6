use crate::grading::{round_off_2_decimal, Grade};
use crate::model::{FacilitatorStats, ProcessedStudent};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
struct Tally {
    student_count: usize,
    grade_counts: BTreeMap<Grade, usize>,
    total_grade_value: u32,
}

fn raw_performance_percentage(total_grade_value: u32, student_count: usize) -> f64 {
    let worst = (student_count as f64) * f64::from(Grade::WORST_VALUE);
    if worst <= 0.0 {
        return 0.0;
    }
    (1.0 - f64::from(total_grade_value) / worst) * 100.0
}

/// Closeness to an all-A1 outcome: 100 when every grade is A1, 0 when every
/// grade is F9. Zero when nobody was graded.
///
/// Rounded for display only; the performance band is picked from the
/// unrounded value.
pub fn performance_percentage(total_grade_value: u32, student_count: usize) -> f64 {
    round_off_2_decimal(raw_performance_percentage(total_grade_value, student_count))
}

fn performance_grade(total_grade_value: u32, student_count: usize) -> Grade {
    Grade::from_performance_percentage(raw_performance_percentage(
        total_grade_value,
        student_count,
    ))
}

fn finish(facilitator_name: String, subject: String, tally: Tally) -> FacilitatorStats {
    let average_grade_value = if tally.student_count > 0 {
        f64::from(tally.total_grade_value) / (tally.student_count as f64)
    } else {
        0.0
    };
    let performance_percentage =
        performance_percentage(tally.total_grade_value, tally.student_count);
    FacilitatorStats {
        facilitator_name,
        subject,
        student_count: tally.student_count,
        grade_counts: tally.grade_counts,
        total_grade_value: tally.total_grade_value,
        average_grade_value,
        performance_percentage,
        performance_grade: performance_grade(tally.total_grade_value, tally.student_count),
    }
}

fn performance_order(a: &FacilitatorStats, b: &FacilitatorStats) -> Ordering {
    b.performance_percentage
        .total_cmp(&a.performance_percentage)
        .then_with(|| a.facilitator_name.cmp(&b.facilitator_name))
        .then_with(|| a.subject.cmp(&b.subject))
}

/// One entry per (facilitator, subject) pair seen in the graded class, best first.
pub fn compute_facilitator_stats(processed: &[ProcessedStudent]) -> Vec<FacilitatorStats> {
    let mut tallies: HashMap<(String, String), Tally> = HashMap::new();
    for student in processed {
        for sub in &student.subjects {
            let tally = tallies
                .entry((sub.facilitator.clone(), sub.subject.clone()))
                .or_insert_with(|| Tally {
                    grade_counts: Grade::ALL.iter().map(|g| (*g, 0)).collect(),
                    ..Default::default()
                });
            tally.student_count += 1;
            *tally.grade_counts.entry(sub.grade).or_insert(0) += 1;
            tally.total_grade_value += sub.grade_value;
        }
    }

    let mut out: Vec<FacilitatorStats> = tallies
        .into_iter()
        .map(|((facilitator, subject), tally)| finish(facilitator, subject, tally))
        .collect();
    out.sort_by(performance_order);
    tracing::debug!(entries = out.len(), "facilitator stats computed");
    out
}
