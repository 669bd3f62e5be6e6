use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Letter grade on the nine-point scale. Lower value is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A1,
    B2,
    B3,
    C4,
    C5,
    C6,
    D7,
    E8,
    F9,
}

impl Grade {
    pub const ALL: [Grade; 9] = [
        Grade::A1,
        Grade::B2,
        Grade::B3,
        Grade::C4,
        Grade::C5,
        Grade::C6,
        Grade::D7,
        Grade::E8,
        Grade::F9,
    ];

    pub const WORST_VALUE: u32 = 9;

    pub fn value(self) -> u32 {
        match self {
            Grade::A1 => 1,
            Grade::B2 => 2,
            Grade::B3 => 3,
            Grade::C4 => 4,
            Grade::C5 => 5,
            Grade::C6 => 6,
            Grade::D7 => 7,
            Grade::E8 => 8,
            Grade::F9 => 9,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Grade::A1 => "A1",
            Grade::B2 => "B2",
            Grade::B3 => "B3",
            Grade::C4 => "C4",
            Grade::C5 => "C5",
            Grade::C6 => "C6",
            Grade::D7 => "D7",
            Grade::E8 => "E8",
            Grade::F9 => "F9",
        }
    }

    /// Category text used when the remarks table has no entry for this grade.
    pub fn default_category(self) -> &'static str {
        match self {
            Grade::A1 => "Excellent",
            Grade::B2 => "Very Good",
            Grade::B3 => "Good",
            Grade::C4 | Grade::C5 | Grade::C6 => "Credit",
            Grade::D7 | Grade::E8 => "Pass",
            Grade::F9 => "Fail",
        }
    }

    /// Facilitator performance bands. Same letters as subject grades but on a
    /// 0..=100 percentage scale.
    pub fn from_performance_percentage(percentage: f64) -> Grade {
        if percentage >= 80.0 {
            Grade::A1
        } else if percentage >= 70.0 {
            Grade::B2
        } else if percentage >= 60.0 {
            Grade::B3
        } else if percentage >= 50.0 {
            Grade::C4
        } else if percentage >= 45.0 {
            Grade::C5
        } else if percentage >= 40.0 {
            Grade::C6
        } else if percentage >= 35.0 {
            Grade::D7
        } else if percentage >= 30.0 {
            Grade::E8
        } else {
            Grade::F9
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

pub fn default_grading_remarks() -> BTreeMap<String, String> {
    Grade::ALL
        .iter()
        .map(|g| (g.code().to_string(), g.default_category().to_string()))
        .collect()
}

/// Distribution-relative grade. Bands are multiples of the standard deviation
/// tested top-down with `>=`; the first match wins.
///
/// A subject with no variance cannot be banded, so everyone sits at C4.
pub fn grade_from_distribution(score: f64, mean: f64, std_dev: f64) -> Grade {
    if std_dev == 0.0 {
        return Grade::C4;
    }
    let diff = score - mean;
    if diff >= 1.645 * std_dev {
        Grade::A1
    } else if diff >= 1.036 * std_dev {
        Grade::B2
    } else if diff >= 0.524 * std_dev {
        Grade::B3
    } else if diff >= 0.0 {
        Grade::C4
    } else if diff >= -0.524 * std_dev {
        Grade::C5
    } else if diff >= -1.036 * std_dev {
        Grade::C6
    } else if diff >= -1.645 * std_dev {
        Grade::D7
    } else if diff >= -2.326 * std_dev {
        Grade::E8
    } else {
        Grade::F9
    }
}

pub fn z_score(score: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        0.0
    } else {
        (score - mean) / std_dev
    }
}

pub fn grade_category(grade: Grade, remarks: &BTreeMap<String, String>) -> String {
    remarks
        .get(grade.code())
        .filter(|s| !s.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| grade.default_category().to_string())
}

/// Absolute-score remark, independent of the class distribution.
pub fn subject_remark(score: f64) -> &'static str {
    if score >= 90.0 {
        "Outstanding mastery of subject concepts."
    } else if score >= 80.0 {
        "Excellent performance, shows great potential."
    } else if score >= 70.0 {
        "Very Good. Consistent effort displayed."
    } else if score >= 60.0 {
        "Good. Capable of achieving higher grades."
    } else if score >= 55.0 {
        "Credit. Satisfactory understanding shown."
    } else if score >= 50.0 {
        "Pass. Needs more dedication to studies."
    } else if score >= 40.0 {
        "Weak Pass. Remedial support recommended."
    } else {
        "Critical Failure. Immediate intervention required."
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PromotionCategory {
    Distinction,
    Merit,
    Pass,
    Fail,
}

impl PromotionCategory {
    pub const ALL: [PromotionCategory; 4] = [
        PromotionCategory::Distinction,
        PromotionCategory::Merit,
        PromotionCategory::Pass,
        PromotionCategory::Fail,
    ];

    pub fn from_aggregate(aggregate: u32) -> PromotionCategory {
        if aggregate <= 10 {
            PromotionCategory::Distinction
        } else if aggregate <= 20 {
            PromotionCategory::Merit
        } else if aggregate <= 36 {
            PromotionCategory::Pass
        } else {
            PromotionCategory::Fail
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PromotionCategory::Distinction => "Distinction",
            PromotionCategory::Merit => "Merit",
            PromotionCategory::Pass => "Pass",
            PromotionCategory::Fail => "Fail",
        }
    }
}

impl fmt::Display for PromotionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationRating {
    /// A+
    Advanced,
    /// A
    Achieved,
    /// D
    Developing,
}

impl ObservationRating {
    pub fn code(self) -> &'static str {
        match self {
            ObservationRating::Advanced => "A+",
            ObservationRating::Achieved => "A",
            ObservationRating::Developing => "D",
        }
    }
}

/// Rating derived from 1..=9 observation points by their average.
pub fn observation_rating(samples: &[u8]) -> Option<ObservationRating> {
    if samples.is_empty() {
        return None;
    }
    let sum: u32 = samples.iter().map(|&s| u32::from(s)).sum();
    let avg = f64::from(sum) / samples.len() as f64;
    Some(if avg >= 7.0 {
        ObservationRating::Advanced
    } else if avg >= 4.0 {
        ObservationRating::Achieved
    } else {
        ObservationRating::Developing
    })
}

/// VB6-style 2-decimal rounding: `Int(100*x + 0.5) / 100`
pub fn round_off_2_decimal(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}
