use crate::scale::{gpa_points, GradingScale};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Assessment categories recognized by weight configurations. Unknown
/// categories are carried as `Other` and behave like any built-in type:
/// they count only when a weight entry names them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssessmentType {
    Quiz,
    Exam,
    Assignment,
    Project,
    Participation,
    Midterm,
    Final,
    Other(String),
}

impl From<String> for AssessmentType {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "quiz" => AssessmentType::Quiz,
            "exam" => AssessmentType::Exam,
            "assignment" => AssessmentType::Assignment,
            "project" => AssessmentType::Project,
            "participation" => AssessmentType::Participation,
            "midterm" => AssessmentType::Midterm,
            "final" => AssessmentType::Final,
            other => AssessmentType::Other(other.to_string()),
        }
    }
}

impl From<AssessmentType> for String {
    fn from(t: AssessmentType) -> Self {
        t.as_str().to_string()
    }
}

impl AssessmentType {
    pub const BUILT_IN: [AssessmentType; 7] = [
        AssessmentType::Quiz,
        AssessmentType::Exam,
        AssessmentType::Assignment,
        AssessmentType::Project,
        AssessmentType::Participation,
        AssessmentType::Midterm,
        AssessmentType::Final,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            AssessmentType::Quiz => "quiz",
            AssessmentType::Exam => "exam",
            AssessmentType::Assignment => "assignment",
            AssessmentType::Project => "project",
            AssessmentType::Participation => "participation",
            AssessmentType::Midterm => "midterm",
            AssessmentType::Final => "final",
            AssessmentType::Other(s) => s.as_str(),
        }
    }

    /// Display label shared by every renderer; one table, not per-view copies.
    pub fn label(&self) -> &str {
        match self {
            AssessmentType::Quiz => "Quizzes",
            AssessmentType::Exam => "Exams",
            AssessmentType::Assignment => "Assignments",
            AssessmentType::Project => "Projects",
            AssessmentType::Participation => "Participation",
            AssessmentType::Midterm => "Midterm",
            AssessmentType::Final => "Final",
            AssessmentType::Other(s) => s.as_str(),
        }
    }

    pub fn icon(&self) -> &str {
        match self {
            AssessmentType::Quiz => "quiz",
            AssessmentType::Exam => "school",
            AssessmentType::Assignment => "assignment",
            AssessmentType::Project => "folder",
            AssessmentType::Participation => "groups",
            AssessmentType::Midterm => "event",
            AssessmentType::Final => "flag",
            AssessmentType::Other(_) => "category",
        }
    }
}

/// One student's result on one assessment. `score` absent means ungraded /
/// not submitted. Scores above `max_score` are extra credit and are never
/// clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentScore {
    pub score: Option<f64>,
    pub max_score: f64,
}

impl AssessmentScore {
    /// Percentage for this score, or `None` when ungraded or when the
    /// denominator is unusable (`max_score <= 0` is excluded rather than
    /// allowed to produce NaN/Infinity).
    pub fn percentage(&self) -> Option<f64> {
        let raw = self.score?;
        if self.max_score > 0.0 {
            Some(100.0 * raw / self.max_score)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AssessmentType,
    pub max_score: f64,
}

/// Weight configuration for one assessment category within a grading
/// period. The engine does not require weights to sum to 100; it
/// re-normalizes against whatever weight actually contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeWeight {
    #[serde(rename = "assessmentType")]
    pub kind: AssessmentType,
    pub weight_percent: f64,
    #[serde(default)]
    pub drop_lowest: usize,
}

/// One student's full set of scores for a course/period, assembled fresh
/// per request from the roster and score collaborators. `course_grade` is
/// the already-derived numeric grade, used for distribution bucketing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentGradeRow {
    pub student_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub scores: HashMap<String, AssessmentScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_grade: Option<f64>,
}

/// Per-type result of the weighted calculation: the trimmed average, how
/// many assessments counted, and which were dropped (for display).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeBreakdown {
    #[serde(rename = "assessmentType")]
    pub kind: AssessmentType,
    pub weight_percent: f64,
    pub average: Option<f64>,
    pub counted: usize,
    pub dropped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBucket {
    pub letter: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStatistics {
    pub class_average: f64,
    pub graded_percentage: f64,
    pub distribution: Vec<DistributionBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassFailSummary {
    pub total: usize,
    pub passing: usize,
    pub failing: usize,
    pub pass_rate: f64,
    pub fail_rate: f64,
}

/// A finalized course grade ready for the grade store: numeric rounded to
/// 2 decimals, letter per the supplied scale, GPA and quality points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseGrade {
    pub numeric_grade: f64,
    pub letter_grade: String,
    pub gpa_points: f64,
    pub credit_hours: f64,
    pub quality_points: f64,
}

fn score_percentage(scores: &HashMap<String, AssessmentScore>, a: &Assessment) -> Option<f64> {
    scores.get(&a.id).and_then(|s| s.percentage())
}

/// Weighted average per the gradebook rules.
///
/// With an empty weight configuration this is the plain mean of the graded
/// percentages. Otherwise each configured type is averaged after dropping
/// its `drop_lowest` lowest percentages, and the type averages combine as
/// `sum(avg * weight/100) / sum(weight) * 100`. Types with no graded work
/// (or with everything dropped) contribute neither numerator nor
/// denominator, so a partially-graded course still reports a meaningful
/// in-progress average. `None` means "ungraded so far", not an error.
pub fn weighted_average(
    scores: &HashMap<String, AssessmentScore>,
    assessments: &[Assessment],
    weights: &[TypeWeight],
) -> Option<f64> {
    if weights.is_empty() {
        let mut total = 0.0_f64;
        let mut count = 0_usize;
        for a in assessments {
            if let Some(pct) = score_percentage(scores, a) {
                total += pct;
                count += 1;
            }
        }
        return if count > 0 {
            Some(total / count as f64)
        } else {
            None
        };
    }

    let mut weighted_sum = 0.0_f64;
    let mut total_weight = 0.0_f64;
    for entry in type_breakdown(scores, assessments, weights) {
        let Some(avg) = entry.average else {
            continue;
        };
        weighted_sum += avg * (entry.weight_percent / 100.0);
        total_weight += entry.weight_percent;
    }

    if total_weight > 0.0 {
        Some((weighted_sum / total_weight) * 100.0)
    } else {
        None
    }
}

/// Per-type trim-and-average detail behind `weighted_average`.
///
/// The sort for drop-lowest is stable, so assessments tied on percentage
/// are dropped in original list order. `average` is `None` when the type
/// has no graded work or `drop_lowest` swallowed everything; such entries
/// are skipped by the weighted combination.
pub fn type_breakdown(
    scores: &HashMap<String, AssessmentScore>,
    assessments: &[Assessment],
    weights: &[TypeWeight],
) -> Vec<TypeBreakdown> {
    let mut out = Vec::with_capacity(weights.len());
    for w in weights {
        let mut graded: Vec<(f64, &str)> = Vec::new();
        for a in assessments.iter().filter(|a| a.kind == w.kind) {
            if let Some(pct) = score_percentage(scores, a) {
                graded.push((pct, a.id.as_str()));
            }
        }

        // Stable: ties keep original assessment order.
        graded.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let cut = w.drop_lowest.min(graded.len());
        let dropped: Vec<String> = graded[..cut].iter().map(|(_, id)| id.to_string()).collect();
        let kept = &graded[cut..];

        let average = if kept.is_empty() {
            None
        } else {
            Some(kept.iter().map(|(pct, _)| pct).sum::<f64>() / kept.len() as f64)
        };

        out.push(TypeBreakdown {
            kind: w.kind.clone(),
            weight_percent: w.weight_percent,
            average,
            counted: kept.len(),
            dropped,
        });
    }
    out
}

/// Class-level statistics across the full roster.
///
/// `class_average` is a single ratio of sums (total points earned over
/// total points possible among graded pairs), not a mean of per-student
/// averages, so small-point assessments do not gain disproportionate
/// weight. The distribution buckets each student's already-derived
/// `course_grade` through the supplied scale; rows without a derived grade
/// are not bucketed.
pub fn class_statistics(
    rows: &[StudentGradeRow],
    assessments: &[Assessment],
    scale: &GradingScale,
) -> ClassStatistics {
    let mut total_graded = 0_usize;
    let total_possible = rows.len() * assessments.len();
    let mut total_score = 0.0_f64;
    let mut total_max_score = 0.0_f64;

    for row in rows {
        for a in assessments {
            let Some(sd) = row.scores.get(&a.id) else {
                continue;
            };
            let Some(raw) = sd.score else {
                continue;
            };
            total_graded += 1;
            total_score += raw;
            total_max_score += sd.max_score;
        }
    }

    let mut counts: Vec<usize> = vec![0; scale.letters().len()];
    for row in rows {
        if let Some(grade) = row.course_grade {
            counts[scale.band_index(grade)] += 1;
        }
    }
    let distribution = scale
        .letters()
        .iter()
        .zip(counts)
        .map(|(letter, count)| DistributionBucket {
            letter: letter.to_string(),
            count,
        })
        .collect();

    ClassStatistics {
        class_average: if total_max_score > 0.0 {
            (total_score / total_max_score) * 100.0
        } else {
            0.0
        },
        graded_percentage: if total_possible > 0 {
            (total_graded as f64 / total_possible as f64) * 100.0
        } else {
            0.0
        },
        distribution,
    }
}

pub fn pass_fail_summary(grades: &[f64], threshold: f64) -> PassFailSummary {
    let total = grades.len();
    let passing = grades.iter().filter(|g| **g >= threshold).count();
    let failing = total - passing;
    let (pass_rate, fail_rate) = if total > 0 {
        (
            (passing as f64 / total as f64) * 100.0,
            (failing as f64 / total as f64) * 100.0,
        )
    } else {
        (0.0, 0.0)
    };
    PassFailSummary {
        total,
        passing,
        failing,
        pass_rate,
        fail_rate,
    }
}

pub fn finalize_course_grade(numeric: f64, credit_hours: f64, scale: &GradingScale) -> CourseGrade {
    let rounded = (numeric * 100.0).round() / 100.0;
    let letter = scale.letter_for(rounded).to_string();
    let gpa = gpa_points(&letter);
    CourseGrade {
        numeric_grade: rounded,
        letter_grade: letter,
        gpa_points: gpa,
        credit_hours,
        quality_points: gpa * credit_hours,
    }
}
