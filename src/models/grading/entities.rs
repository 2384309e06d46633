use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 评分项类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "grading.ts")]
pub enum ComponentType {
    Exam,
    Midterm,
    Quiz,
    Assignment,
    Project,
    Lab,
    Participation,
}

string_enum!(ComponentType, "component type" {
    Exam => "exam",
    Midterm => "midterm",
    Quiz => "quiz",
    Assignment => "assignment",
    Project => "project",
    Lab => "lab",
    Participation => "participation",
});

// 课程评分项
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "grading.ts")]
pub struct GradingComponent {
    pub id: i64,
    pub course_id: i64,
    pub name: String,
    pub component_type: ComponentType,
    /// 占总评的百分比，(0, 100]
    pub weight: f64,
    pub max_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// 评分项得分
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "grading.ts")]
pub struct ComponentScore {
    pub id: i64,
    pub enrollment_id: i64,
    pub component_id: i64,
    pub score: f64,
    pub graded_by: Option<i64>,
    pub graded_at: DateTime<Utc>,
}

// 等级成绩
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "grading.ts")]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

string_enum!(LetterGrade, "letter grade" {
    A => "A",
    B => "B",
    C => "C",
    D => "D",
    F => "F",
});

impl LetterGrade {
    /// 百分制分数换算等级：A ≥ 90，B ≥ 80，C ≥ 70，D ≥ 60
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::A
        } else if score >= 80.0 {
            Self::B
        } else if score >= 70.0 {
            Self::C
        } else if score >= 60.0 {
            Self::D
        } else {
            Self::F
        }
    }

    pub fn grade_points(&self) -> f64 {
        match self {
            Self::A => 4.0,
            Self::B => 3.0,
            Self::C => 2.0,
            Self::D => 1.0,
            Self::F => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_grade_boundaries() {
        assert_eq!(LetterGrade::from_score(100.0), LetterGrade::A);
        assert_eq!(LetterGrade::from_score(90.0), LetterGrade::A);
        assert_eq!(LetterGrade::from_score(89.99), LetterGrade::B);
        assert_eq!(LetterGrade::from_score(80.0), LetterGrade::B);
        assert_eq!(LetterGrade::from_score(70.0), LetterGrade::C);
        assert_eq!(LetterGrade::from_score(60.0), LetterGrade::D);
        assert_eq!(LetterGrade::from_score(59.9), LetterGrade::F);
        assert_eq!(LetterGrade::from_score(0.0), LetterGrade::F);
    }

    #[test]
    fn test_grade_points() {
        assert_eq!(LetterGrade::A.grade_points(), 4.0);
        assert_eq!(LetterGrade::D.grade_points(), 1.0);
        assert_eq!(LetterGrade::F.grade_points(), 0.0);
        assert_eq!("B".parse::<LetterGrade>(), Ok(LetterGrade::B));
    }
}
