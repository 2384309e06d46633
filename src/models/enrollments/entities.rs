use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 选课状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "enrollment.ts")]
pub enum EnrollmentStatus {
    Enrolled,  // 在修
    Dropped,   // 已退课
    Completed, // 已通过
    Failed,    // 未通过
}

string_enum!(EnrollmentStatus, "enrollment status" {
    Enrolled => "enrolled",
    Dropped => "dropped",
    Completed => "completed",
    Failed => "failed",
});

impl EnrollmentStatus {
    /// 占用课程名额与学期学分的状态
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Enrolled)
    }

    /// 已给出最终成绩
    pub fn is_finalized(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

// 选课记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub semester_id: i64,
    pub status: EnrollmentStatus,
    pub final_score: Option<f64>,
    pub letter_grade: Option<String>,
    pub enrolled_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 不满足选课条件的原因
///
/// 检查按固定顺序进行，返回的列表保持该顺序。
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "rule", rename_all = "snake_case")]
#[ts(export, export_to = "enrollment.ts")]
pub enum IneligibilityReason {
    StudentNotActive {
        status: String,
    },
    CourseInactive,
    RegistrationClosed {
        opens_at: DateTime<Utc>,
        closes_at: DateTime<Utc>,
    },
    AlreadyEnrolled {
        enrollment_id: i64,
    },
    AlreadyCompleted {
        enrollment_id: i64,
    },
    PrerequisiteNotMet {
        course_code: String,
        required_score: f64,
    },
    CourseFull {
        capacity: i32,
    },
    CreditLimitExceeded {
        current: i32,
        requested: i32,
        limit: i32,
    },
}

impl IneligibilityReason {
    pub fn message(&self) -> String {
        match self {
            Self::StudentNotActive { status } => {
                format!("Student is not active (status: {status})")
            }
            Self::CourseInactive => "Course is not open for enrollment".to_string(),
            Self::RegistrationClosed {
                opens_at,
                closes_at,
            } => format!(
                "Registration window is closed ({} - {})",
                opens_at.to_rfc3339(),
                closes_at.to_rfc3339()
            ),
            Self::AlreadyEnrolled { .. } => {
                "Student is already enrolled in this course for the semester".to_string()
            }
            Self::AlreadyCompleted { .. } => "Student has already passed this course".to_string(),
            Self::PrerequisiteNotMet {
                course_code,
                required_score,
            } => format!("Prerequisite {course_code} not met (minimum score {required_score})"),
            Self::CourseFull { capacity } => format!("Course is full (capacity {capacity})"),
            Self::CreditLimitExceeded {
                current,
                requested,
                limit,
            } => format!(
                "Credit limit exceeded: {current} + {requested} > {limit} credits per semester"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_flags() {
        assert!(EnrollmentStatus::Enrolled.is_active());
        assert!(!EnrollmentStatus::Dropped.is_active());
        assert!(EnrollmentStatus::Failed.is_finalized());
        assert!(!EnrollmentStatus::Enrolled.is_finalized());
    }

    #[test]
    fn test_reason_serialization_is_tagged() {
        let reason = IneligibilityReason::PrerequisiteNotMet {
            course_code: "CS101".into(),
            required_score: 60.0,
        };
        let value = serde_json::to_value(&reason).expect("serializable");
        assert_eq!(value["rule"], "prerequisite_not_met");
        assert_eq!(value["course_code"], "CS101");

        let value = serde_json::to_value(IneligibilityReason::CourseInactive).expect("serializable");
        assert_eq!(value["rule"], "course_inactive");
    }
}
