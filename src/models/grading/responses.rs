use super::entities::{ComponentScore, GradingComponent};
use crate::models::enrollments::entities::Enrollment;
use serde::Serialize;
use ts_rs::TS;

/// 课程评分项及权重合计
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "grading.ts")]
pub struct GradingSchemeResponse {
    pub components: Vec<GradingComponent>,
    pub total_weight: f64,
}

/// 选课记录的各项得分
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "grading.ts")]
pub struct EnrollmentScoresResponse {
    pub enrollment_id: i64,
    pub scores: Vec<ComponentScore>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "grading.ts")]
pub struct FinalizeGradeResponse {
    pub enrollment: Enrollment,
    pub final_score: f64,
    pub letter_grade: String,
}
