use super::entities::Student;
use crate::models::enrollments::entities::EnrollmentStatus;
use serde::Serialize;
use ts_rs::TS;

/// 成绩单中的一条选课记录
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct TranscriptEntry {
    pub enrollment_id: i64,
    pub course_id: i64,
    pub course_code: String,
    pub course_title: String,
    pub credits: i32,
    pub semester_id: i64,
    pub semester_name: String,
    pub status: EnrollmentStatus,
    pub final_score: Option<f64>,
    pub letter_grade: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct TranscriptResponse {
    pub student: Student,
    pub entries: Vec<TranscriptEntry>,
    /// 已结课（通过或不及格）的学分
    pub attempted_credits: i32,
    /// 已通过的学分
    pub completed_credits: i32,
    /// 4.0 制绩点，无已结课记录时为空
    pub gpa: Option<f64>,
}
