use super::entities::{Enrollment, IneligibilityReason};
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EligibilityResponse {
    pub eligible: bool,
    pub reasons: Vec<IneligibilityReason>,
}

impl EligibilityResponse {
    pub fn from_reasons(reasons: Vec<IneligibilityReason>) -> Self {
        Self {
            eligible: reasons.is_empty(),
            reasons,
        }
    }
}

// 批量选课单个学生的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "enrollment.ts")]
pub enum BulkEnrollOutcome {
    Enrolled,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct BulkEnrollResult {
    pub student_id: i64,
    pub outcome: BulkEnrollOutcome,
    pub enrollment_id: Option<i64>,
    pub reasons: Vec<IneligibilityReason>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct BulkEnrollResponse {
    pub total: usize,
    pub enrolled: usize,
    pub skipped: usize,
    pub failed: usize,
    pub results: Vec<BulkEnrollResult>,
}

impl BulkEnrollResponse {
    pub fn from_results(results: Vec<BulkEnrollResult>) -> Self {
        let count = |outcome: BulkEnrollOutcome| results.iter().filter(|r| r.outcome == outcome).count();
        Self {
            total: results.len(),
            enrolled: count(BulkEnrollOutcome::Enrolled),
            skipped: count(BulkEnrollOutcome::Skipped),
            failed: count(BulkEnrollOutcome::Failed),
            results,
        }
    }
}

/// 选课失败时返回的数据体
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollmentRejection {
    pub reasons: Vec<IneligibilityReason>,
}

/// 选课记录及课程、学期信息
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollmentDetailResponse {
    pub enrollment: Enrollment,
    pub course_code: String,
    pub course_title: String,
    pub credits: i32,
    pub semester_name: String,
}
