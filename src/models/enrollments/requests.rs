use super::entities::EnrollmentStatus;
use crate::models::common::{PaginationQuery, deserialize_optional_from_str};
use serde::Deserialize;
use ts_rs::TS;

/// 选课请求，学生本人选课时可省略 `student_id`
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollRequest {
    pub student_id: Option<i64>,
    pub course_id: i64,
    pub semester_id: i64,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct BulkEnrollRequest {
    pub course_id: i64,
    pub semester_id: i64,
    pub student_ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EligibilityQuery {
    pub student_id: Option<i64>,
    pub course_id: i64,
    pub semester_id: i64,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct FinalGradeRequest {
    pub final_score: f64,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct EnrollmentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub student_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_from_str")]
    pub semester_id: Option<i64>,
    pub status: Option<EnrollmentStatus>,
}

// 存储层查询
#[derive(Debug, Clone, Default)]
pub struct EnrollmentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub student_id: Option<i64>,
    pub course_id: Option<i64>,
    pub semester_id: Option<i64>,
    pub status: Option<EnrollmentStatus>,
}

impl From<EnrollmentListParams> for EnrollmentListQuery {
    fn from(params: EnrollmentListParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            student_id: params.student_id,
            course_id: params.course_id,
            semester_id: params.semester_id,
            status: params.status,
        }
    }
}
