use super::entities::{Course, Prerequisite};
use serde::Serialize;
use ts_rs::TS;

/// 课程详情（含先修要求）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseDetailResponse {
    pub course: Course,
    pub prerequisites: Vec<Prerequisite>,
}
