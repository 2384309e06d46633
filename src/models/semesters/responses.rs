use super::entities::Semester;
use serde::Serialize;
use ts_rs::TS;

/// 学期选课窗口状态
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "semester.ts")]
pub struct SemesterStatusResponse {
    pub semester: Semester,
    pub registration_open: bool,
}
