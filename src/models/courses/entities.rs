use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const MIN_CREDITS: i32 = 1;
pub const MAX_CREDITS: i32 = 12;

// 课程
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct Course {
    pub id: i64,
    pub department_id: i64,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub credits: i32,
    /// 单个学期的选课人数上限
    pub capacity: i32,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 先修课程要求
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct Prerequisite {
    pub course_id: i64,
    pub prerequisite_id: i64,
    pub prerequisite_code: String,
    pub prerequisite_title: String,
    /// 为空时使用选课规则中的及格分
    pub min_score: Option<f64>,
}
