use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 大学
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "organization.ts")]
pub struct University {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 学院
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "organization.ts")]
pub struct College {
    pub id: i64,
    pub university_id: i64,
    pub name: String,
    pub code: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 院系
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "organization.ts")]
pub struct Department {
    pub id: i64,
    pub college_id: i64,
    pub name: String,
    pub code: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 院系的上级归属链，用于权限范围判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepartmentLineage {
    pub department_id: i64,
    pub college_id: i64,
    pub university_id: i64,
}
