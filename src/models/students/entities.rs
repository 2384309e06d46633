use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 学籍状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "student.ts")]
pub enum StudentStatus {
    Active,    // 在读
    Suspended, // 休学/停学
    Graduated, // 已毕业
    Withdrawn, // 已退学
}

string_enum!(StudentStatus, "student status" {
    Active => "active",
    Suspended => "suspended",
    Graduated => "graduated",
    Withdrawn => "withdrawn",
});

// 学生档案
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct Student {
    pub id: i64,
    /// 关联的登录账号
    pub user_id: Option<i64>,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department_id: i64,
    pub enrollment_year: i32,
    pub status: StudentStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Student {
    pub fn is_active(&self) -> bool {
        self.status == StudentStatus::Active
    }
}
