use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 业务错误码
///
/// 以千位划分模块：1xxx 通用，2xxx 认证与用户，3xxx 组织架构，4xxx 学生，
/// 5xxx 课程，6xxx 学期，7xxx 选课，8xxx 成绩，9xxx 权限与系统设置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "api.ts")]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证
    AuthFailed = 2000,
    UserNotActive = 2001,
    PasswordPolicyViolation = 2002,
    InvalidRefreshToken = 2003,

    // 用户
    UserNotFound = 2100,
    UserNameInvalid = 2101,
    UserEmailInvalid = 2102,
    UserAlreadyExists = 2103,
    UserCreationFailed = 2104,
    UserUpdateFailed = 2105,
    UserDeleteFailed = 2106,
    CanNotDeleteCurrentUser = 2107,

    // 组织架构
    UniversityNotFound = 3000,
    CollegeNotFound = 3001,
    DepartmentNotFound = 3002,
    OrganizationAlreadyExists = 3003,
    OrganizationInUse = 3004,

    // 学生
    StudentNotFound = 4000,
    StudentAlreadyExists = 4001,
    StudentInvalid = 4002,

    // 课程
    CourseNotFound = 5000,
    CourseAlreadyExists = 5001,
    CourseInvalid = 5002,
    PrerequisiteInvalid = 5003,
    PrerequisiteCycle = 5004,
    PrerequisiteNotFound = 5005,

    // 学期
    SemesterNotFound = 6000,
    SemesterInvalid = 6001,
    SemesterAlreadyExists = 6002,

    // 选课
    EnrollmentNotFound = 7000,
    EnrollmentNotEligible = 7001,
    EnrollmentStatusInvalid = 7002,
    BulkEnrollLimitExceeded = 7003,
    SelfEnrollmentDisabled = 7004,
    DropDeadlinePassed = 7005,

    // 成绩
    GradingComponentNotFound = 8000,
    GradingComponentAlreadyExists = 8001,
    GradingWeightExceeded = 8002,
    GradingScoreInvalid = 8003,
    GradingIncomplete = 8004,

    // 权限
    PrivilegeNotFound = 9000,
    PrivilegeInvalid = 9001,
    PermissionDenied = 9002,

    // 系统设置
    SettingNotFound = 9500,
    SettingValueInvalid = 9501,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 1004);
        assert_eq!(i32::from(ErrorCode::EnrollmentNotEligible), 7001);
    }
}
