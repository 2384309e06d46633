//! 业务服务层
//!
//! 每个服务以惰性单例的形式挂在路由模块上，处理函数从请求中取出存储与缓存，
//! 完成权限判定后调用 [`Storage`]，并把结果包装成 [`ApiResponse`]。

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};

use crate::cache::ObjectCache;
use crate::errors::CampusError;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, users::entities::User};
use crate::storage::Storage;

/// 解包 `Result<T, HttpResponse>`，失败时把响应直接返回给客户端
macro_rules! try_or_respond {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(response) => return Ok(response),
        }
    };
}

pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod grading;
pub mod organizations;
pub mod privileges;
pub mod semesters;
pub mod students;
pub mod system;
pub mod users;

pub use auth::AuthService;
pub use courses::CourseService;
pub use enrollments::EnrollmentService;
pub use grading::GradingService;
pub use organizations::OrganizationService;
pub use privileges::PrivilegeService;
pub use semesters::SemesterService;
pub use students::StudentService;
pub use system::SystemService;
pub use users::UserService;

/// 处理函数内部使用的结果类型，错误分支已经是完整的响应
pub(crate) type Respond<T> = std::result::Result<T, HttpResponse>;

pub(crate) fn storage_from_request(request: &HttpRequest) -> Arc<dyn Storage> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .expect("Storage not found in app data")
        .get_ref()
        .clone()
}

pub(crate) fn cache_from_request(request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|cache| cache.get_ref().clone())
}

pub(crate) fn error_response(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::error_empty(code, message))
}

pub(crate) fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, code, message)
}

pub(crate) fn not_found(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    error_response(StatusCode::NOT_FOUND, code, message)
}

pub(crate) fn forbidden(message: impl Into<String>) -> HttpResponse {
    error_response(StatusCode::FORBIDDEN, ErrorCode::PermissionDenied, message)
}

pub(crate) fn unprocessable(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    error_response(StatusCode::UNPROCESSABLE_ENTITY, code, message)
}

/// 存储层错误映射为 HTTP 响应
///
/// 唯一约束冲突为 409，外键等业务规则冲突为 422，两者都使用调用方给出的业务码；
/// 其余错误记录日志后返回 500。
pub(crate) fn storage_error(err: CampusError, code: ErrorCode) -> HttpResponse {
    write_error(err, code, code)
}

/// 写操作的错误映射，唯一冲突与规则冲突使用不同的业务码
pub(crate) fn write_error(
    err: CampusError,
    conflict_code: ErrorCode,
    rule_code: ErrorCode,
) -> HttpResponse {
    let code = conflict_code;
    match err {
        CampusError::Conflict(msg) => error_response(StatusCode::CONFLICT, conflict_code, msg),
        CampusError::RuleViolation(msg) => unprocessable(rule_code, msg),
        CampusError::NotFound(msg) => not_found(code, msg),
        CampusError::Validation(msg) => bad_request(code, msg),
        other => {
            tracing::error!("{}", other.format_simple());
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Internal server error",
            )
        }
    }
}

/// 当前登录用户，未经过 RequireJWT 时返回 401
pub(crate) fn current_user(request: &HttpRequest) -> Respond<User> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )
    })
}

/// 客户端 IP，用于审计日志
pub(crate) fn client_ip(request: &HttpRequest) -> Option<String> {
    request
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_status_mapping() {
        let cases = [
            (CampusError::conflict("dup"), StatusCode::CONFLICT),
            (CampusError::rule_violation("fk"), StatusCode::UNPROCESSABLE_ENTITY),
            (CampusError::not_found("gone"), StatusCode::NOT_FOUND),
            (CampusError::validation("bad"), StatusCode::BAD_REQUEST),
            (
                CampusError::database_operation("boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(storage_error(err, ErrorCode::Conflict).status(), status);
        }
    }
}
