use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::auth::responses::{RefreshTokenResponse, UserInfoResponse};
use crate::models::{ApiResponse, ErrorCode, users::entities::UserRole};
use crate::services::{current_user, storage_error};
use crate::utils::jwt;

use super::AuthService;

fn invalid_refresh(message: &str) -> HttpResponse {
    // 清除无效的 refresh token cookie
    HttpResponse::Unauthorized()
        .cookie(jwt::JwtUtils::create_empty_refresh_token_cookie())
        .json(ApiResponse::error_empty(
            ErrorCode::InvalidRefreshToken,
            message,
        ))
}

/// 用 cookie 中的 refresh token 换取新的 access token
///
/// 用户已删除或被停用时拒绝，并清除 cookie。
pub async fn handle_refresh_token(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();

    let Some(refresh_token) = jwt::JwtUtils::extract_refresh_token_from_cookie(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };

    let claims = match jwt::JwtUtils::verify_refresh_token(&refresh_token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::info!("Refresh token rejected: {}", e);
            return Ok(invalid_refresh(
                "Login expired or invalid, please login again",
            ));
        }
    };

    let Some(user_id) = claims.user_id() else {
        return Ok(invalid_refresh("Invalid user ID in token"));
    };

    let storage = service.get_storage(request);
    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) if user.is_active() => user,
        Ok(_) => return Ok(invalid_refresh("User no longer exists or is not active")),
        Err(e) => return Ok(storage_error(e, ErrorCode::InternalServerError)),
    };

    // 角色以数据库为准，旧令牌中的角色可能已变化
    match jwt::JwtUtils::generate_access_token(user.id, user.role.as_str()) {
        Ok(access_token) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            RefreshTokenResponse {
                access_token,
                expires_in: config.jwt.access_token_expiry * 60,
            },
            "Token refreshed successfully",
        ))),
        Err(e) => {
            tracing::error!("Failed to generate access token: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Unable to generate token",
                )),
            )
        }
    }
}

/// 当前用户信息，附带学生档案与管理权限
pub async fn handle_get_user(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_or_respond!(current_user(request));
    let storage = service.get_storage(request);

    let student = match storage.get_student_by_user_id(user.id).await {
        Ok(student) => student,
        Err(e) => return Ok(storage_error(e, ErrorCode::InternalServerError)),
    };

    let privileges = if user.role == UserRole::Admin {
        match storage.list_user_privileges(user.id).await {
            Ok(privileges) => privileges,
            Err(e) => return Ok(storage_error(e, ErrorCode::InternalServerError)),
        }
    } else {
        Vec::new()
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        UserInfoResponse {
            user,
            student,
            privileges,
        },
        "User information retrieved successfully",
    )))
}
