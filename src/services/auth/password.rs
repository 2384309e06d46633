use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::require_jwt::user_cache_key;
use crate::models::{
    ApiResponse, ErrorCode, auth::requests::ChangePasswordRequest,
    users::requests::UpdateUserRequest,
};
use crate::services::{bad_request, cache_from_request, current_user, storage_error};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validate::validate_password;

use super::AuthService;

/// 修改本人密码，需要提供旧密码
pub async fn handle_change_password(
    service: &AuthService,
    body: ChangePasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_or_respond!(current_user(request));
    let storage = service.get_storage(request);

    // 缓存中的用户不含密码哈希，需要重新读取
    let stored = match storage.get_user_by_id(user.id).await {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "User not found",
            )));
        }
        Err(e) => return Ok(storage_error(e, ErrorCode::UserUpdateFailed)),
    };

    if !verify_password(&body.old_password, &stored.password_hash) {
        return Ok(bad_request(
            ErrorCode::AuthFailed,
            "Old password is incorrect",
        ));
    }

    if let Err(msg) = validate_password(&body.new_password) {
        return Ok(bad_request(ErrorCode::PasswordPolicyViolation, msg));
    }

    let password_hash = match hash_password(&body.new_password) {
        Ok(hash) => hash,
        Err(e) => return Ok(storage_error(e, ErrorCode::UserUpdateFailed)),
    };

    let update = UpdateUserRequest {
        password: Some(password_hash),
        ..Default::default()
    };

    match storage.update_user(user.id, update).await {
        Ok(Some(_)) => {
            if let Some(cache) = cache_from_request(request) {
                cache.remove(&user_cache_key(user.id)).await;
            }
            tracing::info!("User {} changed password", user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Password changed successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::UserUpdateFailed)),
    }
}
