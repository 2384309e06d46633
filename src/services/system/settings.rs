use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DynamicConfig, SystemService};
use crate::models::{
    ApiResponse, ErrorCode,
    system::{
        entities::KnownSettingKey,
        requests::{BatchUpdateSettingsRequest, SettingAuditQuery, UpdateSettingRequest},
        responses::{AdminSettingsListResponse, SystemSettingsResponse},
    },
};
use crate::services::{
    Respond, bad_request, client_ip, current_user, not_found, storage_error,
};

/// 校验配置值的类型与取值范围
fn validate_setting(key: &str, value: &str) -> Respond<()> {
    let known: KnownSettingKey = key
        .parse()
        .map_err(|e: String| not_found(ErrorCode::SettingNotFound, e))?;

    known
        .value_type()
        .validate(value)
        .and_then(|_| known.validate_range(value))
        .map_err(|e| bad_request(ErrorCode::SettingValueInvalid, e))
}

/// 公开的系统信息与当前选课规则
pub async fn get_public_settings(
    service: &SystemService,
    _request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();

    let response = SystemSettingsResponse {
        system_name: DynamicConfig::system_name().await,
        environment: config.app.environment.clone(),
        registration: DynamicConfig::registration_rules().await,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Settings retrieved successfully",
    )))
}

pub async fn list_admin_settings(
    service: &SystemService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_all_settings().await {
        Ok(settings) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AdminSettingsListResponse { settings },
            "Admin settings retrieved successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

pub async fn update_setting(
    service: &SystemService,
    key: String,
    body: UpdateSettingRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_or_respond!(current_user(request));
    try_or_respond!(validate_setting(&key, &body.value));

    let storage = service.get_storage(request);
    match storage
        .update_setting(&key, &body.value, user.id, client_ip(request))
        .await
    {
        Ok(setting) => {
            DynamicConfig::update(&setting.key, &setting.value).await;
            tracing::info!("Setting {} updated by user {}", setting.key, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                setting,
                "Setting updated successfully",
            )))
        }
        Err(e) => Ok(storage_error(e, ErrorCode::SettingNotFound)),
    }
}

/// 批量更新：先全部校验，任一项不合法则整体拒绝
pub async fn batch_update_settings(
    service: &SystemService,
    body: BatchUpdateSettingsRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_or_respond!(current_user(request));

    if body.settings.is_empty() {
        return Ok(bad_request(
            ErrorCode::BadRequest,
            "At least one setting is required",
        ));
    }
    for item in &body.settings {
        try_or_respond!(validate_setting(&item.key, &item.value));
    }

    let updates = body
        .settings
        .into_iter()
        .map(|item| (item.key, item.value))
        .collect::<Vec<_>>();

    let storage = service.get_storage(request);
    match storage
        .batch_update_settings(updates, user.id, client_ip(request))
        .await
    {
        Ok(settings) => {
            for setting in &settings {
                DynamicConfig::update(&setting.key, &setting.value).await;
            }
            tracing::info!("{} settings updated by user {}", settings.len(), user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                AdminSettingsListResponse { settings },
                "Settings updated successfully",
            )))
        }
        Err(e) => Ok(storage_error(e, ErrorCode::SettingNotFound)),
    }
}

pub async fn list_setting_audits(
    service: &SystemService,
    query: SettingAuditQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_setting_audits(query).await {
        Ok(audits) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            audits,
            "Setting audits retrieved successfully",
        ))),
        Err(e) => Ok(storage_error(e, ErrorCode::InternalServerError)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_validate_setting_accepts_known_values() {
        assert!(validate_setting("registration.max_credits_per_semester", "24").is_ok());
        assert!(validate_setting("registration.allow_retake", "true").is_ok());
    }

    #[test]
    fn test_validate_setting_rejects_unknown_key() {
        let response = validate_setting("storage.max_size", "10").unwrap_err();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validate_setting_rejects_bad_type_and_range() {
        let response = validate_setting("registration.allow_retake", "yes").unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = validate_setting("registration.min_passing_score", "120").unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
