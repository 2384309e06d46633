//! 路径参数安全提取器
//!
//! 在进入处理函数前完成路径参数校验，失败时直接返回统一格式的 400 响应。

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError,
};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn bad_path_param(message: String) -> actix_web::Error {
    let response =
        HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(message, response).into()
}

/// 解析正整数 ID
fn parse_positive_id(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    let raw = req
        .match_info()
        .get(name)
        .ok_or_else(|| bad_path_param(format!("Missing path parameter: {name}")))?;

    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(bad_path_param(format!("Invalid {name}: {raw}"))),
    }
}

macro_rules! safe_id_extractor {
    ($(#[$meta:meta])* $name:ident, $param:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                ready(parse_positive_id(req, $param).map($name))
            }
        }
    };
}

safe_id_extractor!(
    /// 路径中的 `{id}`
    SafeIDI64,
    "id"
);

safe_id_extractor!(
    /// 路径中的 `{prerequisite_id}`
    SafePrerequisiteIdI64,
    "prerequisite_id"
);

/// 路径中的配置键，仅允许小写字母、数字、`_` 与 `.`
#[derive(Debug, Clone)]
pub struct SafeSettingKey(pub String);

fn is_valid_setting_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 64
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.')
}

impl FromRequest for SafeSettingKey {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.match_info().get("key") {
            Some(key) if is_valid_setting_key(key) => Ok(SafeSettingKey(key.to_string())),
            Some(key) => Err(bad_path_param(format!("Invalid setting key: {key}"))),
            None => Err(bad_path_param("Missing path parameter: key".to_string())),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_safe_id_accepts_positive() {
        let req = TestRequest::default()
            .param("id", "42")
            .to_http_request();
        let id = SafeIDI64::extract(&req).await.expect("valid id");
        assert_eq!(id.0, 42);
    }

    #[actix_web::test]
    async fn test_safe_id_rejects_invalid() {
        for raw in ["0", "-3", "abc", "9999999999999999999999"] {
            let req = TestRequest::default().param("id", raw).to_http_request();
            assert!(SafeIDI64::extract(&req).await.is_err(), "{raw} should be rejected");
        }
    }

    #[actix_web::test]
    async fn test_prerequisite_id_reads_own_param() {
        let req = TestRequest::default()
            .param("id", "1")
            .param("prerequisite_id", "7")
            .to_http_request();
        let id = SafePrerequisiteIdI64::extract(&req).await.expect("valid id");
        assert_eq!(id.0, 7);
    }

    #[test]
    fn test_setting_key_charset() {
        assert!(is_valid_setting_key("registration.max_credits_per_semester"));
        assert!(!is_valid_setting_key("Registration.Max"));
        assert!(!is_valid_setting_key("a/b"));
        assert!(!is_valid_setting_key(""));
    }
}
