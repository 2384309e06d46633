/*!
 * JWT 认证中间件
 *
 * 校验 `Authorization: Bearer <token>` 中的 access token，
 * 通过后把当前 [`User`] 放入请求扩展，供后续中间件与处理函数读取。
 *
 * ```rust,ignore
 * web::scope("/api/v1/students")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_students))
 * ```
 *
 * 用户记录按 `user:{id}` 缓存，用户被修改或删除时由用户服务清除。
 */

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::users::entities::User;
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info, warn};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";

pub fn user_cache_key(user_id: i64) -> String {
    format!("user:{user_id}")
}

#[derive(Clone)]
pub struct RequireJWT;

/// 认证失败原因
enum AuthRejection {
    Unauthorized(&'static str),
    Inactive,
    Internal(&'static str),
}

impl AuthRejection {
    fn into_parts(self) -> (StatusCode, ErrorCode, &'static str) {
        match self {
            AuthRejection::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, msg),
            AuthRejection::Inactive => (
                StatusCode::FORBIDDEN,
                ErrorCode::UserNotActive,
                "User account is not active",
            ),
            AuthRejection::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                msg,
            ),
        }
    }
}

async fn load_user(
    cache: &Arc<dyn ObjectCache>,
    storage: &Arc<dyn Storage>,
    user_id: i64,
) -> Result<User, AuthRejection> {
    let key = user_cache_key(user_id);

    match cache.get_raw(&key).await {
        CacheResult::Found(json) => match serde_json::from_str::<User>(&json) {
            Ok(user) => return Ok(user),
            Err(e) => {
                info!("Dropping undecodable cached user {}: {}", user_id, e);
                cache.remove(&key).await;
            }
        },
        _ => debug!("User {} not cached", user_id),
    }

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|e| {
            warn!("Failed to load user {}: {}", user_id, e);
            AuthRejection::Internal("Failed to load user")
        })?
        .ok_or(AuthRejection::Unauthorized("User not found"))?;

    // password_hash 不参与序列化，缓存中的副本不含密码
    if let Ok(json) = serde_json::to_string(&user) {
        cache
            .insert_raw(key, json, AppConfig::get().cache.default_ttl)
            .await;
    }

    Ok(user)
}

async fn authenticate(req: &ServiceRequest) -> Result<User, AuthRejection> {
    let token = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .ok_or(AuthRejection::Unauthorized(
            "Missing or invalid Authorization header",
        ))?;

    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        AuthRejection::Unauthorized("Invalid or expired token")
    })?;

    let user_id = claims
        .user_id()
        .ok_or(AuthRejection::Unauthorized("Invalid user ID in token"))?;

    let (Some(cache), Some(storage)) = (
        req.app_data::<web::Data<Arc<dyn ObjectCache>>>(),
        req.app_data::<web::Data<Arc<dyn Storage>>>(),
    ) else {
        return Err(AuthRejection::Internal("Authentication backend unavailable"));
    };

    let user = load_user(cache.get_ref(), storage.get_ref(), user_id).await?;

    if !user.is_active() {
        return Err(AuthRejection::Inactive);
    }

    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 预检请求直接放行
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match authenticate(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err(rejection) => {
                    let (status, code, message) = rejection.into_parts();
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        message
                    );
                    Ok(req.into_response(
                        create_error_response(status, code, message).map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 当前登录用户，仅在 RequireJWT 之后可用
    pub fn extract_user_claims(req: &actix_web::HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }
}
