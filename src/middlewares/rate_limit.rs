/*!
 * 速率限制中间件
 *
 * 固定窗口计数：同一键在 `window_secs` 内最多放行 `max_requests` 次，超出返回 429。
 * 已认证请求按用户 ID 计数，其余按客户端 IP 计数。
 *
 * ```rust,ignore
 * web::resource("/login")
 *     .wrap(RateLimit::login())
 *     .route(web::post().to(login))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::CONTENT_TYPE,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::net::IpAddr;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;

use crate::models::{ApiResponse, ErrorCode, users::entities::User};

/// 计数窗口：(窗口起点 unix 秒, 已计数)
type WindowCounter = (i64, u32);

// 条目最长保留一小时，窗口本身的过期在计数时判断
static RATE_LIMIT_CACHE: Lazy<Cache<String, WindowCounter>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(3600))
        .max_capacity(100_000)
        .build()
});

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window_secs: u64,
    key_prefix: &'static str,
}

impl RateLimit {
    pub fn new(max_requests: u32, window_secs: u64, key_prefix: &'static str) -> Self {
        Self {
            max_requests,
            window_secs,
            key_prefix,
        }
    }

    /// 登录：5 次/分钟/IP
    pub fn login() -> Self {
        Self::new(5, 60, "login")
    }

    /// 刷新令牌：10 次/分钟/IP
    pub fn refresh_token() -> Self {
        Self::new(10, 60, "refresh")
    }

    /// 批量选课：10 次/分钟/用户
    pub fn bulk_enroll() -> Self {
        Self::new(10, 60, "bulk_enroll")
    }
}

/// 在窗口内累加计数，返回 (是否放行, 新计数)
fn advance_window(
    current: Option<WindowCounter>,
    now: i64,
    window_secs: u64,
    max_requests: u32,
) -> (bool, WindowCounter) {
    match current {
        Some((started, count)) if now - started < window_secs as i64 => {
            if count >= max_requests {
                (false, (started, count))
            } else {
                (true, (started, count + 1))
            }
        }
        _ => (true, (now, 1)),
    }
}

/// 获取客户端 IP
///
/// 优先使用连接信息；部署在反向代理后时依赖代理设置的 X-Forwarded-For。
fn extract_client_ip(req: &ServiceRequest) -> String {
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    if let Some(ref ip) = connection_ip
        && ip.parse::<IpAddr>().is_ok()
    {
        return ip.clone();
    }

    if let Some(forwarded) = req.headers().get("X-Forwarded-For")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
        && ip.trim().parse::<IpAddr>().is_ok()
    {
        return ip.trim().to_string();
    }

    connection_ip.unwrap_or_else(|| "unknown".to_string())
}

fn create_rate_limit_response(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", retry_after.to_string()))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            config: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    config: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let config = self.config.clone();

        Box::pin(async move {
            let identifier = req
                .extensions()
                .get::<User>()
                .map(|user| format!("user:{}", user.id))
                .unwrap_or_else(|| format!("ip:{}", extract_client_ip(&req)));
            let cache_key = format!("{}:{}", config.key_prefix, identifier);

            let now = chrono::Utc::now().timestamp();
            let current = RATE_LIMIT_CACHE.get(&cache_key).await;
            let (allowed, counter) =
                advance_window(current, now, config.window_secs, config.max_requests);

            if !allowed {
                warn!(
                    "Rate limit exceeded for key: {} ({}/{})",
                    cache_key, counter.1, config.max_requests
                );
                let retry_after = (counter.0 + config.window_secs as i64 - now).max(1) as u64;
                return Ok(req.into_response(
                    create_rate_limit_response(retry_after).map_into_right_body(),
                ));
            }

            RATE_LIMIT_CACHE.insert(cache_key, counter).await;

            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let login = RateLimit::login();
        assert_eq!((login.max_requests, login.window_secs), (5, 60));
        let refresh = RateLimit::refresh_token();
        assert_eq!((refresh.max_requests, refresh.window_secs), (10, 60));
    }

    #[test]
    fn test_window_counts_and_blocks() {
        let mut state = None;
        for _ in 0..5 {
            let (allowed, next) = advance_window(state, 1_000, 60, 5);
            assert!(allowed);
            state = Some(next);
        }
        let (allowed, _) = advance_window(state, 1_030, 60, 5);
        assert!(!allowed);
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let (allowed, next) = advance_window(Some((1_000, 5)), 1_060, 60, 5);
        assert!(allowed);
        assert_eq!(next, (1_060, 1));
    }
}
