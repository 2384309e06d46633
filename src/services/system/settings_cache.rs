//! 动态配置缓存
//!
//! 启动时从 `system_settings` 表加载，管理员修改配置后同步更新。
//! 缺失或无法解析的配置项回退到配置文件中的值。

use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::models::system::entities::RegistrationRules;

static DYNAMIC_CONFIG: OnceLock<RwLock<DynamicConfigCache>> = OnceLock::new();

#[derive(Debug, Default)]
struct DynamicConfigCache {
    settings: HashMap<String, String>,
}

/// 动态配置访问接口
pub struct DynamicConfig;

impl DynamicConfig {
    /// 初始化缓存，重复调用会整体替换
    pub async fn init(settings: Vec<(String, String)>) {
        let cache = DYNAMIC_CONFIG.get_or_init(|| RwLock::new(DynamicConfigCache::default()));

        let mut guard = cache.write().await;
        guard.settings = settings.into_iter().collect();

        tracing::info!(
            "Dynamic config cache initialized with {} settings",
            guard.settings.len()
        );
    }

    pub async fn update(key: &str, value: &str) {
        if let Some(cache) = DYNAMIC_CONFIG.get() {
            let mut guard = cache.write().await;
            guard.settings.insert(key.to_string(), value.to_string());
            tracing::debug!("Dynamic config updated: {} = {}", key, value);
        }
    }

    async fn get_string(key: &str) -> Option<String> {
        let cache = DYNAMIC_CONFIG.get()?;
        let guard = cache.read().await;
        guard.settings.get(key).cloned()
    }

    async fn get_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
        Self::get_string(key).await.and_then(|v| v.parse().ok())
    }

    pub async fn system_name() -> String {
        Self::get_string("app.system_name")
            .await
            .unwrap_or_else(|| AppConfig::get().app.system_name.clone())
    }

    /// Refresh Token 有效期（天）
    pub async fn refresh_token_expiry() -> i64 {
        Self::get_parsed("jwt.refresh_token_expiry")
            .await
            .unwrap_or_else(|| AppConfig::get().jwt.refresh_token_expiry)
    }

    /// 勾选“记住我”时的 Refresh Token 有效期（天）
    pub async fn refresh_token_remember_me_expiry() -> i64 {
        Self::get_parsed("jwt.refresh_token_remember_me_expiry")
            .await
            .unwrap_or_else(|| AppConfig::get().jwt.refresh_token_remember_me_expiry)
    }

    /// 当前生效的选课规则，逐项回退到配置文件
    pub async fn registration_rules() -> RegistrationRules {
        let defaults = RegistrationRules::from(&AppConfig::get().registration);

        RegistrationRules {
            max_credits_per_semester: Self::get_parsed("registration.max_credits_per_semester")
                .await
                .unwrap_or(defaults.max_credits_per_semester),
            min_passing_score: Self::get_parsed("registration.min_passing_score")
                .await
                .unwrap_or(defaults.min_passing_score),
            allow_late_registration: Self::get_parsed("registration.allow_late_registration")
                .await
                .unwrap_or(defaults.allow_late_registration),
            allow_retake: Self::get_parsed("registration.allow_retake")
                .await
                .unwrap_or(defaults.allow_retake),
            student_self_enrollment: Self::get_parsed("registration.student_self_enrollment")
                .await
                .unwrap_or(defaults.student_self_enrollment),
        }
    }
}
