use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("CAMPUS")
                    .separator("__")
                    .try_parsing(true),
            );

        // 常用环境变量的快捷覆盖
        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("cache.redis.url", std::env::var("REDIS_URL").ok())?
            .set_override_option(
                "cache.redis.key_prefix",
                std::env::var("REDIS_KEY_PREFIX").ok(),
            )?
            .set_override_option("cache.default_ttl", std::env::var("CACHE_TTL").ok())?;

        Self::from_config(builder.build()?)
    }

    /// 从已构建的 Config 反序列化并补全派生字段
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let mut app_config: AppConfig = config.try_deserialize()?;

        // 处理工作线程数
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers.max(1));
        }

        app_config.registration.bulk_enroll_limit = app_config
            .registration
            .bulk_enroll_limit
            .clamp(1, super::structs::MAX_BULK_ENROLL_LIMIT);

        if app_config.jwt.secret.is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret must be set (JWT_SECRET)".to_string(),
            ));
        }

        Ok(app_config)
    }

    /// 获取全局配置实例
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// 初始化配置 (在应用启动时调用)
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 获取 Unix 套接字路径 (如果配置了)
    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const SAMPLE: &str = r#"
[app]
system_name = "Campus Admin"
environment = "production"
log_level = "info"

[server]
host = "127.0.0.1"
port = 8080
unix_socket_path = ""
workers = 0
max_workers = 4

[server.timeouts]
client_request = 5000
client_disconnect = 1000
keep_alive = 30

[server.limits]
max_payload_size = 1048576

[jwt]
secret = "test-secret"
access_token_expiry = 15
refresh_token_expiry = 7
refresh_token_remember_me_expiry = 30

[database]
url = "campus.db"
pool_size = 4
timeout = 10

[cache]
type = "moka"
default_ttl = 300

[cache.redis]
url = "redis://127.0.0.1/"
key_prefix = "campus:"
pool_size = 4

[cache.memory]
max_capacity = 1000

[cors]
allowed_origins = ["http://localhost:5173"]
allowed_methods = ["GET", "POST"]
allowed_headers = ["Authorization"]
max_age = 3600

[argon2]
memory_cost = 19456
time_cost = 2
parallelism = 1

[registration]
max_credits_per_semester = 18
min_passing_score = 50.0
allow_late_registration = false
allow_retake = true
student_self_enrollment = true
bulk_enroll_limit = 200
"#;

    fn sample_config(overrides: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let mut builder = Config::builder().add_source(File::from_str(SAMPLE, FileFormat::Toml));
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        AppConfig::from_config(builder.build()?)
    }

    #[test]
    fn test_load_sample_config() {
        let config = sample_config(&[]).expect("sample config should load");
        assert!(config.is_production());
        assert_eq!(config.server_bind_address(), "127.0.0.1:8080");
        assert_eq!(config.registration.max_credits_per_semester, 18);
        assert!(config.registration.allow_retake);
        assert_eq!(config.cache.cache_type, "moka");
    }

    #[test]
    fn test_zero_workers_resolved() {
        let config = sample_config(&[]).expect("sample config should load");
        assert!(config.server.workers >= 1);
        assert!(config.server.workers <= 4);
    }

    #[test]
    fn test_empty_jwt_secret_rejected() {
        let result = sample_config(&[("jwt.secret", "")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bulk_enroll_limit_clamped() {
        let config = sample_config(&[("registration.bulk_enroll_limit", "10000")])
            .expect("sample config should load");
        assert_eq!(config.registration.bulk_enroll_limit, 500);

        let config = sample_config(&[("registration.bulk_enroll_limit", "0")])
            .expect("sample config should load");
        assert_eq!(config.registration.bulk_enroll_limit, 1);

        let config = sample_config(&[]).expect("sample config should load");
        assert_eq!(config.registration.bulk_enroll_limit, 200);
    }
}
