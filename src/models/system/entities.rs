use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 配置值类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "system.ts")]
pub enum SettingValueType {
    String,
    Integer,
    Float,
    Boolean,
}

string_enum!(SettingValueType, "setting value type" {
    String => "string",
    Integer => "integer",
    Float => "float",
    Boolean => "boolean",
});

impl SettingValueType {
    /// 校验字符串值是否符合类型
    pub fn validate(&self, value: &str) -> Result<(), String> {
        match self {
            SettingValueType::String => Ok(()),
            SettingValueType::Integer => value
                .parse::<i64>()
                .map(|_| ())
                .map_err(|_| format!("'{value}' is not a valid integer")),
            SettingValueType::Float => match value.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(()),
                _ => Err(format!("'{value}' is not a valid number")),
            },
            SettingValueType::Boolean => match value {
                "true" | "false" => Ok(()),
                _ => Err(format!("'{value}' is not a valid boolean (true/false)")),
            },
        }
    }
}

/// 已知配置键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownSettingKey {
    SystemName,
    RefreshTokenExpiry,
    RefreshTokenRememberMeExpiry,
    MaxCreditsPerSemester,
    MinPassingScore,
    AllowLateRegistration,
    AllowRetake,
    StudentSelfEnrollment,
}

impl KnownSettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownSettingKey::SystemName => "app.system_name",
            KnownSettingKey::RefreshTokenExpiry => "jwt.refresh_token_expiry",
            KnownSettingKey::RefreshTokenRememberMeExpiry => "jwt.refresh_token_remember_me_expiry",
            KnownSettingKey::MaxCreditsPerSemester => "registration.max_credits_per_semester",
            KnownSettingKey::MinPassingScore => "registration.min_passing_score",
            KnownSettingKey::AllowLateRegistration => "registration.allow_late_registration",
            KnownSettingKey::AllowRetake => "registration.allow_retake",
            KnownSettingKey::StudentSelfEnrollment => "registration.student_self_enrollment",
        }
    }

    pub fn value_type(&self) -> SettingValueType {
        match self {
            KnownSettingKey::SystemName => SettingValueType::String,
            KnownSettingKey::RefreshTokenExpiry
            | KnownSettingKey::RefreshTokenRememberMeExpiry
            | KnownSettingKey::MaxCreditsPerSemester => SettingValueType::Integer,
            KnownSettingKey::MinPassingScore => SettingValueType::Float,
            KnownSettingKey::AllowLateRegistration
            | KnownSettingKey::AllowRetake
            | KnownSettingKey::StudentSelfEnrollment => SettingValueType::Boolean,
        }
    }

    /// 额外的取值范围校验
    pub fn validate_range(&self, value: &str) -> Result<(), String> {
        match self {
            KnownSettingKey::MaxCreditsPerSemester => match value.parse::<i64>() {
                Ok(v) if (1..=60).contains(&v) => Ok(()),
                _ => Err("max_credits_per_semester must be between 1 and 60".to_string()),
            },
            KnownSettingKey::MinPassingScore => match value.parse::<f64>() {
                Ok(v) if (0.0..=100.0).contains(&v) => Ok(()),
                _ => Err("min_passing_score must be between 0 and 100".to_string()),
            },
            KnownSettingKey::RefreshTokenExpiry
            | KnownSettingKey::RefreshTokenRememberMeExpiry => match value.parse::<i64>() {
                Ok(v) if v > 0 => Ok(()),
                _ => Err("token expiry must be a positive integer".to_string()),
            },
            _ => Ok(()),
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            KnownSettingKey::SystemName,
            KnownSettingKey::RefreshTokenExpiry,
            KnownSettingKey::RefreshTokenRememberMeExpiry,
            KnownSettingKey::MaxCreditsPerSemester,
            KnownSettingKey::MinPassingScore,
            KnownSettingKey::AllowLateRegistration,
            KnownSettingKey::AllowRetake,
            KnownSettingKey::StudentSelfEnrollment,
        ]
    }
}

impl std::str::FromStr for KnownSettingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownSettingKey::all()
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("Unknown setting key: {s}"))
    }
}

/// 系统设置实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "system.ts")]
pub struct SystemSetting {
    pub key: String,
    pub value: String,
    pub value_type: SettingValueType,
    pub description: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub updated_by: Option<i64>,
}

/// 设置审计日志实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "system.ts")]
pub struct SettingAudit {
    pub id: i64,
    pub setting_key: String,
    pub old_value: Option<String>,
    pub new_value: String,
    pub changed_by: i64,
    pub changed_at: chrono::DateTime<chrono::Utc>,
    pub ip_address: Option<String>,
}

/// 当前生效的选课规则
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "system.ts")]
pub struct RegistrationRules {
    pub max_credits_per_semester: i32,
    pub min_passing_score: f64,
    pub allow_late_registration: bool,
    pub allow_retake: bool,
    pub student_self_enrollment: bool,
}

impl From<&crate::config::RegistrationConfig> for RegistrationRules {
    fn from(config: &crate::config::RegistrationConfig) -> Self {
        Self {
            max_credits_per_semester: config.max_credits_per_semester,
            min_passing_score: config.min_passing_score,
            allow_late_registration: config.allow_late_registration,
            allow_retake: config.allow_retake,
            student_self_enrollment: config.student_self_enrollment,
        }
    }
}

impl Default for RegistrationRules {
    fn default() -> Self {
        Self::from(&crate::config::RegistrationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_validation() {
        assert!(SettingValueType::Integer.validate("21").is_ok());
        assert!(SettingValueType::Integer.validate("21.5").is_err());
        assert!(SettingValueType::Float.validate("59.5").is_ok());
        assert!(SettingValueType::Float.validate("NaN").is_err());
        assert!(SettingValueType::Boolean.validate("true").is_ok());
        assert!(SettingValueType::Boolean.validate("yes").is_err());
    }

    #[test]
    fn test_known_key_lookup() {
        let key: KnownSettingKey = "registration.allow_retake".parse().expect("known key");
        assert_eq!(key, KnownSettingKey::AllowRetake);
        assert_eq!(key.value_type(), SettingValueType::Boolean);
        assert!("registration.unknown".parse::<KnownSettingKey>().is_err());
    }

    #[test]
    fn test_range_validation() {
        assert!(
            KnownSettingKey::MaxCreditsPerSemester
                .validate_range("0")
                .is_err()
        );
        assert!(KnownSettingKey::MinPassingScore.validate_range("60").is_ok());
        assert!(KnownSettingKey::MinPassingScore.validate_range("101").is_err());
    }
}
