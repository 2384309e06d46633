//! 输入格式校验
//!
//! 返回面向客户端的英文错误信息。

use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{5,16}$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

// 课程、大学、学院、院系代码
static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,31}$").expect("Invalid code regex"));

static STUDENT_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{4,20}$").expect("Invalid student number regex"));

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "12345678",
    "123456789",
    "qwerty123",
    "admin123",
    "abcd1234",
    "welcome1",
    "letmein1",
    "student1",
];

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if !USERNAME_RE.is_match(username) {
        return Err(
            "Username must be 5-16 characters of letters, numbers, underscores or hyphens",
        );
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.len() > 254 || !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

pub fn validate_code(code: &str) -> Result<(), &'static str> {
    if !CODE_RE.is_match(code) {
        return Err("Code must be 1-32 characters of letters, numbers, underscores or hyphens");
    }
    Ok(())
}

pub fn validate_student_number(number: &str) -> Result<(), &'static str> {
    if !STUDENT_NUMBER_RE.is_match(number) {
        return Err("Student number must be 4-20 letters or digits");
    }
    Ok(())
}

/// 名称类字段：去除首尾空白后非空且不超过 `max_len` 个字符
pub fn validate_name(value: &str, max_len: usize) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("Name must not be empty".to_string());
    }
    if trimmed.chars().count() > max_len {
        return Err(format!("Name must be at most {max_len} characters"));
    }
    Ok(())
}

/// 密码策略：至少 8 位，包含大写、小写字母与数字，且不是常见弱密码
///
/// 返回全部未满足的规则。
pub fn password_policy_violations(password: &str) -> Vec<&'static str> {
    let mut violations = Vec::new();

    if password.chars().count() < 8 {
        violations.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("Password must contain at least one digit");
    }
    if COMMON_PASSWORDS
        .iter()
        .any(|weak| password.eq_ignore_ascii_case(weak))
    {
        violations.push("Password is too common, please choose a stronger password");
    }

    violations
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let violations = password_policy_violations(password);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob_the-2nd").is_ok());
        assert!(validate_username("abcd").is_err());
        assert!(validate_username("a-very-long-username").is_err());
        assert!(validate_username("bad name").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("student@uni.edu").is_ok());
        assert!(validate_email("no-at-sign.edu").is_err());
        assert!(validate_email("x@host").is_err());
    }

    #[test]
    fn test_code_and_student_number() {
        assert!(validate_code("CS101").is_ok());
        assert!(validate_code("MATH-2A").is_ok());
        assert!(validate_code("-CS").is_err());
        assert!(validate_code("").is_err());
        assert!(validate_student_number("2024001").is_ok());
        assert!(validate_student_number("12").is_err());
        assert!(validate_student_number("2024-001").is_err());
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("Computer Science", 128).is_ok());
        assert!(validate_name("   ", 128).is_err());
        assert!(validate_name("abcdef", 5).is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("SecurePass123").is_ok());
        assert!(
            password_policy_violations("Ab1")
                .contains(&"Password must be at least 8 characters long")
        );
        assert!(
            password_policy_violations("abcd1234")
                .contains(&"Password must contain at least one uppercase letter")
        );
        assert!(
            password_policy_violations("ABCD1234")
                .contains(&"Password must contain at least one lowercase letter")
        );
        assert!(
            password_policy_violations("AbcdEfgh")
                .contains(&"Password must contain at least one digit")
        );
        assert!(
            password_policy_violations("Password1")
                .contains(&"Password is too common, please choose a stronger password")
        );
    }
}
