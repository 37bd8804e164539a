//! 注册输入校验模块
//!
//! 提供用户名、邮箱、密码的格式校验。规则与既有部署保持逐位兼容：
//!
//! - 用户名：去除首尾空白后 3–50 个字符，字符集 `[a-zA-Z0-9_.-]`，
//!   大小写敏感；
//! - 邮箱：≤100 个字符，匹配
//!   `^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$`，
//!   存储与唯一性检查前统一小写；
//! - 密码：≥8 个字符，且至少各包含一个数字、小写字母、大写字母和
//!   列表内的特殊字符。

use crate::error::{Error, Result, ValidationError};

/// 用户名最小长度
pub const USERNAME_MIN_LENGTH: usize = 3;

/// 用户名最大长度
pub const USERNAME_MAX_LENGTH: usize = 50;

/// 邮箱最大长度
pub const EMAIL_MAX_LENGTH: usize = 100;

/// 密码最小长度
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// 密码要求的特殊字符集合
pub const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

/// 校验用户名并返回去除首尾空白后的形式
///
/// # Example
///
/// ```rust
/// use guardrs::password::policy::validate_username;
///
/// assert_eq!(validate_username("  alice  ").unwrap(), "alice");
/// assert!(validate_username("ab").is_err());
/// assert!(validate_username("user name").is_err());
/// ```
pub fn validate_username(username: &str) -> Result<String> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(ValidationError::EmptyField(
            "username".to_string(),
        )));
    }

    let length = trimmed.chars().count();
    if length < USERNAME_MIN_LENGTH {
        return Err(Error::Validation(ValidationError::InvalidUsername(
            "Username must be at least 3 characters long".to_string(),
        )));
    }
    if length > USERNAME_MAX_LENGTH {
        return Err(Error::Validation(ValidationError::InvalidUsername(
            "Username must not exceed 50 characters".to_string(),
        )));
    }
    if !trimmed.chars().all(is_username_char) {
        return Err(Error::Validation(ValidationError::InvalidUsername(
            "Username can only contain letters, numbers, dots, dashes, and underscores"
                .to_string(),
        )));
    }

    Ok(trimmed.to_string())
}

/// 校验邮箱并返回小写形式
///
/// # Example
///
/// ```rust
/// use guardrs::password::policy::validate_email;
///
/// assert_eq!(validate_email("Alice@X.com").unwrap(), "alice@x.com");
/// assert!(validate_email("not-an-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(ValidationError::EmptyField(
            "email".to_string(),
        )));
    }
    if trimmed.chars().count() > EMAIL_MAX_LENGTH || !matches_email_pattern(trimmed) {
        return Err(Error::Validation(ValidationError::InvalidEmail(
            trimmed.to_string(),
        )));
    }
    Ok(trimmed.to_lowercase())
}

/// 校验密码强度
///
/// # Example
///
/// ```rust
/// use guardrs::password::policy::validate_password;
///
/// assert!(validate_password("Valid1Pass!").is_ok());
/// assert!(validate_password("alllowercase1!").is_err()); // 缺大写
/// ```
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::Validation(ValidationError::EmptyField(
            "password".to_string(),
        )));
    }

    let length = password.chars().count();
    if length < PASSWORD_MIN_LENGTH {
        return Err(Error::Validation(ValidationError::PasswordTooShort {
            min_length: PASSWORD_MIN_LENGTH,
            actual: length,
        }));
    }

    let classes = analyze_classes(password);
    if !(classes.has_digit && classes.has_lowercase && classes.has_uppercase && classes.has_special)
    {
        return Err(Error::Validation(ValidationError::PasswordTooWeak(
            "Password must contain at least one uppercase letter, one lowercase letter, \
             one number, and one special character"
                .to_string(),
        )));
    }
    Ok(())
}

/// 密码包含的字符类别
#[derive(Debug, Clone, Copy, Default)]
struct CharClasses {
    has_digit: bool,
    has_lowercase: bool,
    has_uppercase: bool,
    has_special: bool,
}

fn analyze_classes(password: &str) -> CharClasses {
    let mut classes = CharClasses::default();
    for c in password.chars() {
        if c.is_ascii_digit() {
            classes.has_digit = true;
        }
        if c.is_ascii_lowercase() {
            classes.has_lowercase = true;
        }
        if c.is_ascii_uppercase() {
            classes.has_uppercase = true;
        }
        if SPECIAL_CHARS.contains(c) {
            classes.has_special = true;
        }
    }
    classes
}

fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'
}

/// 等价于模式 `^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$` 的检查
///
/// 本地部分与域名部分的字符集都不含 `@`，因此恰好存在一个分隔符；
/// 顶级域取域名最后一个 `.` 之后的部分。
fn matches_email_pattern(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') {
        return false;
    }

    if local.is_empty() || !local.chars().all(is_email_local_char) {
        return false;
    }

    let Some((domain_body, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    if domain_body.is_empty() || !domain_body.chars().all(is_email_domain_char) {
        return false;
    }
    tld.chars().count() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_email_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '_' || c == '.' || c == '-'
}

fn is_email_domain_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-'
}
