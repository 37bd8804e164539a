//! 统一错误类型模块
//!
//! 提供 guardrs 库中所有操作的错误类型定义。
//!
//! 认证失败（[`AuthError`]）与基础设施故障（[`StorageError`] 等）严格区分：
//! 存储层故障永远不会被误报为"密码错误"。

use chrono::Duration;
use std::fmt;

/// guardrs 库的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// guardrs 库的错误类型
#[derive(Debug)]
pub enum Error {
    /// 认证相关错误（登录流程的业务结果）
    Auth(AuthError),

    /// 密码哈希错误
    PasswordHash(PasswordHashError),

    /// Token 相关错误
    Token(TokenError),

    /// 验证错误（注册输入校验）
    Validation(ValidationError),

    /// 配置错误
    Config(ConfigError),

    /// 存储错误
    Storage(StorageError),

    /// 加密错误
    Crypto(CryptoError),

    /// 内部错误
    Internal(String),

    /// 其他错误
    Other(String),
}

impl Error {
    /// 创建一个内部错误
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// 创建一个验证错误
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(ValidationError::Custom(msg.into()))
    }

    /// 渲染对外边界的用户可见消息
    ///
    /// `NotFound` 与 `InvalidCredentials` 在这里折叠为同一条通用消息，
    /// 防止通过响应差异枚举用户名。锁定消息不包含具体解锁时间点。
    /// 基础设施错误一律渲染为通用失败消息，不泄漏内部细节。
    pub fn public_message(&self) -> String {
        match self {
            Error::Auth(AuthError::NotFound) | Error::Auth(AuthError::InvalidCredentials) => {
                "Invalid username or password".to_string()
            }
            Error::Auth(AuthError::AccountLocked { .. }) => {
                "Account is temporarily locked due to multiple failed login attempts. \
                 Please try again later."
                    .to_string()
            }
            Error::Validation(e) => e.to_string(),
            _ => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

/// 认证相关错误
///
/// `NotFound` 仅供内部调用方区分；对外边界必须通过
/// [`Error::public_message`] 与 `InvalidCredentials` 折叠为同一消息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// 用户名不存在
    NotFound,
    /// 凭证无效（密码验证失败）
    InvalidCredentials,
    /// 账户被锁定
    AccountLocked {
        /// 剩余锁定时间（产品决策：暴露剩余时长而非解锁时间点）
        remaining: Option<Duration>,
    },
}

/// 密码哈希相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordHashError {
    /// 哈希生成失败
    HashFailed(String),
    /// 无效的哈希格式
    InvalidFormat(String),
    /// 算法不支持
    UnsupportedAlgorithm(String),
}

/// Token 相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token 已过期
    Expired,
    /// Token 格式无效
    InvalidFormat(String),
    /// Token 签名无效
    InvalidSignature,
    /// Token 编码失败
    EncodingFailed(String),
    /// Token 解码失败
    DecodingFailed(String),
    /// 缺少必需的 claim
    MissingClaim(String),
}

/// 验证相关错误（注册输入校验）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// 字段为空
    EmptyField(String),
    /// 无效的用户名格式
    InvalidUsername(String),
    /// 无效的邮箱格式
    InvalidEmail(String),
    /// 密码太短
    PasswordTooShort { min_length: usize, actual: usize },
    /// 密码强度不足
    PasswordTooWeak(String),
    /// 用户名已被占用
    UsernameTaken(String),
    /// 邮箱已被使用
    EmailTaken(String),
    /// 自定义验证错误
    Custom(String),
}

/// 配置相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 缺少必需的配置
    MissingRequired(String),
    /// 无效的配置值
    InvalidValue { key: String, message: String },
}

/// 存储相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// 连接失败
    ConnectionFailed(String),
    /// 记录未找到
    NotFound(String),
    /// 记录已存在
    AlreadyExists(String),
    /// 操作失败
    OperationFailed(String),
}

/// 加密相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// 随机数生成失败
    RngFailed(String),
}

// ============================================================================
// Display 实现
// ============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Auth(e) => write!(f, "Authentication error: {}", e),
            Error::PasswordHash(e) => write!(f, "Password hash error: {}", e),
            Error::Token(e) => write!(f, "Token error: {}", e),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Config(e) => write!(f, "Config error: {}", e),
            Error::Storage(e) => write!(f, "Storage error: {}", e),
            Error::Crypto(e) => write!(f, "Crypto error: {}", e),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NotFound => write!(f, "account not found"),
            AuthError::InvalidCredentials => write!(f, "invalid credentials"),
            AuthError::AccountLocked { remaining } => match remaining {
                Some(d) => write!(f, "account locked, {} seconds remaining", d.num_seconds()),
                None => write!(f, "account locked"),
            },
        }
    }
}

impl fmt::Display for PasswordHashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordHashError::HashFailed(msg) => write!(f, "hash generation failed: {}", msg),
            PasswordHashError::InvalidFormat(msg) => write!(f, "invalid hash format: {}", msg),
            PasswordHashError::UnsupportedAlgorithm(alg) => {
                write!(f, "unsupported algorithm: {}", alg)
            }
        }
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Expired => write!(f, "token has expired"),
            TokenError::InvalidFormat(msg) => write!(f, "invalid token format: {}", msg),
            TokenError::InvalidSignature => write!(f, "invalid token signature"),
            TokenError::EncodingFailed(msg) => write!(f, "token encoding failed: {}", msg),
            TokenError::DecodingFailed(msg) => write!(f, "token decoding failed: {}", msg),
            TokenError::MissingClaim(claim) => write!(f, "missing required claim: {}", claim),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "field '{}' cannot be empty", field),
            ValidationError::InvalidUsername(msg) => write!(f, "{}", msg),
            ValidationError::InvalidEmail(_) => write!(f, "Invalid email format"),
            ValidationError::PasswordTooShort { min_length, actual } => {
                write!(
                    f,
                    "Password must be at least {} characters long (got {})",
                    min_length, actual
                )
            }
            ValidationError::PasswordTooWeak(msg) => write!(f, "{}", msg),
            ValidationError::UsernameTaken(_) => write!(f, "Username is already taken!"),
            ValidationError::EmailTaken(_) => write!(f, "Email is already in use!"),
            ValidationError::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(key) => {
                write!(f, "missing required configuration: {}", key)
            }
            ConfigError::InvalidValue { key, message } => {
                write!(f, "invalid configuration value for '{}': {}", key, message)
            }
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionFailed(msg) => write!(f, "storage connection failed: {}", msg),
            StorageError::NotFound(item) => write!(f, "not found: {}", item),
            StorageError::AlreadyExists(item) => write!(f, "already exists: {}", item),
            StorageError::OperationFailed(msg) => write!(f, "storage operation failed: {}", msg),
        }
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::RngFailed(msg) => write!(f, "random number generation failed: {}", msg),
        }
    }
}

// ============================================================================
// std::error::Error 实现
// ============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl std::error::Error for AuthError {}
impl std::error::Error for PasswordHashError {}
impl std::error::Error for TokenError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for StorageError {}
impl std::error::Error for CryptoError {}

// ============================================================================
// From 实现 - 方便错误转换
// ============================================================================

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}

impl From<PasswordHashError> for Error {
    fn from(err: PasswordHashError) -> Self {
        Error::PasswordHash(err)
    }
}

impl From<TokenError> for Error {
    fn from(err: TokenError) -> Self {
        Error::Token(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Storage(err)
    }
}

impl From<CryptoError> for Error {
    fn from(err: CryptoError) -> Self {
        Error::Crypto(err)
    }
}
