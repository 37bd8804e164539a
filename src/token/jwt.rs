//! JWT (JSON Web Token) 实现模块
//!
//! 提供 JWT 的创建、验证，以及实现 [`TokenIssuer`] 的 [`JwtIssuer`]。
//!
//! ## 支持的算法
//!
//! - **HS256**: HMAC-SHA256（对称加密，默认）
//! - **HS384**: HMAC-SHA384
//! - **HS512**: HMAC-SHA512
//!
//! ## 示例
//!
//! ```rust
//! use guardrs::token::jwt::{JwtBuilder, JwtValidator};
//!
//! let secret = b"my-secret-key-at-least-32-bytes!";
//! let token = JwtBuilder::new()
//!     .subject("account_1")
//!     .issuer("my-app")
//!     .expires_in_hours(24)
//!     .build_with_secret(secret)
//!     .unwrap();
//!
//! let validator = JwtValidator::new(secret);
//! let claims = validator.validate(&token).unwrap();
//! assert_eq!(claims.sub, Some("account_1".to_string()));
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::HashMap;

use crate::error::{Error, Result, TokenError};
use crate::token::{TokenIdentity, TokenIssuer};

/// JWT 签名算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JwtAlgorithm {
    /// HMAC-SHA256（默认）
    #[default]
    HS256,
    /// HMAC-SHA384
    HS384,
    /// HMAC-SHA512
    HS512,
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(alg: JwtAlgorithm) -> Self {
        match alg {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

/// 标准 JWT Claims
///
/// 包含 JWT 规范定义的标准字段、用户名与自定义字段
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Claims {
    /// 主题（账户 ID）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// 签发者
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// 过期时间（Unix 时间戳）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// 签发时间（Unix 时间戳）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// JWT ID（唯一标识符）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// 用户名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// 自定义字段
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// 创建新的空 Claims
    pub fn new() -> Self {
        Self::default()
    }

    /// 检查 token 是否已过期
    pub fn is_expired(&self) -> bool {
        if let Some(exp) = self.exp {
            Utc::now().timestamp() > exp
        } else {
            false
        }
    }

    /// 获取自定义字段值
    pub fn get_custom<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.custom
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// JWT 构建器
///
/// 使用 Builder 模式创建 JWT token
#[derive(Debug, Clone, Default)]
pub struct JwtBuilder {
    claims: Claims,
    algorithm: JwtAlgorithm,
}

impl JwtBuilder {
    /// 创建新的 JWT 构建器
    pub fn new() -> Self {
        let mut builder = Self::default();
        // 默认设置签发时间
        builder.claims.iat = Some(Utc::now().timestamp());
        builder
    }

    /// 设置主题（Subject），即账户 ID
    pub fn subject(mut self, sub: impl Into<String>) -> Self {
        self.claims.sub = Some(sub.into());
        self
    }

    /// 设置签发者（Issuer）
    pub fn issuer(mut self, iss: impl Into<String>) -> Self {
        self.claims.iss = Some(iss.into());
        self
    }

    /// 设置用户名
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.claims.username = Some(username.into());
        self
    }

    /// 设置过期时间（秒数，从现在开始）
    pub fn expires_in_seconds(mut self, seconds: i64) -> Self {
        self.claims.exp = Some(Utc::now().timestamp() + seconds);
        self
    }

    /// 设置过期时间（分钟数，从现在开始）
    pub fn expires_in_minutes(self, minutes: i64) -> Self {
        self.expires_in_seconds(minutes * 60)
    }

    /// 设置过期时间（小时数，从现在开始）
    pub fn expires_in_hours(self, hours: i64) -> Self {
        self.expires_in_seconds(hours * 3600)
    }

    /// 设置过期时间（Duration）
    pub fn expires_in(mut self, duration: Duration) -> Self {
        self.claims.exp = Some(Utc::now().timestamp() + duration.num_seconds());
        self
    }

    /// 设置 JWT ID
    pub fn jwt_id(mut self, jti: impl Into<String>) -> Self {
        self.claims.jti = Some(jti.into());
        self
    }

    /// 自动生成 JWT ID
    pub fn with_random_jwt_id(mut self) -> Self {
        self.claims.jti = Some(crate::random::generate_random_hex(16).unwrap_or_default());
        self
    }

    /// 设置签名算法
    pub fn algorithm(mut self, algorithm: JwtAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// 添加自定义字段
    pub fn claim<V: Serialize>(mut self, key: impl Into<String>, value: V) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.claims.custom.insert(key.into(), json_value);
        }
        self
    }

    /// 使用对称密钥签名并生成 token
    pub fn build_with_secret(self, secret: &[u8]) -> Result<String> {
        let header = Header::new(self.algorithm.into());
        encode(&header, &self.claims, &EncodingKey::from_secret(secret))
            .map_err(|e| Error::Token(TokenError::EncodingFailed(e.to_string())))
    }
}

/// JWT 验证器
#[derive(Clone)]
pub struct JwtValidator {
    decoding_key: DecodingKey,
    algorithm: JwtAlgorithm,
    expected_issuer: Option<String>,
}

impl JwtValidator {
    /// 使用对称密钥创建验证器（默认 HS256）
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: JwtAlgorithm::default(),
            expected_issuer: None,
        }
    }

    /// 设置签名算法
    pub fn with_algorithm(mut self, algorithm: JwtAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// 要求 token 的签发者匹配
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.expected_issuer = Some(issuer.into());
        self
    }

    /// 验证 token 并返回 Claims
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm.into());
        if let Some(iss) = &self.expected_issuer {
            validation.set_issuer(&[iss]);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => Error::Token(TokenError::Expired),
                ErrorKind::InvalidSignature => Error::Token(TokenError::InvalidSignature),
                ErrorKind::InvalidToken => {
                    Error::Token(TokenError::InvalidFormat(e.to_string()))
                }
                _ => Error::Token(TokenError::DecodingFailed(e.to_string())),
            }
        })?;
        Ok(data.claims)
    }
}

/// 基于 JWT 的会话凭证签发器
///
/// 签发的 token 携带账户 ID (`sub`)、用户名、签发时间与过期时间，
/// 默认有效期 24 小时。
#[derive(Clone)]
pub struct JwtIssuer {
    secret: Vec<u8>,
    issuer: Option<String>,
    validity: Duration,
    algorithm: JwtAlgorithm,
}

impl JwtIssuer {
    /// 使用对称密钥创建签发器
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
            issuer: None,
            validity: Duration::hours(24),
            algorithm: JwtAlgorithm::default(),
        }
    }

    /// 设置签发者名称
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// 设置 token 有效期
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    /// 设置签名算法
    pub fn with_algorithm(mut self, algorithm: JwtAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    fn validator(&self) -> JwtValidator {
        let mut validator =
            JwtValidator::new(&self.secret).with_algorithm(self.algorithm);
        if let Some(iss) = &self.issuer {
            validator = validator.with_issuer(iss.clone());
        }
        validator
    }
}

impl std::fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 不打印密钥
        f.debug_struct("JwtIssuer")
            .field("issuer", &self.issuer)
            .field("validity", &self.validity)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, account_id: &str, username: &str) -> Result<String> {
        let mut builder = JwtBuilder::new()
            .subject(account_id)
            .username(username)
            .expires_in(self.validity)
            .with_random_jwt_id()
            .algorithm(self.algorithm);
        if let Some(iss) = &self.issuer {
            builder = builder.issuer(iss.clone());
        }
        builder.build_with_secret(&self.secret)
    }

    fn validate(&self, token: &str) -> Result<TokenIdentity> {
        let claims = self.validator().validate(token)?;
        let account_id = claims
            .sub
            .clone()
            .ok_or_else(|| Error::Token(TokenError::MissingClaim("sub".to_string())))?;
        let username = claims
            .username
            .clone()
            .ok_or_else(|| Error::Token(TokenError::MissingClaim("username".to_string())))?;
        Ok(TokenIdentity {
            account_id,
            username,
        })
    }
}
