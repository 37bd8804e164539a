//! Token 模块
//!
//! 定义会话凭证签发的 [`TokenIssuer`] 能力，以及基于 JWT 的默认实现
//! （需启用 `jwt` feature）。
//!
//! ## 示例
//!
#![cfg_attr(feature = "jwt", doc = "```rust")]
#![cfg_attr(not(feature = "jwt"), doc = "```rust,ignore")]
//! use guardrs::token::{JwtIssuer, TokenIssuer};
//!
//! let issuer = JwtIssuer::new(b"my-secret-key-at-least-32-bytes!");
//! let token = issuer.issue("account_1", "alice").unwrap();
//!
//! let identity = issuer.validate(&token).unwrap();
//! assert_eq!(identity.account_id, "account_1");
//! assert_eq!(identity.username, "alice");
//! ```

#[cfg(feature = "jwt")]
pub mod jwt;

#[cfg(feature = "jwt")]
pub use jwt::{Claims, JwtAlgorithm, JwtBuilder, JwtIssuer, JwtValidator};

use crate::error::Result;

/// 签发 token 所承载的身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    /// 账户唯一标识符
    pub account_id: String,
    /// 用户名
    pub username: String,
}

/// 会话凭证签发能力
///
/// 签发的 token 编码账户 ID、用户名与签发时间，并在配置的时长后过期；
/// `validate` 还原身份或在签名无效/过期时报错。
pub trait TokenIssuer: Send + Sync {
    /// 为指定账户签发会话 token
    fn issue(&self, account_id: &str, username: &str) -> Result<String>;

    /// 验证 token 并还原其身份
    fn validate(&self, token: &str) -> Result<TokenIdentity>;
}
