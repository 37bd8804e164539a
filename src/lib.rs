//! # GuardRS
//!
//! 账户安全核心库：凭证验证、失败登录追踪与定时账户锁定。
//!
//! ## 功能特性
//!
//! - **账户守卫**: 登录尝试的锁定策略状态机（失败计数、定时锁定、被动过期）
//! - **密码哈希**: 使用 Argon2 和 bcrypt 进行安全的密码哈希
//! - **注册校验**: 用户名/邮箱/密码的格式与唯一性校验
//! - **JWT Token**: 成功登录后签发带过期时间的会话凭证
//! - **可插拔存储**: 通过 trait 注入凭证存储，内置内存实现
//! - **审计日志**: 记录注册、登录成败、锁定与解锁事件
//!
//! ## Features
//!
//! 本库使用 Cargo features 来允许用户选择性地启用功能：
//!
//! - `argon2` - 启用 Argon2id 密码哈希支持（默认启用）
//! - `bcrypt` - 启用 bcrypt 密码哈希支持（cost 固定默认 12）
//! - `jwt` - 启用 JWT 会话凭证支持（默认启用）
//! - `full` - 启用所有功能
//!
//! ## 登录与锁定示例
//!
#![cfg_attr(feature = "jwt", doc = "```rust")]
#![cfg_attr(not(feature = "jwt"), doc = "```rust,ignore")]
//! use std::sync::Arc;
//! use guardrs::guard::{AccountGuard, GuardConfig};
//! use guardrs::password::PasswordHasher;
//! use guardrs::store::InMemoryCredentialStore;
//! use guardrs::token::JwtIssuer;
//!
//! let guard = AccountGuard::new(
//!     Arc::new(InMemoryCredentialStore::new()),
//!     Arc::new(PasswordHasher::default()),
//!     Arc::new(JwtIssuer::new(b"my-secret-key-at-least-32-bytes!")),
//! );
//!
//! // 注册
//! guard.register("alice", "alice@x.com", "Valid1Pass!").unwrap();
//!
//! // 登录并获得会话 token
//! let session = guard.login("alice", "Valid1Pass!").unwrap();
//! assert!(!session.token.is_empty());
//!
//! // 连续失败会触发锁定（默认 5 次 / 30 分钟）
//! for _ in 0..5 {
//!     let _ = guard.login("alice", "wrong password");
//! }
//! assert!(guard.login("alice", "Valid1Pass!").is_err());
//! ```
//!
//! ## 错误边界
//!
//! 内部调用方可以区分"用户名不存在"与"密码错误"；对外边界必须使用
//! [`Error::public_message`] 渲染，两者折叠为同一条通用消息，防止
//! 用户名枚举。
//!
//! ```rust
//! use guardrs::error::{AuthError, Error};
//!
//! let err = Error::Auth(AuthError::NotFound);
//! assert_eq!(err.public_message(), "Invalid username or password");
//! ```

pub mod account;
pub mod audit;
pub mod error;
pub mod guard;
pub mod password;
pub mod random;
pub mod store;
pub mod token;

pub use error::{Error, Result};

// ============================================================================
// 核心导出
// ============================================================================

pub use account::Account;
pub use guard::{AccountGuard, GuardConfig, LoginSession};
pub use store::{CredentialStore, InMemoryCredentialStore};

// ============================================================================
// 密码相关导出
// ============================================================================

pub use password::{Algorithm, PasswordHasher, SecretHasher, hash_password, verify_password};

// ============================================================================
// Token 相关导出
// ============================================================================

pub use token::{TokenIdentity, TokenIssuer};

#[cfg(feature = "jwt")]
pub use token::JwtIssuer;

// ============================================================================
// 审计相关导出
// ============================================================================

pub use audit::{AuditLogger, InMemoryAuditLogger, SecurityEvent};
