//! 密码模块
//!
//! 提供安全的密码哈希、验证以及注册输入校验。
//!
//! ## 支持的算法
//!
//! - **Argon2id** (推荐): 内存硬哈希算法，抵抗 GPU/ASIC 攻击（需启用 `argon2` feature）
//! - **bcrypt**: 经典的自适应密码哈希算法，cost 固定默认 12（需启用 `bcrypt` feature）
//!
//! ## 示例
//!
//! ```rust
//! use guardrs::password::{hash_password, verify_password};
//!
//! let hash = hash_password("my_secure_password").unwrap();
//! assert!(verify_password("my_secure_password", &hash).unwrap());
//! ```
//!
//! ### 注册校验
//!
//! ```rust
//! use guardrs::password::policy::{validate_password, validate_username};
//!
//! assert!(validate_username("alice").is_ok());
//! assert!(validate_password("weak").is_err());
//! assert!(validate_password("Valid1Pass!").is_ok());
//! ```

mod hasher;
pub mod policy;

pub use hasher::{Algorithm, PasswordHasher, SecretHasher, hash_password, verify_password};
