//! 密码哈希实现
//!
//! 提供密码哈希和验证的核心功能。验证由 argon2 / bcrypt crate 完成，
//! 对密码内容是常量时间比较，不会在第一个不匹配字节上短路。

#[cfg(feature = "argon2")]
use argon2::Argon2;

#[cfg(feature = "argon2")]
use password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};

use crate::error::{Error, PasswordHashError, Result};

/// 密码哈希能力
///
/// [`crate::guard::AccountGuard`] 通过此 trait 使用哈希器；实现必须保证
/// `verify` 对密码内容为常量时间。
pub trait SecretHasher: Send + Sync {
    /// 哈希明文密码
    fn hash(&self, secret: &str) -> Result<String>;

    /// 验证明文密码是否匹配哈希
    ///
    /// 密码错误返回 `Ok(false)`，只有哈希格式损坏等才返回 `Err`。
    fn verify(&self, secret: &str, hash: &str) -> Result<bool>;
}

/// 支持的哈希算法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Argon2id - 推荐的默认算法
    #[cfg(feature = "argon2")]
    Argon2id,

    /// bcrypt - 经典自适应算法，cost 默认 12
    #[cfg(feature = "bcrypt")]
    Bcrypt,
}

// 编译时检查：至少需要启用一个密码哈希算法
#[cfg(not(any(feature = "argon2", feature = "bcrypt")))]
compile_error!(
    "At least one password hashing algorithm (argon2 or bcrypt) must be enabled. Enable one of the password hashing features."
);

#[allow(clippy::derivable_impls)]
impl Default for Algorithm {
    fn default() -> Self {
        #[cfg(feature = "argon2")]
        {
            Algorithm::Argon2id
        }
        #[cfg(all(not(feature = "argon2"), feature = "bcrypt"))]
        {
            Algorithm::Bcrypt
        }
    }
}

/// 密码哈希器配置
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    /// 使用的哈希算法
    algorithm: Algorithm,

    /// bcrypt 的 cost 参数 (4-31, 默认 12)
    #[cfg(feature = "bcrypt")]
    bcrypt_cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            #[cfg(feature = "bcrypt")]
            bcrypt_cost: 12,
        }
    }
}

impl PasswordHasher {
    /// 创建新的密码哈希器
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            #[cfg(feature = "bcrypt")]
            bcrypt_cost: 12,
        }
    }

    /// 设置 bcrypt 的 cost 参数
    ///
    /// # Panics
    ///
    /// 如果 cost 不在 4-31 范围内会 panic
    #[cfg(feature = "bcrypt")]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        assert!(
            (4..=31).contains(&cost),
            "bcrypt cost must be between 4 and 31"
        );
        self.bcrypt_cost = cost;
        self
    }

    /// 哈希密码
    ///
    /// # Example
    ///
    /// ```rust
    /// use guardrs::password::PasswordHasher;
    ///
    /// let hasher = PasswordHasher::default();
    /// let hash = hasher.hash("my_password").unwrap();
    /// # #[cfg(feature = "argon2")]
    /// assert!(hash.starts_with("$argon2"));
    /// ```
    pub fn hash(&self, password: &str) -> Result<String> {
        match self.algorithm {
            #[cfg(feature = "argon2")]
            Algorithm::Argon2id => self.hash_argon2(password),
            #[cfg(feature = "bcrypt")]
            Algorithm::Bcrypt => self.hash_bcrypt(password),
        }
    }

    /// 验证密码
    ///
    /// 自动检测哈希格式。密码正确返回 `Ok(true)`，错误返回 `Ok(false)`。
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        // 自动检测哈希格式
        #[cfg(feature = "argon2")]
        if hash.starts_with("$argon2") {
            return self.verify_argon2(password, hash);
        }
        #[cfg(feature = "bcrypt")]
        if hash.starts_with("$2") {
            return self.verify_bcrypt(password, hash);
        }
        Err(Error::PasswordHash(PasswordHashError::InvalidFormat(
            "unknown hash format".to_string(),
        )))
    }

    /// 检查哈希是否需要重新生成
    ///
    /// 当算法或参数升级时，旧哈希可能需要重新生成
    pub fn needs_rehash(&self, hash: &str) -> bool {
        match self.algorithm {
            #[cfg(feature = "argon2")]
            Algorithm::Argon2id => !hash.starts_with("$argon2id"),
            #[cfg(feature = "bcrypt")]
            Algorithm::Bcrypt => {
                if !hash.starts_with("$2") {
                    return true;
                }
                // 检查 cost 是否匹配
                if let Some(cost_str) = hash.get(4..6)
                    && let Ok(cost) = cost_str.parse::<u32>()
                {
                    return cost < self.bcrypt_cost;
                }
                true
            }
        }
    }

    // ========================================================================
    // Argon2 实现
    // ========================================================================

    #[cfg(feature = "argon2")]
    fn hash_argon2(&self, password: &str) -> Result<String> {
        let mut salt_bytes = [0u8; 16];
        getrandom::fill(&mut salt_bytes).map_err(|e| {
            Error::PasswordHash(PasswordHashError::HashFailed(format!(
                "Failed to generate random salt: {}",
                e
            )))
        })?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| {
            Error::PasswordHash(PasswordHashError::HashFailed(format!(
                "Failed to encode salt: {}",
                e
            )))
        })?;
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| {
                Error::PasswordHash(PasswordHashError::HashFailed(format!(
                    "Argon2 hash failed: {}",
                    e
                )))
            })
    }

    #[cfg(feature = "argon2")]
    fn verify_argon2(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            Error::PasswordHash(PasswordHashError::InvalidFormat(format!(
                "invalid Argon2 hash: {}",
                e
            )))
        })?;

        let argon2 = Argon2::default();
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    // ========================================================================
    // bcrypt 实现
    // ========================================================================

    #[cfg(feature = "bcrypt")]
    fn hash_bcrypt(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.bcrypt_cost).map_err(|e| {
            Error::PasswordHash(PasswordHashError::HashFailed(format!(
                "bcrypt hash failed: {}",
                e
            )))
        })
    }

    #[cfg(feature = "bcrypt")]
    fn verify_bcrypt(&self, password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(|e| {
            Error::PasswordHash(PasswordHashError::InvalidFormat(format!(
                "bcrypt verify failed: {}",
                e
            )))
        })
    }
}

impl SecretHasher for PasswordHasher {
    fn hash(&self, secret: &str) -> Result<String> {
        PasswordHasher::hash(self, secret)
    }

    fn verify(&self, secret: &str, hash: &str) -> Result<bool> {
        PasswordHasher::verify(self, secret, hash)
    }
}

// ============================================================================
// 便捷函数
// ============================================================================

/// 使用默认算法哈希密码
///
/// # Example
///
/// ```rust
/// use guardrs::password::hash_password;
///
/// let hash = hash_password("my_secure_password").unwrap();
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    PasswordHasher::default().hash(password)
}

/// 验证密码是否匹配哈希
///
/// 自动检测哈希格式（支持 Argon2 / bcrypt，取决于启用的 feature）
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    PasswordHasher::default().verify(password, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "argon2")]
    fn test_argon2_hash_and_verify() {
        let hasher = PasswordHasher::new(Algorithm::Argon2id);
        let password = "Valid1Pass!";

        let hash = hasher.hash(password).unwrap();
        assert!(hash.starts_with("$argon2id"));

        assert!(hasher.verify(password, &hash).unwrap());
        assert!(!hasher.verify("wrong_password", &hash).unwrap());
    }

    #[test]
    #[cfg(feature = "bcrypt")]
    fn test_bcrypt_hash_and_verify() {
        let hasher = PasswordHasher::new(Algorithm::Bcrypt).with_bcrypt_cost(4); // 使用低 cost 加快测试
        let password = "Valid1Pass!";

        let hash = hasher.hash(password).unwrap();
        assert!(hash.starts_with("$2"));

        assert!(hasher.verify(password, &hash).unwrap());
        assert!(!hasher.verify("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_convenience_functions() {
        let password = "my_secure_password";

        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        let hasher = PasswordHasher::default();
        let result = hasher.verify("test", "invalid_hash");
        assert!(result.is_err());
    }

    #[test]
    fn test_different_hashes_same_password() {
        let hasher = PasswordHasher::default();
        let password = "same_password";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        // 由于 salt 不同，同一密码每次生成的哈希应该不同
        assert_ne!(hash1, hash2);

        assert!(hasher.verify(password, &hash1).unwrap());
        assert!(hasher.verify(password, &hash2).unwrap());
    }

    #[test]
    #[cfg(feature = "bcrypt")]
    fn test_needs_rehash_bcrypt_cost_upgrade() {
        let hasher = PasswordHasher::new(Algorithm::Bcrypt).with_bcrypt_cost(12);

        let low_cost_hasher = PasswordHasher::new(Algorithm::Bcrypt).with_bcrypt_cost(4);
        let low_cost_hash = low_cost_hasher.hash("test").unwrap();
        assert!(hasher.needs_rehash(&low_cost_hash));
    }

    #[test]
    #[should_panic(expected = "bcrypt cost must be between 4 and 31")]
    #[cfg(feature = "bcrypt")]
    fn test_invalid_bcrypt_cost() {
        PasswordHasher::new(Algorithm::Bcrypt).with_bcrypt_cost(32);
    }

    #[test]
    fn test_trait_object_usage() {
        let hasher: Box<dyn SecretHasher> = Box::new(PasswordHasher::default());
        let hash = hasher.hash("secret").unwrap();
        assert!(hasher.verify("secret", &hash).unwrap());
    }
}
