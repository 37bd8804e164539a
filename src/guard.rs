//! 账户守卫模块
//!
//! [`AccountGuard`] 是账户安全核心的入口：决定一次登录尝试是否放行，
//! 并根据结果更新安全状态。协作方（存储、哈希器、token 签发器、审计
//! 日志）全部通过构造函数显式注入，没有任何全局状态或环境时钟。
//!
//! ## 示例
//!
#![cfg_attr(feature = "jwt", doc = "```rust")]
#![cfg_attr(not(feature = "jwt"), doc = "```rust,ignore")]
//! use std::sync::Arc;
//! use guardrs::guard::AccountGuard;
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
//! guard.register("alice", "alice@x.com", "Valid1Pass!").unwrap();
//! let session = guard.login("alice", "Valid1Pass!").unwrap();
//! assert_eq!(session.username, "alice");
//! ```

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::account::Account;
use crate::audit::{AuditLogger, SecurityEvent};
use crate::error::{AuthError, Error, Result, ValidationError};
use crate::password::SecretHasher;
use crate::password::policy;
use crate::random;
use crate::store::CredentialStore;
use crate::token::TokenIssuer;

/// 账户守卫配置
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// 触发锁定的失败尝试阈值
    pub max_failed_attempts: u32,

    /// 锁定持续时间
    pub lockout_duration: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_duration: Duration::minutes(30),
        }
    }
}

impl GuardConfig {
    /// 创建严格的安全配置
    pub fn strict() -> Self {
        Self {
            max_failed_attempts: 3,
            lockout_duration: Duration::minutes(60),
        }
    }

    /// 创建宽松的配置（适用于开发环境）
    pub fn relaxed() -> Self {
        Self {
            max_failed_attempts: 10,
            lockout_duration: Duration::minutes(5),
        }
    }

    /// 设置失败尝试阈值
    pub fn with_max_failed_attempts(mut self, max: u32) -> Self {
        self.max_failed_attempts = max;
        self
    }

    /// 设置锁定持续时间
    pub fn with_lockout_duration(mut self, duration: Duration) -> Self {
        self.lockout_duration = duration;
        self
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        if self.max_failed_attempts == 0 {
            return Err(Error::validation(
                "max_failed_attempts must be greater than 0",
            ));
        }
        if self.lockout_duration.num_seconds() <= 0 {
            return Err(Error::validation("lockout_duration must be greater than 0"));
        }
        Ok(())
    }
}

/// 成功登录后返回的会话
#[derive(Debug, Clone)]
pub struct LoginSession {
    /// 签发的会话 token
    pub token: String,
    /// 账户 ID
    pub account_id: String,
    /// 用户名
    pub username: String,
    /// 邮箱
    pub email: String,
}

/// 账户守卫
///
/// 持有一个账户集合的认证状态入口并执行锁定策略。安全字段的每次
/// 变更都通过 [`CredentialStore::update`] 原子落盘：结果先持久化，
/// 然后才返回给调用方，调用方超时不会观察到"已验证未落盘"的中间态。
pub struct AccountGuard {
    config: GuardConfig,
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn SecretHasher>,
    issuer: Arc<dyn TokenIssuer>,
    audit: Option<Arc<dyn AuditLogger>>,
}

impl AccountGuard {
    /// 使用默认配置创建账户守卫
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn SecretHasher>,
        issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            config: GuardConfig::default(),
            store,
            hasher,
            issuer,
            audit: None,
        }
    }

    /// 替换配置
    pub fn with_config(mut self, config: GuardConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// 挂接审计日志器
    pub fn with_audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit = Some(logger);
        self
    }

    /// 获取配置引用
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// 尝试登录（显式时间参数）
    ///
    /// 流程：查找账户 → 锁定检查 → 验证密码 → 原子落盘结果 →
    /// 成功时签发会话 token。
    ///
    /// 失败语义：
    ///
    /// - 用户名不存在 → [`AuthError::NotFound`]（内部区分；对外必须经
    ///   [`Error::public_message`] 与密码错误折叠为同一消息）；
    /// - 账户锁定中 → [`AuthError::AccountLocked`]，携带剩余时长；
    /// - 密码错误 → 失败计数加一（可能触发锁定），返回
    ///   [`AuthError::InvalidCredentials`]。
    pub fn attempt_login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginSession> {
        if username.is_empty() {
            return Err(Error::Validation(ValidationError::EmptyField(
                "username".to_string(),
            )));
        }
        if password.is_empty() {
            return Err(Error::Validation(ValidationError::EmptyField(
                "password".to_string(),
            )));
        }

        let account = self
            .store
            .find_by_username(username)?
            .ok_or(Error::Auth(AuthError::NotFound))?;

        if account.is_locked(now) {
            self.log(SecurityEvent::login_failed(username, "account locked"));
            return Err(Error::Auth(AuthError::AccountLocked {
                remaining: account.remaining_lockout(now),
            }));
        }

        if self.hasher.verify(password, &account.password_hash)? {
            self.handle_success(username, now)
        } else {
            self.handle_failure(username, now)
        }
    }

    /// 尝试登录（使用当前时间）
    pub fn login(&self, username: &str, password: &str) -> Result<LoginSession> {
        self.attempt_login(username, password, Utc::now())
    }

    /// 注册新账户（显式时间参数）
    ///
    /// 校验输入格式与唯一性，哈希密码后持久化。新账户的失败计数为
    /// 0 且未锁定。
    pub fn register_at(
        &self,
        username: &str,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Account> {
        let username = policy::validate_username(username)?;
        let email = policy::validate_email(email)?;
        policy::validate_password(password)?;

        if self.store.exists_by_username(&username)? {
            return Err(Error::Validation(ValidationError::UsernameTaken(username)));
        }
        if self.store.exists_by_email(&email)? {
            return Err(Error::Validation(ValidationError::EmailTaken(email)));
        }

        let password_hash = self.hasher.hash(password)?;
        let id = random::generate_account_id()?;
        let account = Account::new(id, username, email, password_hash, now);
        self.store.save(&account)?;

        self.log(SecurityEvent::registered(&account.username));
        Ok(account)
    }

    /// 注册新账户（使用当前时间）
    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<Account> {
        self.register_at(username, email, password, Utc::now())
    }

    /// 管理操作：解锁账户并清零失败计数
    pub fn unlock(&self, username: &str, now: DateTime<Utc>) -> Result<Account> {
        let account = self.store.update(username, &mut |a| a.unlock(now))?;
        self.log(SecurityEvent::account_unlocked(username));
        Ok(account)
    }

    /// 管理操作：仅清零失败计数
    pub fn reset_failed_attempts(&self, username: &str) -> Result<Account> {
        self.store.update(username, &mut |a| {
            a.failed_attempts = 0;
        })
    }

    /// 按用户名查找账户（供周边资料逻辑使用）
    pub fn find_account(&self, username: &str) -> Result<Option<Account>> {
        self.store.find_by_username(username)
    }

    fn handle_success(&self, username: &str, now: DateTime<Utc>) -> Result<LoginSession> {
        // 先落盘再签发：计数清零必须先于 token 发放
        let updated = self
            .store
            .update(username, &mut |a| a.register_success(now))?;

        let token = self.issuer.issue(&updated.id, &updated.username)?;
        self.log(SecurityEvent::login_success(username));

        Ok(LoginSession {
            token,
            account_id: updated.id,
            username: updated.username,
            email: updated.email,
        })
    }

    fn handle_failure(&self, username: &str, now: DateTime<Utc>) -> Result<LoginSession> {
        let threshold = self.config.max_failed_attempts;
        let duration = self.config.lockout_duration;

        let mut locked = false;
        let updated = self.store.update(username, &mut |a| {
            locked = a.register_failure(now, threshold, duration);
        })?;

        self.log(SecurityEvent::login_failed(username, "invalid credentials"));
        if locked {
            self.log(SecurityEvent::account_locked(
                username,
                updated.failed_attempts,
            ));
        }

        Err(Error::Auth(AuthError::InvalidCredentials))
    }

    fn log(&self, event: SecurityEvent) {
        if let Some(audit) = &self.audit {
            audit.log(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{EventType, InMemoryAuditLogger};
    use crate::store::InMemoryCredentialStore;
    use crate::token::TokenIdentity;

    /// 测试用哈希器：跳过真实的自适应哈希以加快测试
    struct FakeHasher;

    impl SecretHasher for FakeHasher {
        fn hash(&self, secret: &str) -> Result<String> {
            Ok(format!("fake${}", secret))
        }

        fn verify(&self, secret: &str, hash: &str) -> Result<bool> {
            Ok(hash == format!("fake${}", secret))
        }
    }

    /// 测试用签发器
    struct FakeIssuer;

    impl TokenIssuer for FakeIssuer {
        fn issue(&self, account_id: &str, username: &str) -> Result<String> {
            Ok(format!("token:{}:{}", account_id, username))
        }

        fn validate(&self, token: &str) -> Result<TokenIdentity> {
            let mut parts = token.splitn(3, ':').skip(1);
            Ok(TokenIdentity {
                account_id: parts.next().unwrap_or_default().to_string(),
                username: parts.next().unwrap_or_default().to_string(),
            })
        }
    }

    fn guard() -> AccountGuard {
        AccountGuard::new(
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(FakeHasher),
            Arc::new(FakeIssuer),
        )
    }

    #[test]
    fn test_config_presets() {
        let config = GuardConfig::default();
        assert_eq!(config.max_failed_attempts, 5);
        assert_eq!(config.lockout_duration, Duration::minutes(30));
        assert!(config.validate().is_ok());

        assert!(GuardConfig::strict().validate().is_ok());
        assert!(GuardConfig::relaxed().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_zero_threshold() {
        let config = GuardConfig::default().with_max_failed_attempts(0);
        assert!(config.validate().is_err());

        let config = GuardConfig::default().with_lockout_duration(Duration::zero());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_register_then_login() {
        let guard = guard();
        let now = Utc::now();

        let account = guard
            .register_at("alice", "alice@x.com", "Valid1Pass!", now)
            .unwrap();
        assert_eq!(account.failed_attempts, 0);
        assert!(account.locked_until.is_none());

        let session = guard.attempt_login("alice", "Valid1Pass!", now).unwrap();
        assert_eq!(session.username, "alice");
        assert_eq!(session.email, "alice@x.com");
        assert_eq!(session.account_id, account.id);
        assert!(!session.token.is_empty());
    }

    #[test]
    fn test_unknown_user_is_not_found_internally() {
        let guard = guard();
        let err = guard
            .attempt_login("ghost", "whatever", Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::NotFound)));
        // 对外仍是通用消息
        assert_eq!(err.public_message(), "Invalid username or password");
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let guard = guard();
        assert!(matches!(
            guard.attempt_login("", "pw", Utc::now()),
            Err(Error::Validation(ValidationError::EmptyField(_)))
        ));
        assert!(matches!(
            guard.attempt_login("alice", "", Utc::now()),
            Err(Error::Validation(ValidationError::EmptyField(_)))
        ));
    }

    #[test]
    fn test_failures_increment_and_lock_at_threshold() {
        let guard = guard();
        let now = Utc::now();
        guard
            .register_at("alice", "alice@x.com", "Valid1Pass!", now)
            .unwrap();

        for i in 1..=4u32 {
            let err = guard.attempt_login("alice", "wrong", now).unwrap_err();
            assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
            let account = guard.find_account("alice").unwrap().unwrap();
            assert_eq!(account.failed_attempts, i);
            assert!(!account.is_locked(now));
        }

        // 第五次失败触发锁定
        let err = guard.attempt_login("alice", "wrong", now).unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
        let account = guard.find_account("alice").unwrap().unwrap();
        assert!(account.is_locked(now));
        assert_eq!(account.locked_until, Some(now + Duration::minutes(30)));
    }

    #[test]
    fn test_locked_account_rejects_correct_password() {
        let guard = guard();
        let now = Utc::now();
        guard
            .register_at("alice", "alice@x.com", "Valid1Pass!", now)
            .unwrap();
        for _ in 0..5 {
            let _ = guard.attempt_login("alice", "wrong", now);
        }

        let err = guard
            .attempt_login("alice", "Valid1Pass!", now)
            .unwrap_err();
        match err {
            Error::Auth(AuthError::AccountLocked { remaining }) => {
                assert_eq!(remaining, Some(Duration::minutes(30)));
            }
            other => panic!("expected AccountLocked, got {:?}", other),
        }
    }

    #[test]
    fn test_lock_expires_and_correct_login_succeeds() {
        let guard = guard();
        let now = Utc::now();
        guard
            .register_at("alice", "alice@x.com", "Valid1Pass!", now)
            .unwrap();
        for _ in 0..5 {
            let _ = guard.attempt_login("alice", "wrong", now);
        }

        // 锁定期内依旧拒绝
        let in_lock = now + Duration::minutes(29);
        assert!(matches!(
            guard.attempt_login("alice", "Valid1Pass!", in_lock),
            Err(Error::Auth(AuthError::AccountLocked { .. }))
        ));

        // 过期后正确密码放行，计数归零
        let after_lock = now + Duration::minutes(31);
        let session = guard
            .attempt_login("alice", "Valid1Pass!", after_lock)
            .unwrap();
        assert_eq!(session.username, "alice");
        let account = guard.find_account("alice").unwrap().unwrap();
        assert_eq!(account.failed_attempts, 0);
        assert!(account.locked_until.is_none());
    }

    #[test]
    fn test_expired_lock_failure_restarts_counter() {
        let guard = guard();
        let now = Utc::now();
        guard
            .register_at("alice", "alice@x.com", "Valid1Pass!", now)
            .unwrap();
        for _ in 0..5 {
            let _ = guard.attempt_login("alice", "wrong", now);
        }

        let after_lock = now + Duration::minutes(31);
        let _ = guard.attempt_login("alice", "wrong", after_lock);
        let account = guard.find_account("alice").unwrap().unwrap();
        assert_eq!(account.failed_attempts, 1);
        assert!(!account.is_locked(after_lock));
    }

    #[test]
    fn test_success_resets_counter() {
        let guard = guard();
        let now = Utc::now();
        guard
            .register_at("alice", "alice@x.com", "Valid1Pass!", now)
            .unwrap();
        for _ in 0..3 {
            let _ = guard.attempt_login("alice", "wrong", now);
        }

        guard.attempt_login("alice", "Valid1Pass!", now).unwrap();
        let account = guard.find_account("alice").unwrap().unwrap();
        assert_eq!(account.failed_attempts, 0);
        assert_eq!(account.last_login_at, Some(now));
    }

    #[test]
    fn test_duplicate_username_and_email() {
        let guard = guard();
        guard.register("alice", "alice@x.com", "Valid1Pass!").unwrap();

        let err = guard
            .register("alice", "other@x.com", "Valid1Pass!")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::UsernameTaken(_))
        ));

        // 邮箱唯一性检查不区分大小写（小写化后比较）
        let err = guard
            .register("bob", "ALICE@X.COM", "Valid1Pass!")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::EmailTaken(_))
        ));
    }

    #[test]
    fn test_admin_unlock() {
        let guard = guard();
        let now = Utc::now();
        guard
            .register_at("alice", "alice@x.com", "Valid1Pass!", now)
            .unwrap();
        for _ in 0..5 {
            let _ = guard.attempt_login("alice", "wrong", now);
        }
        assert!(guard.find_account("alice").unwrap().unwrap().is_locked(now));

        let account = guard.unlock("alice", now).unwrap();
        assert!(!account.is_locked(now));
        assert_eq!(account.failed_attempts, 0);

        guard.attempt_login("alice", "Valid1Pass!", now).unwrap();
    }

    #[test]
    fn test_audit_events_recorded() {
        let audit = Arc::new(InMemoryAuditLogger::new());
        let guard = guard().with_audit_logger(Arc::clone(&audit) as Arc<dyn AuditLogger>);
        let now = Utc::now();

        guard
            .register_at("alice", "alice@x.com", "Valid1Pass!", now)
            .unwrap();
        for _ in 0..5 {
            let _ = guard.attempt_login("alice", "wrong", now);
        }

        let events = audit.get_events();
        assert!(
            events
                .iter()
                .any(|e| e.event_type == EventType::Registered)
        );
        assert_eq!(
            events
                .iter()
                .filter(|e| e.event_type == EventType::LoginFailed)
                .count(),
            5
        );
        assert!(
            events
                .iter()
                .any(|e| e.event_type == EventType::AccountLocked)
        );
    }
}
