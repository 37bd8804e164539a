//! 集成测试：注册校验规则
//!
//! 覆盖用户名/邮箱/密码的格式规则、重复检查以及注册后登录。

use chrono::Utc;
use guardrs::error::{Error, ValidationError};
use guardrs::guard::AccountGuard;
use guardrs::password::{PasswordHasher, verify_password};
use guardrs::store::{CredentialStore, InMemoryCredentialStore};
use guardrs::token::{TokenIdentity, TokenIssuer};
use std::sync::Arc;

/// 注册测试不关心 token 内容，使用简单签发器
struct StaticIssuer;

impl TokenIssuer for StaticIssuer {
    fn issue(&self, account_id: &str, username: &str) -> guardrs::Result<String> {
        Ok(format!("{}:{}", account_id, username))
    }

    fn validate(&self, token: &str) -> guardrs::Result<TokenIdentity> {
        let (account_id, username) = token.split_once(':').unwrap_or_default();
        Ok(TokenIdentity {
            account_id: account_id.to_string(),
            username: username.to_string(),
        })
    }
}

fn build_guard() -> AccountGuard {
    AccountGuard::new(
        Arc::new(InMemoryCredentialStore::new()) as Arc<dyn CredentialStore>,
        Arc::new(PasswordHasher::default()),
        Arc::new(StaticIssuer),
    )
}

#[test]
fn test_successful_registration_hashes_password() {
    let guard = build_guard();
    let account = guard
        .register("alice", "Alice@X.com", "Valid1Pass!")
        .unwrap();

    assert_eq!(account.username, "alice");
    // 邮箱小写存储
    assert_eq!(account.email, "alice@x.com");
    // 存储的是可验证的哈希，绝不是明文
    assert_ne!(account.password_hash, "Valid1Pass!");
    assert!(verify_password("Valid1Pass!", &account.password_hash).unwrap());
}

#[test]
fn test_username_rules() {
    let guard = build_guard();

    // 太短
    assert!(matches!(
        guard.register("ab", "a@x.com", "Valid1Pass!"),
        Err(Error::Validation(ValidationError::InvalidUsername(_)))
    ));

    // 太长（51 个字符）
    let long = "a".repeat(51);
    assert!(guard.register(&long, "b@x.com", "Valid1Pass!").is_err());

    // 非法字符
    assert!(matches!(
        guard.register("user name", "c@x.com", "Valid1Pass!"),
        Err(Error::Validation(ValidationError::InvalidUsername(_)))
    ));

    // 首尾空白被剔除后正常注册
    let account = guard.register("  dave  ", "d@x.com", "Valid1Pass!").unwrap();
    assert_eq!(account.username, "dave");
}

#[test]
fn test_email_rules() {
    let guard = build_guard();

    for bad in ["not-an-email", "a@x", "a@.com", "@x.com", "a@x.c"] {
        assert!(
            matches!(
                guard.register("user1", bad, "Valid1Pass!"),
                Err(Error::Validation(ValidationError::InvalidEmail(_)))
            ),
            "{} should be rejected",
            bad
        );
    }
}

#[test]
fn test_password_rules() {
    let guard = build_guard();

    // 每缺一个字符类别都拒绝
    let cases = [
        ("alllowercase1!", "missing uppercase"),
        ("ALLUPPERCASE1!", "missing lowercase"),
        ("NoDigitsHere!", "missing digit"),
        ("NoSpecial123", "missing special"),
    ];
    for (password, why) in cases {
        assert!(
            matches!(
                guard.register("user2", "u2@x.com", password),
                Err(Error::Validation(ValidationError::PasswordTooWeak(_)))
            ),
            "{} should be rejected ({})",
            password,
            why
        );
    }

    // 太短
    assert!(matches!(
        guard.register("user2", "u2@x.com", "Aa1!abc"),
        Err(Error::Validation(ValidationError::PasswordTooShort { .. }))
    ));
}

#[test]
fn test_duplicate_rejection() {
    let guard = build_guard();
    guard.register("alice", "alice@x.com", "Valid1Pass!").unwrap();

    let err = guard
        .register("alice", "fresh@x.com", "Valid1Pass!")
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UsernameTaken(_))
    ));
    assert_eq!(err.public_message(), "Username is already taken!");

    let err = guard
        .register("bob", "alice@x.com", "Valid1Pass!")
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::EmailTaken(_))
    ));
    assert_eq!(err.public_message(), "Email is already in use!");
}

#[test]
fn test_username_uniqueness_case_sensitive() {
    let guard = build_guard();
    guard.register("Alice", "a1@x.com", "Valid1Pass!").unwrap();

    // 用户名大小写敏感：alice 与 Alice 是不同账户
    let account = guard.register("alice", "a2@x.com", "Valid1Pass!").unwrap();
    assert_eq!(account.username, "alice");
}

#[test]
fn test_register_then_login_round_trip() {
    let guard = build_guard();
    let now = Utc::now();
    guard
        .register_at("frank", "frank@x.com", "Valid1Pass!", now)
        .unwrap();

    let session = guard.attempt_login("frank", "Valid1Pass!", now).unwrap();
    assert_eq!(session.username, "frank");
    assert_eq!(session.email, "frank@x.com");
}
