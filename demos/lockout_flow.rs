//! 账户锁定示例
//!
//! 展示失败登录计数、锁定触发、审计事件以及管理员解锁。
//!
//! 运行: cargo run --example lockout_flow

use chrono::Utc;
use guardrs::audit::InMemoryAuditLogger;
use guardrs::guard::{AccountGuard, GuardConfig};
use guardrs::password::PasswordHasher;
use guardrs::store::InMemoryCredentialStore;
use guardrs::token::JwtIssuer;
use std::sync::Arc;

fn main() {
    let audit = Arc::new(InMemoryAuditLogger::new());
    let guard = AccountGuard::new(
        Arc::new(InMemoryCredentialStore::new()),
        Arc::new(PasswordHasher::default()),
        Arc::new(JwtIssuer::new(b"demo-secret-key-at-least-32-byte")),
    )
    .with_config(GuardConfig::default().with_max_failed_attempts(3))
    .expect("config is valid")
    .with_audit_logger(Arc::clone(&audit) as _);

    guard
        .register("bob", "bob@example.com", "Valid1Pass!")
        .expect("registration succeeds");

    // 连续失败直到锁定（本例阈值为 3）
    for i in 1..=3 {
        let result = guard.login("bob", "bad password");
        println!("第 {} 次失败尝试: {}", i, result.unwrap_err().public_message());
    }

    // 锁定后正确密码也被拒绝
    let err = guard.login("bob", "Valid1Pass!").unwrap_err();
    println!("锁定期间正确密码: {}", err.public_message());

    let account = guard.find_account("bob").unwrap().unwrap();
    println!(
        "失败计数 = {}, 剩余锁定 = {:?} 秒",
        account.failed_attempts,
        account
            .remaining_lockout(Utc::now())
            .map(|d| d.num_seconds())
    );

    // 管理员解锁后恢复
    guard.unlock("bob", Utc::now()).expect("unlock succeeds");
    let session = guard.login("bob", "Valid1Pass!").expect("login succeeds");
    println!("解锁后登录成功: {}", session.username);

    // 审计事件回放
    println!("\n审计事件:");
    for event in audit.get_events() {
        println!(
            "  [{}] {:?} user={:?}",
            event.severity,
            event.event_type,
            event.username.as_deref().unwrap_or("-")
        );
    }
}
