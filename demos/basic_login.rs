//! 基本登录示例
//!
//! 展示如何使用 GuardRS 完成用户注册和登录，并拿到 JWT 会话凭证。
//!
//! 运行: cargo run --example basic_login

use guardrs::guard::AccountGuard;
use guardrs::password::PasswordHasher;
use guardrs::store::InMemoryCredentialStore;
use guardrs::token::{JwtIssuer, TokenIssuer};
use std::sync::Arc;

fn main() {
    let issuer = Arc::new(JwtIssuer::new(b"demo-secret-key-at-least-32-byte").with_issuer("demo"));
    let guard = AccountGuard::new(
        Arc::new(InMemoryCredentialStore::new()),
        Arc::new(PasswordHasher::default()),
        Arc::clone(&issuer) as Arc<dyn TokenIssuer>,
    );

    // 1. 注册
    match guard.register("alice", "alice@example.com", "Valid1Pass!") {
        Ok(account) => println!("注册成功: {} ({})", account.username, account.email),
        Err(e) => {
            println!("注册失败: {}", e.public_message());
            return;
        }
    }

    // 2. 错误密码登录：对外只看到通用消息
    if let Err(e) = guard.login("alice", "wrong password") {
        println!("登录失败: {}", e.public_message());
    }

    // 3. 正确密码登录
    match guard.login("alice", "Valid1Pass!") {
        Ok(session) => {
            println!("登录成功, token: {}...", &session.token[..32.min(session.token.len())]);

            // 4. 验证 token 还原身份
            match issuer.validate(&session.token) {
                Ok(identity) => println!("token 身份: {} ({})", identity.username, identity.account_id),
                Err(e) => println!("token 无效: {}", e),
            }
        }
        Err(e) => println!("登录失败: {}", e.public_message()),
    }
}
