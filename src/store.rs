//! 凭证存储模块
//!
//! 定义账户持久化的 [`CredentialStore`] trait 以及内存实现。
//!
//! 存储层承担安全字段的原子性契约：[`CredentialStore::update`] 必须对
//! 单个账户以原子读-改-写方式执行闭包（内存实现持有写锁贯穿整个
//! 读-改-写过程；SQL 实现应使用行级锁或 compare-and-set）。两个并发的
//! 失败尝试都必须计入计数器，不允许丢失更新。

use std::collections::HashMap;
use std::sync::RwLock;

use crate::account::Account;
use crate::error::{Error, Result, StorageError};

/// 凭证存储 trait
///
/// 实现此 trait 以提供账户持久化支持。
pub trait CredentialStore: Send + Sync {
    /// 按用户名查找账户（大小写敏感）
    fn find_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// 保存账户（upsert：不存在则插入，存在则整体覆盖）
    fn save(&self, account: &Account) -> Result<()>;

    /// 对单个账户执行原子读-改-写
    ///
    /// 闭包在存储层的互斥保护下执行，修改后的账户随即持久化并返回。
    /// 账户不存在时返回 [`StorageError::NotFound`]。
    fn update(
        &self,
        username: &str,
        apply: &mut dyn FnMut(&mut Account),
    ) -> Result<Account>;

    /// 检查用户名是否已存在（大小写敏感）
    fn exists_by_username(&self, username: &str) -> Result<bool>;

    /// 检查邮箱是否已存在（调用方保证传入小写）
    fn exists_by_email(&self, email: &str) -> Result<bool>;
}

/// 内存存储实现
///
/// 以用户名为键的 `RwLock<HashMap>`。`update` 持有写锁完成整个
/// 读-改-写，满足原子性契约。
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryCredentialStore {
    /// 创建新的内存存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前存储的账户数量
    pub fn len(&self) -> usize {
        self.accounts.read().map(|m| m.len()).unwrap_or(0)
    }

    /// 存储是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> Error {
    Error::Storage(StorageError::OperationFailed(
        "store lock poisoned".to_string(),
    ))
}

impl CredentialStore for InMemoryCredentialStore {
    fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let map = self.accounts.read().map_err(|_| poisoned())?;
        Ok(map.get(username).cloned())
    }

    fn save(&self, account: &Account) -> Result<()> {
        let mut map = self.accounts.write().map_err(|_| poisoned())?;
        map.insert(account.username.clone(), account.clone());
        Ok(())
    }

    fn update(
        &self,
        username: &str,
        apply: &mut dyn FnMut(&mut Account),
    ) -> Result<Account> {
        let mut map = self.accounts.write().map_err(|_| poisoned())?;
        let account = map
            .get_mut(username)
            .ok_or_else(|| Error::Storage(StorageError::NotFound(username.to_string())))?;
        apply(account);
        Ok(account.clone())
    }

    fn exists_by_username(&self, username: &str) -> Result<bool> {
        let map = self.accounts.read().map_err(|_| poisoned())?;
        Ok(map.contains_key(username))
    }

    fn exists_by_email(&self, email: &str) -> Result<bool> {
        let map = self.accounts.read().map_err(|_| poisoned())?;
        Ok(map.values().any(|a| a.email == email))
    }
}
