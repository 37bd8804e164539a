//! 账户模型模块
//!
//! 定义 [`Account`] 记录以及账户安全字段的状态机。
//!
//! 安全字段（失败计数、锁定时间）只通过本模块的转换方法变更：
//!
//! - `Unlocked(c)` --成功--> `Unlocked(0)`
//! - `Unlocked(c)` --失败, c+1 < 阈值--> `Unlocked(c+1)`
//! - `Unlocked(c)` --失败, c+1 >= 阈值--> `Locked(now + 时长)`
//! - `Locked(until)`, now >= until, 成功 --> `Unlocked(0)`
//! - `Locked(until)`, now >= until, 失败 --> `Unlocked(1)`
//!
//! 锁定仅靠时间戳比较被动过期，没有后台解锁任务；`locked_until`
//! 可以无限期地停留在过去，直到下一次登录尝试重算状态。
//!
//! 所有方法都接收显式的 `now` 参数，状态机本身不读取系统时钟，
//! 便于测试中模拟时间推进。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 账户记录
///
/// `username` 创建后不可变，大小写敏感；`email` 存储前已统一小写。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// 账户唯一标识符
    pub id: String,

    /// 用户名（登录标识，唯一）
    pub username: String,

    /// 邮箱（小写存储，唯一）
    pub email: String,

    /// 密码哈希（自适应单向哈希，永不存储明文）
    pub password_hash: String,

    /// 当前失败登录次数
    pub failed_attempts: u32,

    /// 锁定结束时间；`None` 表示未锁定
    pub locked_until: Option<DateTime<Utc>>,

    /// 最后一次成功登录时间
    pub last_login_at: Option<DateTime<Utc>>,

    /// 创建时间
    pub created_at: DateTime<Utc>,

    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// 创建新账户
    ///
    /// 初始状态为 `Unlocked(0)`：失败计数为 0，未锁定。
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            failed_attempts: 0,
            locked_until: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 检查账户在 `now` 时刻是否被锁定
    ///
    /// 锁定的定义：`locked_until` 存在且晚于 `now`。
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        match self.locked_until {
            Some(until) => until > now,
            None => false,
        }
    }

    /// 获取 `now` 时刻的剩余锁定时间
    ///
    /// 未锁定时返回 `None`。
    pub fn remaining_lockout(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.locked_until.and_then(|until| {
            if until > now {
                Some(until - now)
            } else {
                None
            }
        })
    }

    /// 锁定账户到 `now + duration`
    pub fn lock(&mut self, now: DateTime<Utc>, duration: Duration) {
        self.locked_until = Some(now + duration);
        self.updated_at = now;
    }

    /// 解锁账户并清零失败计数
    pub fn unlock(&mut self, now: DateTime<Utc>) {
        self.locked_until = None;
        self.failed_attempts = 0;
        self.updated_at = now;
    }

    /// 记录一次成功验证
    ///
    /// 失败计数精确归零，清除锁定，更新最后登录时间。
    pub fn register_success(&mut self, now: DateTime<Utc>) {
        self.failed_attempts = 0;
        self.locked_until = None;
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// 记录一次失败验证
    ///
    /// 若存在已过期的锁定，先执行 `Locked(until) -> Unlocked(1)` 转换
    /// （计数重置为 1）；否则计数加一。新计数达到 `threshold` 且账户
    /// 未处于锁定状态时，锁定到 `now + lockout_duration`。
    ///
    /// 返回本次失败是否触发了锁定。
    pub fn register_failure(
        &mut self,
        now: DateTime<Utc>,
        threshold: u32,
        lockout_duration: Duration,
    ) -> bool {
        if let Some(until) = self.locked_until
            && until <= now
        {
            // 过期锁定：清除后从 1 重新计数
            self.locked_until = None;
            self.failed_attempts = 1;
        } else {
            self.failed_attempts += 1;
        }
        self.updated_at = now;

        if self.failed_attempts >= threshold && !self.is_locked(now) {
            self.lock(now, lockout_duration);
            return true;
        }
        false
    }
}
