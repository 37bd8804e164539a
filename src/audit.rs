//! 审计日志模块
//!
//! 记录账户安全事件：注册、登录成败、锁定与解锁。
//!
//! [`crate::guard::AccountGuard`] 在每次状态转换时产生一条
//! [`SecurityEvent`]；宿主应用实现 [`AuditLogger`] 将事件接入自己的
//! 日志管道，[`InMemoryAuditLogger`] 可用于测试与开发。
//!
//! ## 使用示例
//!
//! ```rust
//! use guardrs::audit::{AuditLogger, InMemoryAuditLogger, SecurityEvent};
//!
//! let logger = InMemoryAuditLogger::new();
//! logger.log(SecurityEvent::login_success("alice"));
//! logger.log(SecurityEvent::login_failed("bob", "invalid credentials"));
//!
//! assert_eq!(logger.get_events().len(), 2);
//! assert_eq!(logger.get_events_by_user("alice").len(), 1);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// 事件严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EventSeverity {
    /// 一般信息
    #[default]
    Info,
    /// 警告
    Warning,
    /// 错误
    Error,
}

impl std::fmt::Display for EventSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventSeverity::Info => write!(f, "INFO"),
            EventSeverity::Warning => write!(f, "WARNING"),
            EventSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// 安全事件类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// 注册成功
    Registered,
    /// 登录成功
    LoginSuccess,
    /// 登录失败
    LoginFailed,
    /// 账户锁定
    AccountLocked,
    /// 账户解锁（管理操作）
    AccountUnlocked,
    /// 自定义事件
    Custom(String),
}

/// 安全事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// 事件时间
    pub timestamp: DateTime<Utc>,

    /// 事件类型
    pub event_type: EventType,

    /// 严重程度
    pub severity: EventSeverity,

    /// 相关用户名
    pub username: Option<String>,

    /// 额外的元数据
    #[serde(default)]
    pub details: HashMap<String, String>,
}

impl SecurityEvent {
    fn new(event_type: EventType, severity: EventSeverity) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            severity,
            username: None,
            details: HashMap::new(),
        }
    }

    /// 注册成功事件
    pub fn registered(username: impl Into<String>) -> Self {
        Self::new(EventType::Registered, EventSeverity::Info).with_username(username)
    }

    /// 登录成功事件
    pub fn login_success(username: impl Into<String>) -> Self {
        Self::new(EventType::LoginSuccess, EventSeverity::Info).with_username(username)
    }

    /// 登录失败事件
    pub fn login_failed(username: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(EventType::LoginFailed, EventSeverity::Warning)
            .with_username(username)
            .with_detail("reason", reason)
    }

    /// 账户锁定事件
    pub fn account_locked(username: impl Into<String>, failed_attempts: u32) -> Self {
        Self::new(EventType::AccountLocked, EventSeverity::Warning)
            .with_username(username)
            .with_detail("failed_attempts", failed_attempts.to_string())
    }

    /// 账户解锁事件
    pub fn account_unlocked(username: impl Into<String>) -> Self {
        Self::new(EventType::AccountUnlocked, EventSeverity::Info).with_username(username)
    }

    /// 自定义事件
    pub fn custom(name: impl Into<String>, severity: EventSeverity) -> Self {
        Self::new(EventType::Custom(name.into()), severity)
    }

    /// 设置相关用户名
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// 添加元数据
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// 审计日志 trait
///
/// 实现此 trait 将安全事件接入宿主的日志系统。记录失败不应影响
/// 认证流程本身，因此 `log` 不返回错误。
pub trait AuditLogger: Send + Sync {
    /// 记录一条安全事件
    fn log(&self, event: SecurityEvent);
}

/// 内存审计日志实现（用于测试和开发）
#[derive(Debug, Default)]
pub struct InMemoryAuditLogger {
    events: RwLock<Vec<SecurityEvent>>,
}

impl InMemoryAuditLogger {
    /// 创建新的内存日志器
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取所有事件的副本
    pub fn get_events(&self) -> Vec<SecurityEvent> {
        self.events.read().map(|e| e.clone()).unwrap_or_default()
    }

    /// 按用户名过滤事件
    pub fn get_events_by_user(&self, username: &str) -> Vec<SecurityEvent> {
        self.get_events()
            .into_iter()
            .filter(|e| e.username.as_deref() == Some(username))
            .collect()
    }

    /// 按严重程度过滤事件
    pub fn get_events_by_severity(&self, severity: EventSeverity) -> Vec<SecurityEvent> {
        self.get_events()
            .into_iter()
            .filter(|e| e.severity == severity)
            .collect()
    }

    /// 清空事件
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.write() {
            events.clear();
        }
    }
}

impl AuditLogger for InMemoryAuditLogger {
    fn log(&self, event: SecurityEvent) {
        if let Ok(mut events) = self.events.write() {
            events.push(event);
        }
    }
}
