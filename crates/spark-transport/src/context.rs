use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// 截止原语，统一描述阻塞操作的最迟完成时间。
///
/// # 设计背景（Why）
/// - 套接字语义要求读写与建连都可以被“绝对时间点”打断，而不是一次性计时器：
///   截止时间过去后，**每一次**后续操作都必须立即超时，直到截止被清除或推后。
/// - 以 `Option<Instant>` 表达“零值即无截止”，对应 `Deadline::none()`。
///
/// # 契约说明（What）
/// - `is_expired(now)` 在 `now >= instant` 时返回 `true`；未设置截止时恒为 `false`。
/// - 截止时间基于单调时钟 [`Instant`]，不受系统壁钟跳变影响。
///
/// # 风险提示（Trade-offs）
/// - 截止时间本身不会驱动任何唤醒，等待方需要以该时间点为上限执行带超时的等待。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Deadline {
    instant: Option<Instant>,
}

impl Deadline {
    /// 创建未设置截止时间的实例。
    pub const fn none() -> Self {
        Self { instant: None }
    }

    /// 根据绝对时间点构造截止时间。
    pub const fn at(instant: Instant) -> Self {
        Self {
            instant: Some(instant),
        }
    }

    /// 以当前时间加持续时间生成截止时间。
    pub fn after(timeout: Duration) -> Self {
        let now = Instant::now();
        Self::at(now.checked_add(timeout).unwrap_or(now))
    }

    /// 返回内部时间点。
    pub const fn instant(&self) -> Option<Instant> {
        self.instant
    }

    /// 是否未设置截止时间。
    pub const fn is_none(&self) -> bool {
        self.instant.is_none()
    }

    /// 判断在 `now` 时刻是否已经超时。
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.instant {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }

    /// 计算距离截止时间的剩余时长；未设置截止时返回 `None`。
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.instant
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// 取两个截止时间中更早的一个，未设置的一方视为无穷远。
    pub fn earliest(self, other: Deadline) -> Deadline {
        match (self.instant, other.instant) {
            (Some(a), Some(b)) => Deadline::at(a.min(b)),
            (Some(_), None) => self,
            (None, _) => other,
        }
    }
}

impl From<Instant> for Deadline {
    fn from(instant: Instant) -> Self {
        Deadline::at(instant)
    }
}

impl From<Option<Instant>> for Deadline {
    fn from(instant: Option<Instant>) -> Self {
        Self { instant }
    }
}

/// 取消原语，统一表达跨线程的可中断性契约。
///
/// # 设计背景（Why）
/// - 建连（`dial`）需要允许调用方从外部主动放弃等待，而不仅仅依赖截止时间。
/// - 通过共享的原子位提供最小可行解，派生实例共享同一取消状态。
///
/// # 逻辑解析（How）
/// - `cancel` 在首次成功设置取消位时返回 `true`，重复调用返回 `false`。
/// - `child` 生成共享同一原子位的派生实例。
///
/// # 设计取舍与风险（Trade-offs）
/// - 未提供回调注册接口；阻塞方需要按固定间隔轮询 `is_cancelled`，取消响应存在毫秒级延迟。
#[derive(Clone, Debug, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    /// 创建处于“未取消”状态的取消令牌。
    pub fn new() -> Self {
        Self::default()
    }

    /// 查询当前是否已被标记取消。
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// 将当前令牌标记为取消。
    ///
    /// 返回值为 `true` 表示本次调用首次触发取消；返回 `false` 表示之前已被取消。
    pub fn cancel(&self) -> bool {
        self.flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// 派生共享同一原子位的子令牌。
    pub fn child(&self) -> Self {
        self.clone()
    }
}

/// 调用上下文：聚合一次阻塞调用的取消令牌与截止时间。
///
/// # 契约说明（What）
/// - 默认上下文永不取消、没有截止时间，对应“无限等待”。
/// - 上下文可廉价克隆，克隆体共享同一取消令牌。
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    cancellation: Cancellation,
    deadline: Deadline,
}

impl CallContext {
    /// 创建上下文构建器。
    pub fn builder() -> CallContextBuilder {
        CallContextBuilder::default()
    }

    /// 以相对超时构造上下文，是 `builder().with_timeout(timeout).build()` 的简写。
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::builder().with_timeout(timeout).build()
    }

    /// 获取取消原语。
    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    /// 查询截止时间。
    pub fn deadline(&self) -> Deadline {
        self.deadline
    }
}

impl fmt::Display for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let deadline = match self.deadline.remaining(Instant::now()) {
            Some(remaining) => format!("{remaining:?}"),
            None => "none".to_string(),
        };
        write!(
            f,
            "CallContext{{cancelled={}, deadline={}}}",
            self.cancellation.is_cancelled(),
            deadline
        )
    }
}

/// [`CallContext`] 构建器。
#[derive(Debug, Default)]
pub struct CallContextBuilder {
    cancellation: Cancellation,
    deadline: Deadline,
}

impl CallContextBuilder {
    /// 设置取消原语。
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// 设置截止时间。
    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    /// 以当前时间加 `timeout` 设置截止时间。
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Deadline::after(timeout))
    }

    /// 构建上下文。
    pub fn build(self) -> CallContext {
        CallContext {
            cancellation: self.cancellation,
            deadline: self.deadline,
        }
    }
}
