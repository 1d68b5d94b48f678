use parking_lot::{Condvar, MutexGuard};
use spark_transport::Deadline;
use std::time::{Duration, Instant};

/// 取消令牌没有唤醒回调，阻塞的拨号按该间隔醒来检查。
pub(crate) const CANCELLATION_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// 在条件变量上等待，直至被唤醒或抵达截止时间。
///
/// 每次调用都以当前截止时间为上限单独计时，不存在跨调用的定时器；
/// 截止时间被修改时由修改方广播唤醒，等待方醒来后重新读取最新值。
/// 返回后调用方必须重新检查自己的条件（允许虚假唤醒）。
pub(crate) fn wait_until_deadline<T>(
    condvar: &Condvar,
    guard: &mut MutexGuard<'_, T>,
    deadline: Deadline,
) {
    match deadline.instant() {
        Some(instant) => {
            let _ = condvar.wait_until(guard, instant);
        }
        None => condvar.wait(guard),
    }
}

/// 将截止时间收紧到下一次取消轮询点。
pub(crate) fn poll_deadline(deadline: Deadline, now: Instant) -> Deadline {
    let tick = now
        .checked_add(CANCELLATION_POLL_INTERVAL)
        .map_or_else(Deadline::none, Deadline::at);
    deadline.earliest(tick)
}
