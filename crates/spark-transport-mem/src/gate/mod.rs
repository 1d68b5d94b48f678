//! 截止闸门：带阻塞、背压、截止与关闭语义的单向缓冲区。

mod framing;

pub(crate) use framing::{ByteStream, Framing, Records, Void};

use crate::error::MemTransportError;
use crate::util::wait_until_deadline;
use parking_lot::{Condvar, Mutex};
use spark_transport::Deadline;
use std::time::Instant;

/// 单向缓冲区的同步核心。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 让内存缓冲区表现得像套接字：读在无数据时阻塞，写在超出软上限时阻塞，
///   两者都可以被截止时间或关闭打断。
///
/// ## 逻辑 (How)
/// - 一把互斥锁保护缓冲区、关闭标志与两个截止时间，读写各自一条条件变量；
/// - 每次阻塞以当前截止时间为上限单独计时（见 [`wait_until_deadline`]），
///   醒来后重新评估全部条件，因此截止时间缩短、清除或关闭都能及时生效；
/// - 截止时间是可重复比较的时间点：过期后每次调用都返回超时，直到被清除或推后。
///
/// ## 契约 (What)
/// - `read`：已关闭且无可交付数据返回 `Closed`（报文分帧关闭后不再交付）；
///   读截止已过返回 `Timeout`；
///   否则阻塞到有数据，再按分帧策略取出；
/// - `write`：先做分帧准入检查，已关闭返回 `Closed`；写截止已过返回 `Timeout`；
///   软上限非零且已缓冲字节超过上限时阻塞；成功时整段写入并返回其长度；
/// - `close`：幂等，唤醒全部读写等待者；
/// - `set_*_deadline`：替换截止时间并唤醒对应等待者。
///
/// ## 注意事项 (Trade-offs)
/// - 字节流关闭后读端仍可取走已缓冲的数据，取尽后才返回 `Closed`；
///   报文关闭后的读取立即返回 `Closed`；
/// - 截止检查先于数据交付：截止已过时即使有数据也返回超时。
#[derive(Debug)]
pub(crate) struct DeadlineGate<F> {
    limit: usize,
    state: Mutex<GateState<F>>,
    readable: Condvar,
    writable: Condvar,
}

#[derive(Debug, Default)]
struct GateState<F> {
    framing: F,
    closed: bool,
    read_deadline: Deadline,
    write_deadline: Deadline,
}

impl<F: Framing> DeadlineGate<F> {
    /// 创建闸门，`limit == 0` 表示不设软上限。
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            limit,
            state: Mutex::new(GateState::default()),
            readable: Condvar::new(),
            writable: Condvar::new(),
        }
    }

    pub(crate) fn read(&self, buf: &mut [u8]) -> crate::Result<usize> {
        let mut state = self.state.lock();
        loop {
            if state.closed && (!F::drains_after_close() || !state.framing.has_pending()) {
                return Err(MemTransportError::Closed);
            }
            let deadline = state.read_deadline;
            if deadline.is_expired(Instant::now()) {
                return Err(MemTransportError::Timeout);
            }
            if state.framing.has_pending() {
                break;
            }
            wait_until_deadline(&self.readable, &mut state, deadline);
        }

        let n = state.framing.take(buf)?;
        self.writable.notify_all();
        Ok(n)
    }

    pub(crate) fn write(&self, data: &[u8]) -> crate::Result<usize> {
        F::admit(data.len(), self.limit)?;

        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(MemTransportError::Closed);
            }
            let deadline = state.write_deadline;
            if deadline.is_expired(Instant::now()) {
                return Err(MemTransportError::Timeout);
            }
            if self.limit == 0 || state.framing.buffered() <= self.limit {
                break;
            }
            wait_until_deadline(&self.writable, &mut state, deadline);
        }

        state.framing.push(data);
        self.readable.notify_all();
        Ok(data.len())
    }

    pub(crate) fn close(&self) {
        let mut state = self.state.lock();
        if !state.closed {
            state.closed = true;
            tracing::trace!(
                limit = self.limit,
                buffered = state.framing.buffered(),
                "deadline gate closed"
            );
        }
        self.readable.notify_all();
        self.writable.notify_all();
    }

    pub(crate) fn set_read_deadline(&self, deadline: Deadline) {
        self.state.lock().read_deadline = deadline;
        self.readable.notify_all();
    }

    pub(crate) fn set_write_deadline(&self, deadline: Deadline) {
        self.state.lock().write_deadline = deadline;
        self.writable.notify_all();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    #[cfg(test)]
    pub(crate) fn buffered(&self) -> usize {
        self.state.lock().framing.buffered()
    }
}
