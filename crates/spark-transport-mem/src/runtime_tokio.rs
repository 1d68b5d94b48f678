//! Tokio 桥接：把阻塞式建连搬到 Tokio 的阻塞线程池。
//!
//! # 教案式说明
//! - **意图 (Why)**：会合登记表基于条件变量阻塞，直接在异步任务中调用会占住工作线程；
//!   经 `spawn_blocking` 转发后，异步调用方可以 `.await` 建连结果。
//! - **契约 (What)**：返回值与对应的阻塞方法一致；阻塞任务 panic 时在调用方重新抛出，
//!   运行时关闭导致任务被取消时返回 [`MemTransportError::Cancelled`]。
//! - **注意事项 (Trade-offs)**：丢弃返回的 Future 不会中止已经开始的阻塞调用，
//!   需要提前终止时请在 `ctx` 中携带取消令牌或截止时间。

use crate::error::MemTransportError;
use crate::packet::PacketPipe;
use crate::pipe::StreamPipe;
use crate::rendezvous::{PipeDialer, PipeListener};
use spark_transport::CallContext;
use tokio::task::{JoinError, spawn_blocking};

/// 在阻塞线程池上执行 [`PipeDialer::dial_with`]。
pub async fn dial_async(dialer: &PipeDialer, ctx: CallContext) -> crate::Result<StreamPipe> {
    let dialer = dialer.clone();
    settle(spawn_blocking(move || dialer.dial_with(&ctx)).await)
}

/// 在阻塞线程池上执行 [`PipeListener::accept_with`]。
pub async fn accept_async(listener: &PipeListener, ctx: CallContext) -> crate::Result<StreamPipe> {
    let listener = listener.clone();
    settle(spawn_blocking(move || listener.accept_with(&ctx)).await)
}

/// 在阻塞线程池上执行 [`PipeListener::accept_packet_with`]。
pub async fn accept_packet_async(
    listener: &PipeListener,
    ctx: CallContext,
) -> crate::Result<PacketPipe> {
    let listener = listener.clone();
    settle(spawn_blocking(move || listener.accept_packet_with(&ctx)).await)
}

fn settle<T>(joined: Result<crate::Result<T>, JoinError>) -> crate::Result<T> {
    match joined {
        Ok(result) => result,
        Err(error) if error.is_panic() => std::panic::resume_unwind(error.into_panic()),
        Err(_) => Err(MemTransportError::Cancelled),
    }
}
