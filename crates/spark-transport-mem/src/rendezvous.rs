use crate::config::MemTransportConfig;
use crate::error::MemTransportError;
use crate::packet::{PacketPipe, limited_async_packet_pipe};
use crate::pipe::{StreamPipe, limited_async_pipe};
use crate::util::{poll_deadline, wait_until_deadline};
use parking_lot::{Condvar, Mutex};
use spark_transport::{CallContext, Dialer, Listener, PipeAddr};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// 监听器可接受的传输类型。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// 字节流，产出 [`StreamPipe`]。
    Stream,
    /// 报文，产出 [`PacketPipe`]。
    Datagram,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Stream => f.write_str("stream"),
            TransportKind::Datagram => f.write_str("datagram"),
        }
    }
}

/// 以默认配置和给定排队容量创建一对拨号器与监听器，仅接受字节流。
pub fn listen(backlog: usize) -> (PipeDialer, PipeListener) {
    listen_with(MemTransportConfig::default().with_backlog(backlog))
}

/// 按配置创建一对共享同一会合登记表的拨号器与监听器。
pub fn listen_with(config: MemTransportConfig) -> (PipeDialer, PipeListener) {
    tracing::debug!(
        backlog = config.backlog,
        limit = config.buffer_limit,
        datagram = config.datagram,
        "pipe listener opened"
    );
    let registry = Arc::new(Registry {
        backlog: config.backlog,
        buffer_limit: config.buffer_limit,
        state: Mutex::new(RegistryState {
            closed: false,
            stream: Lane::default(),
            datagram: config.datagram.then(Lane::default),
        }),
        stream_signals: LaneSignals::default(),
        datagram_signals: LaneSignals::default(),
    });
    (
        PipeDialer {
            registry: Arc::clone(&registry),
        },
        PipeListener { registry },
    )
}

/// 会合登记表。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 把相互独立的 `dial` 与 `accept` 配对成一对刚创建的管道，行为对齐
///   “有界交接队列 + 可取消的等待”。
///
/// ## 逻辑 (How)
/// - 一把锁保护关闭标志与每种类型的交接队列；每种类型各有两条条件变量：
///   `ready`（有新条目，接受方等待）与 `space`（有空位，拨号方等待）；
/// - 拨号可以入队的条件是 `queue.len() < backlog + waiting_acceptors`：
///   排队容量之外，每个正在等待的接受方各自贡献一个交接位，
///   因此 `backlog == 0` 时拨号只在有接受方等待时完成；
/// - 取消令牌没有回调，等待方以 [`CANCELLATION_POLL_INTERVAL`](crate::util::CANCELLATION_POLL_INTERVAL)
///   为上限分段等待并轮询取消位。
///
/// ## 契约 (What)
/// - 关闭是单向且幂等的，关闭时唤醒全部等待者；
/// - 关闭不会回收已入队但尚未被接受的管道端，也不影响已交付的连接。
#[derive(Debug)]
struct Registry {
    backlog: usize,
    buffer_limit: usize,
    state: Mutex<RegistryState>,
    stream_signals: LaneSignals,
    datagram_signals: LaneSignals,
}

#[derive(Debug)]
struct RegistryState {
    closed: bool,
    stream: Lane<StreamPipe>,
    datagram: Option<Lane<PacketPipe>>,
}

#[derive(Debug)]
struct Lane<T> {
    queue: VecDeque<T>,
    waiting_acceptors: usize,
}

impl<T> Default for Lane<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            waiting_acceptors: 0,
        }
    }
}

#[derive(Debug, Default)]
struct LaneSignals {
    ready: Condvar,
    space: Condvar,
}

/// 可以经由会合登记表交接的管道端。
trait Endpoint: Sized {
    const KIND: TransportKind;

    fn pair(limit: usize) -> (Self, Self);

    fn lane(state: &mut RegistryState) -> Option<&mut Lane<Self>>;
}

impl Endpoint for StreamPipe {
    const KIND: TransportKind = TransportKind::Stream;

    fn pair(limit: usize) -> (Self, Self) {
        limited_async_pipe(limit)
    }

    fn lane(state: &mut RegistryState) -> Option<&mut Lane<Self>> {
        Some(&mut state.stream)
    }
}

impl Endpoint for PacketPipe {
    const KIND: TransportKind = TransportKind::Datagram;

    fn pair(limit: usize) -> (Self, Self) {
        limited_async_packet_pipe(limit)
    }

    fn lane(state: &mut RegistryState) -> Option<&mut Lane<Self>> {
        state.datagram.as_mut()
    }
}

fn lane_of<E: Endpoint>(state: &mut RegistryState) -> crate::Result<&mut Lane<E>> {
    E::lane(state).ok_or(MemTransportError::UnsupportedKind(E::KIND))
}

/// 检查调用上下文；取消优先于超时。
fn check_context(ctx: &CallContext, now: Instant) -> crate::Result<()> {
    if ctx.cancellation().is_cancelled() {
        return Err(MemTransportError::Cancelled);
    }
    if ctx.deadline().is_expired(now) {
        return Err(MemTransportError::Timeout);
    }
    Ok(())
}

impl Registry {
    fn signals(&self, kind: TransportKind) -> &LaneSignals {
        match kind {
            TransportKind::Stream => &self.stream_signals,
            TransportKind::Datagram => &self.datagram_signals,
        }
    }

    fn dial<E: Endpoint>(&self, ctx: &CallContext) -> crate::Result<E> {
        let signals = self.signals(E::KIND);
        let mut state = self.state.lock();
        if state.closed {
            return Err(MemTransportError::ListenerClosed);
        }
        lane_of::<E>(&mut state)?;

        let (local, remote) = E::pair(self.buffer_limit);
        loop {
            if state.closed {
                return Err(MemTransportError::ListenerClosed);
            }
            let now = Instant::now();
            if let Err(error) = check_context(ctx, now) {
                tracing::debug!(kind = %E::KIND, code = error.code(), "dial abandoned");
                return Err(error);
            }

            let lane = lane_of::<E>(&mut state)?;
            if lane.queue.len() < self.backlog + lane.waiting_acceptors {
                lane.queue.push_back(remote);
                signals.ready.notify_all();
                return Ok(local);
            }
            wait_until_deadline(&signals.space, &mut state, poll_deadline(ctx.deadline(), now));
        }
    }

    fn accept<E: Endpoint>(&self, ctx: &CallContext) -> crate::Result<E> {
        let signals = self.signals(E::KIND);
        let mut state = self.state.lock();
        let mut registered = false;
        let outcome = loop {
            if state.closed {
                break Err(MemTransportError::ListenerClosed);
            }
            let lane = match lane_of::<E>(&mut state) {
                Ok(lane) => lane,
                Err(error) => break Err(error),
            };
            if let Some(end) = lane.queue.pop_front() {
                signals.space.notify_all();
                tracing::trace!(kind = %E::KIND, "connection accepted");
                break Ok(end);
            }
            let now = Instant::now();
            if let Err(error) = check_context(ctx, now) {
                break Err(error);
            }

            // 每次接受只登记一次交接位，轮询醒来不重复唤醒拨号方。
            if !registered {
                registered = true;
                lane.waiting_acceptors += 1;
                signals.space.notify_all();
            }
            wait_until_deadline(&signals.ready, &mut state, poll_deadline(ctx.deadline(), now));
        };
        if registered {
            if let Ok(lane) = lane_of::<E>(&mut state) {
                lane.waiting_acceptors -= 1;
            }
        }
        outcome
    }

    fn close(&self) {
        let mut state = self.state.lock();
        if !state.closed {
            state.closed = true;
            tracing::debug!(
                pending_stream = state.stream.queue.len(),
                pending_datagram = state.datagram.as_ref().map_or(0, |lane| lane.queue.len()),
                "pipe listener closed"
            );
        }
        drop(state);
        for signals in [&self.stream_signals, &self.datagram_signals] {
            signals.ready.notify_all();
            signals.space.notify_all();
        }
    }

    fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    fn supports(&self, kind: TransportKind) -> bool {
        match kind {
            TransportKind::Stream => true,
            TransportKind::Datagram => self.state.lock().datagram.is_some(),
        }
    }
}

/// 拨号句柄，可廉价克隆并在多个线程间共享。
///
/// 拨号在对端管道进入交接队列（或被等待中的接受方认领）后立即返回本端，
/// 不等待对端真正调用 `accept`。
#[derive(Clone, Debug)]
pub struct PipeDialer {
    registry: Arc<Registry>,
}

impl PipeDialer {
    /// 以永不取消、无截止的上下文拨号字节流。
    pub fn dial(&self) -> crate::Result<StreamPipe> {
        self.dial_with(&CallContext::default())
    }

    /// 在上下文约束下拨号字节流。
    ///
    /// # 错误
    /// - 监听器已关闭（包括等待期间被关闭）：[`MemTransportError::ListenerClosed`]；
    /// - 上下文被取消：[`MemTransportError::Cancelled`]；
    /// - 上下文截止到期：[`MemTransportError::Timeout`]。
    ///
    /// 失败时新建的管道对被直接丢弃。
    pub fn dial_with(&self, ctx: &CallContext) -> crate::Result<StreamPipe> {
        self.registry.dial(ctx)
    }

    /// 以永不取消、无截止的上下文拨号报文。
    pub fn dial_packet(&self) -> crate::Result<PacketPipe> {
        self.dial_packet_with(&CallContext::default())
    }

    /// 在上下文约束下拨号报文；监听器未启用报文类型时返回
    /// [`MemTransportError::UnsupportedKind`]。
    pub fn dial_packet_with(&self, ctx: &CallContext) -> crate::Result<PacketPipe> {
        self.registry.dial(ctx)
    }

    /// 拨号创建的管道使用的软上限。
    pub fn buffer_limit(&self) -> usize {
        self.registry.buffer_limit
    }
}

/// 监听句柄，可廉价克隆；任一克隆关闭即关闭整个登记表。
#[derive(Clone, Debug)]
pub struct PipeListener {
    registry: Arc<Registry>,
}

impl PipeListener {
    /// 阻塞直至接受一个字节流连接或监听器关闭。
    pub fn accept(&self) -> crate::Result<StreamPipe> {
        self.accept_with(&CallContext::default())
    }

    /// 在上下文约束下接受字节流连接；已入队的连接优先于上下文检查交付。
    pub fn accept_with(&self, ctx: &CallContext) -> crate::Result<StreamPipe> {
        self.registry.accept(ctx)
    }

    /// 阻塞直至接受一个报文连接或监听器关闭。
    pub fn accept_packet(&self) -> crate::Result<PacketPipe> {
        self.accept_packet_with(&CallContext::default())
    }

    /// 在上下文约束下接受报文连接；已入队的连接优先于上下文检查交付。
    pub fn accept_packet_with(&self, ctx: &CallContext) -> crate::Result<PacketPipe> {
        self.registry.accept(ctx)
    }

    /// 关闭监听器，幂等；阻塞中的拨号与接受立即返回
    /// [`MemTransportError::ListenerClosed`]。
    pub fn close(&self) {
        self.registry.close();
    }

    /// 监听器是否已关闭。
    pub fn is_closed(&self) -> bool {
        self.registry.is_closed()
    }

    /// 是否接受给定类型的连接。
    pub fn supports(&self, kind: TransportKind) -> bool {
        self.registry.supports(kind)
    }

    /// 每种类型的排队容量。
    pub fn backlog(&self) -> usize {
        self.registry.backlog
    }

    /// 占位本端地址。
    pub fn local_addr(&self) -> PipeAddr {
        PipeAddr
    }
}

impl Dialer for PipeDialer {
    type Error = MemTransportError;
    type Connection = StreamPipe;

    fn dial_with(&self, ctx: &CallContext) -> crate::Result<StreamPipe> {
        PipeDialer::dial_with(self, ctx)
    }
}

impl Listener for PipeListener {
    type Error = MemTransportError;
    type Connection = StreamPipe;

    fn accept_with(&self, ctx: &CallContext) -> crate::Result<StreamPipe> {
        PipeListener::accept_with(self, ctx)
    }

    fn close(&self) {
        PipeListener::close(self);
    }
}
