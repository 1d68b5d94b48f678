#![deny(unsafe_code)]
#![doc = r#"
# spark-transport-mem

## 设计动机（Why）
- **定位**：该 crate 提供进程内、全并发的套接字语义模拟传输：字节流与报文两种
  全双工管道，以及把 `dial` 与 `accept` 配对的会合式拨号器/监听器，全程不触碰真实网络。
- **架构角色**：作为 `spark-transport` 契约的内存实现，用于测试替身、进程内组件
  互联与协议逻辑的确定性验证。
- **设计理念**：价值集中在同步核心：阻塞、截止、背压与关闭在并发读写下正确组合且无竞态，
  其余部分只是薄外观。

## 核心契约（What）
- **管道**：[`async_pipe`]/[`limited_async_pipe`] 创建字节流管道对，
  [`async_packet_pipe`]/[`limited_async_packet_pipe`] 创建报文管道对；
  两端交叉共享两个单向截止闸门，关闭任一端即关闭两个方向；
- **建连**：[`listen`]/[`listen_with`] 返回共享会合登记表的 [`PipeDialer`] 与
  [`PipeListener`]，排队容量由 `backlog` 约束，拨号尊重 [`CallContext`](spark_transport::CallContext)
  的取消与截止；
- **错误**：全部失败同步返回 [`MemTransportError`]，附带稳定错误码，库内不记录、不重试；
- **外围端点**：[`sinks`] 提供丢弃、合成读取与回显端点。

## 实现策略（How）
- **同步原语**：每个方向一把 `parking_lot::Mutex` 与读写两条 `Condvar`；
  每次阻塞以当前截止时间为上限单独计时，截止时间修改与关闭都会广播唤醒；
- **分帧**：字节流与报文共享同一闸门实现，只在构造时选择不同的分帧策略；
- **取消**：取消令牌没有回调，拨号与接受以毫秒级间隔轮询取消位。

## 风险与考量（Trade-offs）
- **关闭与缓冲**：字节流关闭后读端仍可取走已缓冲数据，取尽后才返回 `Closed`；
  报文管道关闭后的读取立即返回 `Closed`；
- **丢弃即泄漏**：端点被丢弃不会隐式关闭，对端会一直阻塞到自己的截止时间；
- **异步调用**：核心是阻塞式的，异步调用方可启用 `runtime-tokio` 特性，
  经由阻塞线程池桥接建连。
"#]

mod config;
mod error;
mod gate;
mod half;
mod packet;
mod pipe;
mod rendezvous;
#[cfg(feature = "runtime-tokio")]
pub mod runtime_tokio;
pub mod sinks;
mod util;

pub use config::MemTransportConfig;
pub use error::{ErrorCategory, MemTransportError};
pub use packet::{PacketPipe, async_packet_pipe, limited_async_packet_pipe};
pub use pipe::{StreamPipe, async_pipe, limited_async_pipe};
pub use rendezvous::{PipeDialer, PipeListener, TransportKind, listen, listen_with};

/// 内存传输统一的结果类型。
pub type Result<T> = core::result::Result<T, MemTransportError>;
