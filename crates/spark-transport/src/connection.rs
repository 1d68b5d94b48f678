use crate::{Deadline, PipeAddr};

/// 统一的面向连接传输接口。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 为内存管道、丢弃端点、回显端点等提供一致的读写/关闭/截止接口，
///   让上层工具（例如回显循环、零字节泵）只依赖契约即可工作；
/// - 行为对齐真实套接字：阻塞读、阻塞或背压写、读写截止、幂等关闭。
///
/// ## 契约说明（What）
/// - `read`：阻塞直至有数据、截止到期或连接关闭；成功返回拷贝的字节数，字节流实现允许部分读取；
/// - `write`：要么写入全部 `buf` 并返回 `buf.len()`，要么失败，不报告部分成功；
/// - `close`：幂等，永不失败，并唤醒所有阻塞在该连接上的调用；
/// - `set_*_deadline`：替换截止时间并立即唤醒等待者重新评估；`Deadline::none()` 清除截止；
/// - `local_addr`/`peer_addr`：返回占位地址 [`PipeAddr`]。
///
/// ## 风险提示（Trade-offs）
/// - 所有方法以 `&self` 调用，实现必须自行保证并发安全；
/// - 契约不规定关闭后缓冲数据的去留，具体语义以实现文档为准。
pub trait Connection: Send + Sync {
    /// 实现特定的错误类型。
    type Error: core::fmt::Debug + Send + Sync + 'static;

    /// 读取数据到缓冲区。
    fn read(&self, buf: &mut [u8]) -> crate::Result<usize, Self::Error>;

    /// 写入数据。
    fn write(&self, buf: &[u8]) -> crate::Result<usize, Self::Error>;

    /// 关闭连接。
    fn close(&self);

    /// 设置读截止时间。
    fn set_read_deadline(&self, deadline: Deadline);

    /// 设置写截止时间。
    fn set_write_deadline(&self, deadline: Deadline);

    /// 同时设置读写截止时间。
    fn set_deadline(&self, deadline: Deadline) {
        self.set_read_deadline(deadline);
        self.set_write_deadline(deadline);
    }

    /// 读取本地地址。
    fn local_addr(&self) -> PipeAddr {
        PipeAddr
    }

    /// 读取对端地址。
    fn peer_addr(&self) -> PipeAddr {
        PipeAddr
    }
}

/// 面向报文的连接契约。
///
/// # 契约说明（What）
/// - `recv_from`：读取恰好一个报文，返回长度与对端地址；缓冲区不足时失败且报文保留；
/// - `send_to`：把 `payload` 作为一个原子报文发送，`addr` 仅为接口兼容而存在，实现可以忽略。
pub trait DatagramConnection: Connection {
    /// 接收单个报文并返回长度与对端地址。
    fn recv_from(&self, buf: &mut [u8]) -> crate::Result<(usize, PipeAddr), Self::Error>;

    /// 向对端发送单个报文。
    fn send_to(&self, payload: &[u8], addr: &PipeAddr) -> crate::Result<usize, Self::Error>;
}
