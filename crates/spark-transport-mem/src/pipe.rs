use crate::error::MemTransportError;
use crate::gate::ByteStream;
use crate::half::Duplex;
use spark_transport::{Connection, Deadline};
use std::io;

/// 字节流全双工管道的一端。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 在不触碰真实网络的前提下，为测试与进程内组件提供与 TCP 连接行为一致的端点：
///   阻塞读、软上限背压写、读写截止、幂等关闭。
///
/// ## 契约说明（What）
/// - `read`：允许部分读取；关闭后先读尽缓冲数据，再返回 [`MemTransportError::Closed`]；
/// - `write`：整段写入或失败，字节流从不因长度被拒绝，只会在超出软上限时阻塞；
/// - `close`：同时关闭两个方向，对端立即观测到终止；丢弃端点不会隐式关闭；
/// - 同时实现 [`std::io::Read`]/[`std::io::Write`]，关闭映射为读到 EOF，
///   便于直接交给 `io::copy` 等标准工具。
///
/// ## 风险提示（Trade-offs）
/// - 多个写者并发写入同一方向时，不保证各自字节的相对顺序，只保证每次写入不被拆分报告。
#[derive(Debug)]
pub struct StreamPipe {
    inner: Duplex<ByteStream>,
}

/// 创建一对无软上限的字节流管道。
pub fn async_pipe() -> (StreamPipe, StreamPipe) {
    limited_async_pipe(0)
}

/// 创建一对字节流管道，每个方向缓冲超过 `limit` 字节时写者阻塞；`0` 表示不设上限。
pub fn limited_async_pipe(limit: usize) -> (StreamPipe, StreamPipe) {
    let (left, right) = Duplex::pair(limit);
    tracing::trace!(kind = "stream", limit, "pipe pair created");
    (StreamPipe { inner: left }, StreamPipe { inner: right })
}

impl StreamPipe {
    /// 读取数据，阻塞直至有数据、截止到期或关闭。
    pub fn read(&self, buf: &mut [u8]) -> crate::Result<usize> {
        self.inner.read(buf)
    }

    /// 写入整段数据。
    pub fn write(&self, data: &[u8]) -> crate::Result<usize> {
        self.inner.write(data)
    }

    /// 关闭两个方向，幂等。
    pub fn close(&self) {
        self.inner.close();
    }

    pub fn set_read_deadline(&self, deadline: Deadline) {
        self.inner.set_read_deadline(deadline);
    }

    pub fn set_write_deadline(&self, deadline: Deadline) {
        self.inner.set_write_deadline(deadline);
    }

    pub fn set_deadline(&self, deadline: Deadline) {
        self.set_read_deadline(deadline);
        self.set_write_deadline(deadline);
    }

    /// 任一方向已关闭即视为关闭。
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    fn read_to_eof(&self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.inner.read(buf) {
            Err(MemTransportError::Closed) => Ok(0),
            other => other.map_err(io::Error::from),
        }
    }
}

impl Connection for StreamPipe {
    type Error = MemTransportError;

    fn read(&self, buf: &mut [u8]) -> crate::Result<usize> {
        StreamPipe::read(self, buf)
    }

    fn write(&self, buf: &[u8]) -> crate::Result<usize> {
        StreamPipe::write(self, buf)
    }

    fn close(&self) {
        StreamPipe::close(self);
    }

    fn set_read_deadline(&self, deadline: Deadline) {
        StreamPipe::set_read_deadline(self, deadline);
    }

    fn set_write_deadline(&self, deadline: Deadline) {
        StreamPipe::set_write_deadline(self, deadline);
    }
}

impl io::Read for StreamPipe {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_to_eof(buf)
    }
}

impl io::Read for &StreamPipe {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_to_eof(buf)
    }
}

impl io::Write for StreamPipe {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for &StreamPipe {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
