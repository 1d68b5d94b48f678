use crate::error::MemTransportError;
use crate::gate::Records;
use crate::half::Duplex;
use spark_transport::{Connection, DatagramConnection, Deadline, PipeAddr};

/// 报文全双工管道的一端。
///
/// # 契约说明（What）
/// - 每次 `write` 入队一个原子报文；软上限非零且报文长于上限时立即返回
///   [`MemTransportError::TooLarge`]，不会先阻塞再失败；
/// - 每次 `read` 恰好取出一个报文；缓冲区不足时返回
///   [`MemTransportError::ShortBuffer`]，报文保留在队首，可换更大的缓冲区重试；
/// - 背压按所有排队报文的总字节数计算；
/// - 关闭后的 `read` 立即返回 [`MemTransportError::Closed`]，即使队列中仍有报文；
/// - `recv_from`/`send_to` 携带的地址只是占位，管道只有唯一的对端。
#[derive(Debug)]
pub struct PacketPipe {
    inner: Duplex<Records>,
}

/// 创建一对无软上限的报文管道。
pub fn async_packet_pipe() -> (PacketPipe, PacketPipe) {
    limited_async_packet_pipe(0)
}

/// 创建一对报文管道，`limit` 同时是单个报文的最大长度与背压阈值；`0` 表示不设上限。
pub fn limited_async_packet_pipe(limit: usize) -> (PacketPipe, PacketPipe) {
    let (left, right) = Duplex::pair(limit);
    tracing::trace!(kind = "datagram", limit, "pipe pair created");
    (PacketPipe { inner: left }, PacketPipe { inner: right })
}

impl PacketPipe {
    /// 读取一个完整报文。
    pub fn read(&self, buf: &mut [u8]) -> crate::Result<usize> {
        self.inner.read(buf)
    }

    /// 发送一个原子报文。
    pub fn write(&self, data: &[u8]) -> crate::Result<usize> {
        self.inner.write(data)
    }

    /// 读取一个报文并附带占位对端地址。
    pub fn recv_from(&self, buf: &mut [u8]) -> crate::Result<(usize, PipeAddr)> {
        let n = self.inner.read(buf)?;
        Ok((n, PipeAddr))
    }

    /// 发送一个报文，地址参数被忽略。
    pub fn send_to(&self, data: &[u8], _addr: &PipeAddr) -> crate::Result<usize> {
        self.inner.write(data)
    }

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

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl Connection for PacketPipe {
    type Error = MemTransportError;

    fn read(&self, buf: &mut [u8]) -> crate::Result<usize> {
        PacketPipe::read(self, buf)
    }

    fn write(&self, buf: &[u8]) -> crate::Result<usize> {
        PacketPipe::write(self, buf)
    }

    fn close(&self) {
        PacketPipe::close(self);
    }

    fn set_read_deadline(&self, deadline: Deadline) {
        PacketPipe::set_read_deadline(self, deadline);
    }

    fn set_write_deadline(&self, deadline: Deadline) {
        PacketPipe::set_write_deadline(self, deadline);
    }
}

impl DatagramConnection for PacketPipe {
    fn recv_from(&self, buf: &mut [u8]) -> crate::Result<(usize, PipeAddr)> {
        PacketPipe::recv_from(self, buf)
    }

    fn send_to(&self, payload: &[u8], addr: &PipeAddr) -> crate::Result<usize> {
        PacketPipe::send_to(self, payload, addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datagram_surface_round_trips_through_the_trait() {
        fn exchange<C: DatagramConnection<Error = MemTransportError>>(left: &C, right: &C) {
            assert_eq!(left.send_to(b"one", &PipeAddr), Ok(3));
            let mut buf = [0u8; 8];
            assert_eq!(right.recv_from(&mut buf), Ok((3, PipeAddr)));
            assert_eq!(&buf[..3], b"one");
        }

        let (left, right) = async_packet_pipe();
        exchange(&left, &right);
        exchange(&right, &left);
    }
}
