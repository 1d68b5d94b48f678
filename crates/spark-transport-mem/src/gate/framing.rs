use crate::error::MemTransportError;
use bytes::{Buf, Bytes, BytesMut};
use std::collections::VecDeque;

/// 截止闸门内部缓冲区的分帧策略。
///
/// # 教案式说明
/// - **意图 (Why)**：闸门的阻塞、截止与关闭逻辑对字节流与报文完全相同，差别只在
///   “如何追加”与“如何取出”。把差别收敛为一个 trait，闸门在构造时选定策略，
///   不需要为两种管道各维护一份同步代码。
/// - **契约 (What)**：
///   - `buffered` 返回已缓冲的字节总数，软上限以它为准；
///   - `has_pending` 为真时读端可以立即取出数据；
///   - `admit` 在关闭与截止检查之前执行，用于拒绝永远放不下的写入；
///   - `drains_after_close` 决定关闭后读端能否继续取走已缓冲的数据；
///   - `take` 只在 `has_pending` 为真时被调用，失败时不得修改缓冲区。
pub(crate) trait Framing: Default + Send + 'static {
    /// 已缓冲的字节总数。
    fn buffered(&self) -> usize;

    /// 是否存在可交付给读端的数据。
    fn has_pending(&self) -> bool;

    /// 写入准入检查，默认放行。
    fn admit(_len: usize, _limit: usize) -> crate::Result<()> {
        Ok(())
    }

    /// 关闭后是否仍交付已缓冲的数据，默认允许。
    fn drains_after_close() -> bool {
        true
    }

    /// 追加一次写入。
    fn push(&mut self, data: &[u8]);

    /// 取出数据到 `buf`，返回拷贝的字节数。
    fn take(&mut self, buf: &mut [u8]) -> crate::Result<usize>;
}

/// 字节流：不保留写入边界，读端可以任意粒度消费。
#[derive(Debug, Default)]
pub(crate) struct ByteStream {
    bytes: BytesMut,
}

impl Framing for ByteStream {
    fn buffered(&self) -> usize {
        self.bytes.len()
    }

    fn has_pending(&self) -> bool {
        !self.bytes.is_empty()
    }

    fn push(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    fn take(&mut self, buf: &mut [u8]) -> crate::Result<usize> {
        let n = buf.len().min(self.bytes.len());
        buf[..n].copy_from_slice(&self.bytes[..n]);
        self.bytes.advance(n);
        Ok(n)
    }
}

/// 报文：每次写入是一个原子记录，每次读取恰好消费一个记录。
#[derive(Debug, Default)]
pub(crate) struct Records {
    queue: VecDeque<Bytes>,
    total: usize,
}

impl Framing for Records {
    fn buffered(&self) -> usize {
        self.total
    }

    fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    fn admit(len: usize, limit: usize) -> crate::Result<()> {
        if limit != 0 && len > limit {
            return Err(MemTransportError::TooLarge { len, limit });
        }
        Ok(())
    }

    // 关闭后的读取一律失败，未取走的报文随管道一起作废。
    fn drains_after_close() -> bool {
        false
    }

    fn push(&mut self, data: &[u8]) {
        self.total += data.len();
        self.queue.push_back(Bytes::copy_from_slice(data));
    }

    fn take(&mut self, buf: &mut [u8]) -> crate::Result<usize> {
        let required = self.queue.front().map_or(0, Bytes::len);
        if required > buf.len() {
            return Err(MemTransportError::ShortBuffer {
                required,
                capacity: buf.len(),
            });
        }
        let Some(record) = self.queue.pop_front() else {
            return Ok(0);
        };
        self.total -= record.len();
        buf[..required].copy_from_slice(&record);
        Ok(required)
    }
}

/// 黑洞：写入被吞掉，读端永远等不到数据。
#[derive(Debug, Default)]
pub(crate) struct Void;

impl Framing for Void {
    fn buffered(&self) -> usize {
        0
    }

    fn has_pending(&self) -> bool {
        false
    }

    fn push(&mut self, _data: &[u8]) {}

    fn take(&mut self, _buf: &mut [u8]) -> crate::Result<usize> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_stream_allows_partial_reads() {
        let mut stream = ByteStream::default();
        stream.push(b"hello");
        stream.push(b" world");

        let mut buf = [0u8; 4];
        assert_eq!(stream.take(&mut buf), Ok(4));
        assert_eq!(&buf, b"hell");
        assert_eq!(stream.buffered(), 7);

        let mut rest = [0u8; 32];
        assert_eq!(stream.take(&mut rest), Ok(7));
        assert_eq!(&rest[..7], b"o world");
        assert!(!stream.has_pending());
    }

    #[test]
    fn records_keep_boundaries_and_survive_short_buffers() {
        let mut records = Records::default();
        records.push(&[1; 10]);
        records.push(&[2; 20]);
        assert_eq!(records.buffered(), 30);

        let mut small = [0u8; 15];
        assert_eq!(records.take(&mut small), Ok(10));
        assert_eq!(
            records.take(&mut small),
            Err(MemTransportError::ShortBuffer {
                required: 20,
                capacity: 15
            })
        );
        assert_eq!(records.buffered(), 20, "缓冲区不足时报文必须保留在队首");

        let mut large = [0u8; 64];
        assert_eq!(records.take(&mut large), Ok(20));
        assert!(large[..20].iter().all(|byte| *byte == 2));
        assert_eq!(records.buffered(), 0);
    }

    #[test]
    fn empty_record_is_still_a_record() {
        let mut records = Records::default();
        records.push(&[]);
        assert!(records.has_pending());
        assert_eq!(records.take(&mut []), Ok(0));
        assert!(!records.has_pending());
    }

    #[test]
    fn records_reject_unfittable_writes() {
        assert_eq!(
            Records::admit(11, 10),
            Err(MemTransportError::TooLarge { len: 11, limit: 10 })
        );
        assert_eq!(Records::admit(10, 10), Ok(()));
        assert_eq!(Records::admit(usize::MAX, 0), Ok(()), "0 表示不设上限");
        assert_eq!(ByteStream::admit(usize::MAX, 1), Ok(()));
    }

    #[test]
    fn only_byte_streams_drain_after_close() {
        assert!(ByteStream::drains_after_close());
        assert!(!Records::drains_after_close());
    }
}
