use spark_transport::Connection;
use std::io;

const PUMP_CHUNK: usize = 16 * 1024;

static ZEROS: [u8; PUMP_CHUNK] = [0; PUMP_CHUNK];

/// 无限产出零字节的数据源。
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroSource;

impl ZeroSource {
    /// 以 16 KiB 的零字节块持续写入 `conn`，直到某次写入失败。
    ///
    /// 返回已成功写入的总字节数以及终止写入的错误。
    pub fn pump<C: Connection + ?Sized>(&self, conn: &C) -> (u64, C::Error) {
        let mut written = 0u64;
        loop {
            match conn.write(&ZEROS) {
                Ok(n) => written += n as u64,
                Err(error) => return (written, error),
            }
        }
    }
}

impl io::Read for ZeroSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        buf.fill(0);
        Ok(buf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemTransportError;
    use crate::sinks::discard;
    use spark_transport::Deadline;
    use std::io::Read;
    use std::time::Duration;

    #[test]
    fn fills_every_buffer_with_zeros() {
        let mut buf = [0xAAu8; 37];
        assert_eq!(ZeroSource.read(&mut buf).expect("读取零字节"), 37);
        assert!(buf.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn pump_stops_at_the_first_failed_write() {
        let sink = discard();
        sink.set_write_deadline(Deadline::after(Duration::from_millis(20)));
        let (written, error) = ZeroSource.pump(&sink);
        assert_eq!(error, MemTransportError::Timeout);
        assert_eq!(written % PUMP_CHUNK as u64, 0, "每次写入都是完整的块");
    }
}
