use crate::error::MemTransportError;
use parking_lot::{Mutex, RwLock};
use spark_transport::{Connection, Deadline};
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// 读取来自外部数据源、写入被丢弃的连接。
///
/// # 契约说明（What）
/// - `read`：关闭后返回 `Closed`，读截止已过返回 `Timeout`，否则直接委托给数据源；
///   阻塞与否完全取决于数据源本身，截止时间不会打断一次已经开始的委托读取；
/// - `write`：与 [`Discard`](super::Discard) 相同，关闭或写截止到期前总是成功；
/// - 错误类型为 [`io::Error`]，以便原样透传数据源的错误。
#[derive(Debug)]
pub struct Babel<R> {
    source: Mutex<R>,
    closed: AtomicBool,
    deadlines: RwLock<Deadlines>,
}

#[derive(Clone, Copy, Debug, Default)]
struct Deadlines {
    read: Deadline,
    write: Deadline,
}

/// 以 `source` 为读数据源创建连接。
pub fn babel<R: io::Read + Send>(source: R) -> Babel<R> {
    Babel {
        source: Mutex::new(source),
        closed: AtomicBool::new(false),
        deadlines: RwLock::new(Deadlines::default()),
    }
}

impl<R> Babel<R> {
    fn check(&self, deadline: Deadline) -> crate::Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(MemTransportError::Closed);
        }
        if deadline.is_expired(Instant::now()) {
            return Err(MemTransportError::Timeout);
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// 取回数据源。
    pub fn into_inner(self) -> R {
        self.source.into_inner()
    }
}

impl<R: io::Read + Send> Connection for Babel<R> {
    type Error = io::Error;

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.check(self.deadlines.read().read)?;
        self.source.lock().read(buf)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        self.check(self.deadlines.read().write)?;
        Ok(buf.len())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn set_read_deadline(&self, deadline: Deadline) {
        self.deadlines.write().read = deadline;
    }

    fn set_write_deadline(&self, deadline: Deadline) {
        self.deadlines.write().write = deadline;
    }

    fn set_deadline(&self, deadline: Deadline) {
        *self.deadlines.write() = Deadlines {
            read: deadline,
            write: deadline,
        };
    }
}
