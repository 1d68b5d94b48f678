use crate::error::MemTransportError;
use crate::gate::{DeadlineGate, Void};
use spark_transport::{Connection, Deadline};

/// 吞掉全部写入的连接。
///
/// # 契约说明（What）
/// - `write`：关闭前且写截止未到期时总是成功并返回写入长度，数据不被保存；
/// - `read`：永远等不到数据，阻塞到关闭（`Closed`）或读截止到期（`Timeout`）；
///   并发修改截止时间只会让读者重新评估，不会让它提前返回；
/// - `close`：幂等，唤醒阻塞中的读者。
#[derive(Debug)]
pub struct Discard {
    gate: DeadlineGate<Void>,
}

/// 创建新的丢弃端点。
pub fn discard() -> Discard {
    Discard {
        gate: DeadlineGate::new(0),
    }
}

impl Discard {
    pub fn is_closed(&self) -> bool {
        self.gate.is_closed()
    }
}

impl Connection for Discard {
    type Error = MemTransportError;

    fn read(&self, buf: &mut [u8]) -> crate::Result<usize> {
        self.gate.read(buf)
    }

    fn write(&self, buf: &[u8]) -> crate::Result<usize> {
        self.gate.write(buf)
    }

    fn close(&self) {
        self.gate.close();
    }

    fn set_read_deadline(&self, deadline: Deadline) {
        self.gate.set_read_deadline(deadline);
    }

    fn set_write_deadline(&self, deadline: Deadline) {
        self.gate.set_write_deadline(deadline);
    }
}
