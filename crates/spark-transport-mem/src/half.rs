use crate::gate::{DeadlineGate, Framing};
use spark_transport::Deadline;
use std::sync::Arc;

/// 闸门的读方向句柄。
#[derive(Debug)]
pub(crate) struct ReadHalf<F> {
    gate: Arc<DeadlineGate<F>>,
}

/// 闸门的写方向句柄。
#[derive(Debug)]
pub(crate) struct WriteHalf<F> {
    gate: Arc<DeadlineGate<F>>,
}

/// 创建一条单向通道，返回共享同一闸门的写端与读端。
pub(crate) fn half_duplex<F: Framing>(limit: usize) -> (WriteHalf<F>, ReadHalf<F>) {
    let gate = Arc::new(DeadlineGate::new(limit));
    (
        WriteHalf {
            gate: Arc::clone(&gate),
        },
        ReadHalf { gate },
    )
}

impl<F: Framing> ReadHalf<F> {
    pub(crate) fn read(&self, buf: &mut [u8]) -> crate::Result<usize> {
        self.gate.read(buf)
    }

    pub(crate) fn set_deadline(&self, deadline: Deadline) {
        self.gate.set_read_deadline(deadline);
    }

    pub(crate) fn close(&self) {
        self.gate.close();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.gate.is_closed()
    }
}

impl<F: Framing> WriteHalf<F> {
    pub(crate) fn write(&self, data: &[u8]) -> crate::Result<usize> {
        self.gate.write(data)
    }

    pub(crate) fn set_deadline(&self, deadline: Deadline) {
        self.gate.set_write_deadline(deadline);
    }

    pub(crate) fn close(&self) {
        self.gate.close();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.gate.is_closed()
    }
}

/// 全双工端点：本端写入的闸门正是对端读取的闸门，反之亦然。
///
/// # 契约 (What)
/// - 两个方向各有独立的锁，并发读写互不争用；
/// - `close` 同时关闭两个方向，对端随后的读写都能观测到终止；
/// - `Drop` 不触发关闭，与“连接只在显式 `close` 时终止”的套接字语义一致。
#[derive(Debug)]
pub(crate) struct Duplex<F> {
    outgoing: WriteHalf<F>,
    incoming: ReadHalf<F>,
}

impl<F: Framing> Duplex<F> {
    /// 交叉连线两条单向通道，返回一对端点。
    pub(crate) fn pair(limit: usize) -> (Self, Self) {
        let (left_tx, right_rx) = half_duplex(limit);
        let (right_tx, left_rx) = half_duplex(limit);
        (
            Self {
                outgoing: left_tx,
                incoming: left_rx,
            },
            Self {
                outgoing: right_tx,
                incoming: right_rx,
            },
        )
    }

    pub(crate) fn read(&self, buf: &mut [u8]) -> crate::Result<usize> {
        self.incoming.read(buf)
    }

    pub(crate) fn write(&self, data: &[u8]) -> crate::Result<usize> {
        self.outgoing.write(data)
    }

    pub(crate) fn close(&self) {
        self.outgoing.close();
        self.incoming.close();
    }

    pub(crate) fn set_read_deadline(&self, deadline: Deadline) {
        self.incoming.set_deadline(deadline);
    }

    pub(crate) fn set_write_deadline(&self, deadline: Deadline) {
        self.outgoing.set_deadline(deadline);
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.outgoing.is_closed() || self.incoming.is_closed()
    }
}
