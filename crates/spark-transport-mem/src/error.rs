use crate::TransportKind;
use std::io;
use thiserror::Error;

const CLOSED_CODE: &str = "spark.transport.mem.closed";
const TIMEOUT_CODE: &str = "spark.transport.mem.timeout";
const TOO_LARGE_CODE: &str = "spark.transport.mem.write_too_large";
const SHORT_BUFFER_CODE: &str = "spark.transport.mem.short_buffer";
const CANCEL_CODE: &str = "spark.transport.mem.cancelled";
const LISTENER_CLOSED_CODE: &str = "spark.transport.mem.listener_closed";
const UNSUPPORTED_KIND_CODE: &str = "spark.transport.mem.unsupported_kind";

/// 内存传输的错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把套接字语义中的失败（关闭、超时、报文过大、缓冲区不足、取消、监听器关闭）
///   收敛为一个枚举，所有失败都同步返回给调用方，库内部不记录、不吞掉、不重试。
/// - **契约 (What)**：
///   - 变体均为 `Clone + Send + Sync + 'static`，可跨线程传播并在测试中直接比较；
///   - [`MemTransportError::code`] 返回稳定错误码，适合日志与指标标签；
///   - [`MemTransportError::category`] 给出重试建议分类；
///   - 实现 `From<MemTransportError> for io::Error`，使管道可以实现 `std::io::{Read, Write}`。
/// - **设计权衡 (Trade-offs)**：错误不携带堆分配的上下文字符串，热路径上构造零成本；
///   报文相关变体携带长度字段便于排障。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MemTransportError {
    /// 操作发生在已关闭（或与关闭竞争）的管道上。
    #[error("io: read/write on closed pipe")]
    Closed,

    /// 截止时间在操作完成前到期。调用方可以清除截止时间后重试。
    #[error("deadline exceeded")]
    Timeout,

    /// 单次报文写入超过软上限，永远无法放入缓冲区。
    #[error("write of {len} bytes is too large for the {limit}-byte buffer")]
    TooLarge { len: usize, limit: usize },

    /// 读缓冲区小于队首报文；报文保持在队首，可换更大的缓冲区重试。
    #[error("short buffer: packet needs {required} bytes but only {capacity} were provided")]
    ShortBuffer { required: usize, capacity: usize },

    /// 拨号上下文在交接完成前被取消。
    #[error("dial cancelled")]
    Cancelled,

    /// 监听器已关闭。
    #[error("the listener is closed")]
    ListenerClosed,

    /// 监听器未启用该传输类型。
    #[error("the listener does not accept {0} connections")]
    UnsupportedKind(TransportKind),
}

/// 错误的处理建议分类。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 调整参数（清除截止时间、换更大的缓冲区）后可以重试。
    Retryable,
    /// 截止时间到期。
    Timeout,
    /// 调用方主动取消。
    Cancelled,
    /// 资源已终结或请求无法满足，重试没有意义。
    NonRetryable,
}

impl MemTransportError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            MemTransportError::Closed => CLOSED_CODE,
            MemTransportError::Timeout => TIMEOUT_CODE,
            MemTransportError::TooLarge { .. } => TOO_LARGE_CODE,
            MemTransportError::ShortBuffer { .. } => SHORT_BUFFER_CODE,
            MemTransportError::Cancelled => CANCEL_CODE,
            MemTransportError::ListenerClosed => LISTENER_CLOSED_CODE,
            MemTransportError::UnsupportedKind(_) => UNSUPPORTED_KIND_CODE,
        }
    }

    /// 返回错误分类。
    pub fn category(&self) -> ErrorCategory {
        match self {
            MemTransportError::Timeout => ErrorCategory::Timeout,
            MemTransportError::Cancelled => ErrorCategory::Cancelled,
            MemTransportError::ShortBuffer { .. } => ErrorCategory::Retryable,
            MemTransportError::Closed
            | MemTransportError::TooLarge { .. }
            | MemTransportError::ListenerClosed
            | MemTransportError::UnsupportedKind(_) => ErrorCategory::NonRetryable,
        }
    }

    /// 是否为截止时间到期。
    pub fn is_timeout(&self) -> bool {
        matches!(self, MemTransportError::Timeout)
    }

    fn io_kind(&self) -> io::ErrorKind {
        use io::ErrorKind;
        match self {
            MemTransportError::Closed => ErrorKind::BrokenPipe,
            MemTransportError::Timeout => ErrorKind::TimedOut,
            MemTransportError::TooLarge { .. } | MemTransportError::ShortBuffer { .. } => {
                ErrorKind::InvalidInput
            }
            MemTransportError::ListenerClosed => ErrorKind::NotConnected,
            MemTransportError::UnsupportedKind(_) => ErrorKind::Unsupported,
            // `Interrupted` 会让 `io::copy` 等工具自动重试，取消必须映射为终止性错误。
            MemTransportError::Cancelled => ErrorKind::Other,
        }
    }
}

impl From<MemTransportError> for io::Error {
    fn from(error: MemTransportError) -> Self {
        io::Error::new(error.io_kind(), error)
    }
}
