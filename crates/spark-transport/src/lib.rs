#![deny(unsafe_code)]
#![doc = "spark-transport: 传输层契约接口统一抽象层。"]
#![doc = ""]
#![doc = "== 使命概述 =="]
#![doc = "- **Why**：为内存管道、丢弃端点、回显端点等实现提供共同语言，调用方只依赖契约即可替换实现。"]
#![doc = "- **What**：定义 `Connection`、`DatagramConnection`、`Listener`、`Dialer` 四个 trait，以及 `Deadline`、`Cancellation`、`CallContext`、`PipeAddr` 等基础结构。"]
#![doc = "- **How**：契约全部是同步阻塞接口；阻塞点由实现方负责遵守截止时间与取消信号。"]

/// `Result` 是传输层契约内部使用的统一返回别名。
///
/// # 使用方式（How）
/// - 与 `core::result::Result` 完全等价，默认不指定错误类型，调用者需在签名中显式声明错误枚举。
/// - 具体实现 crate 通常再定义一个绑定自身错误类型的别名。
pub type Result<T, E> = core::result::Result<T, E>;

pub mod addr;
pub mod connection;
pub mod context;
pub mod listener;

pub use addr::PipeAddr;
pub use connection::{Connection, DatagramConnection};
pub use context::{CallContext, Cancellation, Deadline};
pub use listener::{Dialer, Listener};
