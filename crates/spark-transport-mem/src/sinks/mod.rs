//! 建立在连接契约之上的单向端点：丢弃写入、合成读取、回显。
//!
//! 这些端点只使用 [`spark_transport::Connection`] 的公开契约或内存管道的公开接口，
//! 不引入新的同步设计，常用作测试替身与压测负载。

mod babel;
mod discard;
mod echo;
mod zero;

pub use babel::{Babel, babel};
pub use discard::{Discard, discard};
pub use echo::echoer;
pub use zero::ZeroSource;
