use crate::{CallContext, Connection, PipeAddr};

/// 统一的传输监听器接口。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 在不同监听实现之间共享统一签名，便于测试替身与真实实现互换；
/// - 将接受、关闭流程纳入一个 trait，调用方针对 trait 编写并行接受、优雅关闭等通用逻辑。
///
/// ## 契约说明（What）
/// - `accept_with`：阻塞直至得到一个入站连接，或上下文取消/超时，或监听器关闭；
/// - `close`：幂等；关闭后所有阻塞中的以及后续的 `accept` 调用都必须返回错误而非挂起；
/// - `local_addr`：返回监听地址。
///
/// ## 风险提示（Trade-offs）
/// - 关闭监听器不应影响已经交付的连接。
pub trait Listener: Send + Sync {
    /// 错误类型。
    type Error: core::fmt::Debug + Send + Sync + 'static;
    /// 监听器产出的连接类型。
    type Connection: Connection;

    /// 以默认上下文接受连接。
    fn accept(&self) -> crate::Result<Self::Connection, Self::Error> {
        self.accept_with(&CallContext::default())
    }

    /// 在给定上下文约束下接受连接。
    fn accept_with(&self, ctx: &CallContext) -> crate::Result<Self::Connection, Self::Error>;

    /// 关闭监听器。
    fn close(&self);

    /// 查询监听地址。
    fn local_addr(&self) -> PipeAddr {
        PipeAddr
    }
}

/// 统一的拨号接口。
///
/// # 契约说明（What）
/// - `dial_with`：阻塞直至连接交付给监听侧的排队区，或上下文取消/超时，或监听器关闭；
///   成功返回本端连接，不等待对端真正 `accept`；
/// - `dial`：以永不取消、无截止的默认上下文拨号。
pub trait Dialer: Send + Sync {
    /// 错误类型。
    type Error: core::fmt::Debug + Send + Sync + 'static;
    /// 拨号产出的连接类型。
    type Connection: Connection;

    /// 以默认上下文拨号。
    fn dial(&self) -> crate::Result<Self::Connection, Self::Error> {
        self.dial_with(&CallContext::default())
    }

    /// 在给定上下文约束下拨号。
    fn dial_with(&self, ctx: &CallContext) -> crate::Result<Self::Connection, Self::Error>;
}
