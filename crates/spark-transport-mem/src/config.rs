/// 内存监听器配置。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 把排队容量、管道软上限与报文类型开关集中在一个可序列化的值里，
///   调用方可以从配置文件读取，也可以用 `with_*` 链式构造。
///
/// ## 契约说明（What）
/// - `backlog`：每种传输类型的排队容量；`0` 表示纯会合，拨号只在有接受方等待时完成；
/// - `buffer_limit`：监听器为每条连接创建管道时使用的软上限；`0` 表示不设上限；
/// - `datagram`：是否同时接受报文拨号；
/// - 缺省字段取 [`Default`] 中的值（`#[serde(default)]`）。
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MemTransportConfig {
    pub backlog: usize,
    pub buffer_limit: usize,
    pub datagram: bool,
}

impl Default for MemTransportConfig {
    fn default() -> Self {
        Self {
            backlog: 0,
            buffer_limit: 0,
            datagram: false,
        }
    }
}

impl MemTransportConfig {
    pub fn with_backlog(mut self, backlog: usize) -> Self {
        self.backlog = backlog;
        self
    }

    pub fn with_buffer_limit(mut self, buffer_limit: usize) -> Self {
        self.buffer_limit = buffer_limit;
        self
    }

    /// 启用报文类型。
    pub fn with_datagram(mut self, enabled: bool) -> Self {
        self.datagram = enabled;
        self
    }
}
