use core::fmt;

/// `PipeAddr` 是内存传输端点统一返回的占位地址。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 调用方往往会记录 `local_addr`/`peer_addr` 用于日志或指标标签，内存管道没有真实地址，
///   但仍需返回一个稳定、非空的值，让这些代码路径无需特判。
/// - 管道只有一个对端，因此地址不承载任何寻址信息。
///
/// ## 合同（What）
/// - 所有实例相等；`network()` 恒为 `"pipe"`；`Display` 输出 `"pipe"`。
/// - **后置条件**：值不可变，可自由复制。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipeAddr;

impl PipeAddr {
    /// 网络类型标识。
    pub const NETWORK: &'static str = "pipe";

    /// 返回网络类型标识，等价于 [`PipeAddr::NETWORK`]。
    pub const fn network(&self) -> &'static str {
        Self::NETWORK
    }
}

impl fmt::Display for PipeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::NETWORK)
    }
}
