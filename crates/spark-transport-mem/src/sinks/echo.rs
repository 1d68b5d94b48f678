use crate::pipe::{StreamPipe, async_pipe};
use std::io;
use std::thread;

/// 返回一个回显连接：写入它的数据会原样从它读回。
///
/// 对端由后台线程驱动，把读到的一切复制回去；复制因关闭或错误停止后，
/// 后台线程关闭自己的一端并退出。
///
/// # 错误
/// 无法创建后台线程时返回操作系统错误。
pub fn echoer() -> io::Result<StreamPipe> {
    let (local, remote) = async_pipe();
    thread::Builder::new()
        .name("spark-mem-echo".into())
        .spawn(move || echo(remote))?;
    Ok(local)
}

fn echo(conn: StreamPipe) {
    let mut reader = &conn;
    let mut writer = &conn;
    match io::copy(&mut reader, &mut writer) {
        Ok(bytes) => tracing::debug!(bytes, "echo loop finished"),
        Err(error) => tracing::debug!(%error, "echo loop stopped"),
    }
    conn.close();
}
