//! 字节流管道的阻塞、截止、背压与关闭语义。
//!
//! 所有阻塞场景都在独立 OS 线程中执行，并以宽松的时间上限断言“及时唤醒”，
//! 避免在负载较高的 CI 上出现偶发失败。

use spark_transport::{Connection, Deadline};
use spark_transport_mem::{MemTransportError, StreamPipe, async_pipe, limited_async_pipe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const WAKE_MARGIN: Duration = Duration::from_secs(1);

fn past() -> Deadline {
    Deadline::at(Instant::now() - Duration::from_secs(1))
}

type ReadOutcome = (Result<usize, MemTransportError>, Duration);

fn spawn_read(pipe: &Arc<StreamPipe>, len: usize) -> thread::JoinHandle<ReadOutcome> {
    let pipe = Arc::clone(pipe);
    thread::spawn(move || {
        let started = Instant::now();
        let mut buf = vec![0u8; len];
        (pipe.read(&mut buf), started.elapsed())
    })
}

#[test]
fn bytes_flow_in_both_directions() {
    let (left, right) = async_pipe();
    assert_eq!(left.write(b"hello"), Ok(5));
    assert_eq!(right.write(b"world!"), Ok(6));

    let mut buf = [0u8; 16];
    assert_eq!(right.read(&mut buf), Ok(5));
    assert_eq!(&buf[..5], b"hello");
    assert_eq!(left.read(&mut buf), Ok(6));
    assert_eq!(&buf[..6], b"world!");
}

#[test]
fn partial_reads_preserve_order() {
    let (left, right) = async_pipe();
    left.write(b"abcdef").expect("写入");

    let mut buf = [0u8; 4];
    assert_eq!(right.read(&mut buf), Ok(4));
    assert_eq!(&buf, b"abcd");
    assert_eq!(right.read(&mut buf), Ok(2));
    assert_eq!(&buf[..2], b"ef");
}

#[test]
fn operations_after_close_fail_without_blocking() {
    let (left, right) = async_pipe();
    left.close();
    left.close();

    let mut buf = [0u8; 8];
    assert_eq!(left.read(&mut buf), Err(MemTransportError::Closed));
    assert_eq!(left.write(b"x"), Err(MemTransportError::Closed));
    assert_eq!(
        right.read(&mut buf),
        Err(MemTransportError::Closed),
        "关闭任一端后对端读取必须观测到终止"
    );
    assert_eq!(right.write(b"x"), Err(MemTransportError::Closed));
    assert!(left.is_closed() && right.is_closed());
}

#[test]
fn buffered_bytes_survive_close() {
    let (left, right) = async_pipe();
    left.write(b"last words").expect("写入");
    left.close();

    let mut buf = [0u8; 32];
    assert_eq!(right.read(&mut buf), Ok(10));
    assert_eq!(right.read(&mut buf), Err(MemTransportError::Closed));
}

#[test]
fn expired_deadlines_fail_immediately_and_keep_failing() {
    let (left, right) = async_pipe();
    left.set_deadline(past());

    let started = Instant::now();
    let mut buf = [0u8; 8];
    assert_eq!(left.read(&mut buf), Err(MemTransportError::Timeout));
    assert_eq!(left.read(&mut buf), Err(MemTransportError::Timeout));
    assert_eq!(left.write(b"x"), Err(MemTransportError::Timeout));
    assert_eq!(left.write(b"x"), Err(MemTransportError::Timeout));
    assert!(started.elapsed() < WAKE_MARGIN, "过期截止不得阻塞");

    // 截止只约束设置它的一端。
    assert_eq!(right.write(b"ok"), Ok(2));
}

#[test]
fn clearing_the_deadline_recovers() {
    let (left, right) = async_pipe();
    left.set_read_deadline(past());
    let mut buf = [0u8; 8];
    assert_eq!(left.read(&mut buf), Err(MemTransportError::Timeout));

    left.set_read_deadline(Deadline::none());
    right.write(b"back").expect("写入");
    assert_eq!(left.read(&mut buf), Ok(4));
}

#[test]
fn blocked_read_wakes_at_a_deadline_set_later() {
    let (left, _right) = async_pipe();
    let left = Arc::new(left);
    let reader = spawn_read(&left, 8);

    thread::sleep(Duration::from_millis(50));
    left.set_read_deadline(Deadline::after(Duration::from_millis(100)));

    let (result, elapsed) = reader.join().expect("读线程不应 panic");
    assert_eq!(result, Err(MemTransportError::Timeout));
    assert!(elapsed < Duration::from_millis(150) + WAKE_MARGIN, "读者未及时醒来: {elapsed:?}");
}

#[test]
fn shortening_a_deadline_wakes_the_blocked_reader() {
    let (left, _right) = async_pipe();
    left.set_read_deadline(Deadline::after(Duration::from_secs(60)));
    let left = Arc::new(left);
    let reader = spawn_read(&left, 8);

    thread::sleep(Duration::from_millis(50));
    left.set_read_deadline(Deadline::after(Duration::from_millis(50)));

    let (result, elapsed) = reader.join().expect("读线程不应 panic");
    assert_eq!(result, Err(MemTransportError::Timeout));
    assert!(elapsed < WAKE_MARGIN, "缩短后的截止必须生效: {elapsed:?}");
}

#[test]
fn blocked_read_wakes_when_the_peer_closes() {
    let (left, right) = async_pipe();
    let left = Arc::new(left);
    let reader = spawn_read(&left, 8);

    thread::sleep(Duration::from_millis(50));
    right.close();

    let (result, elapsed) = reader.join().expect("读线程不应 panic");
    assert_eq!(result, Err(MemTransportError::Closed));
    assert!(elapsed < WAKE_MARGIN);
}

#[test]
fn blocked_read_receives_a_later_write() {
    let (left, right) = async_pipe();
    let left = Arc::new(left);
    let reader = spawn_read(&left, 8);

    thread::sleep(Duration::from_millis(20));
    right.write(b"late").expect("写入");

    let (result, _) = reader.join().expect("读线程不应 panic");
    assert_eq!(result, Ok(4));
}

#[test]
fn soft_limit_blocks_writers_until_the_reader_drains() {
    let (left, right) = limited_async_pipe(16);
    assert_eq!(
        left.write(&[1; 64]),
        Ok(64),
        "字节流从不因长度被拒绝，缓冲未超限时直接写入"
    );

    let left = Arc::new(left);
    let writer = {
        let left = Arc::clone(&left);
        thread::spawn(move || left.write(&[2; 8]))
    };

    thread::sleep(Duration::from_millis(50));
    assert!(!writer.is_finished(), "缓冲超过软上限时写者必须阻塞");

    let mut buf = [0u8; 64];
    assert_eq!(right.read(&mut buf), Ok(64));
    assert_eq!(writer.join().expect("写线程不应 panic"), Ok(8));
    assert_eq!(right.read(&mut buf), Ok(8));
    assert_eq!(&buf[..8], &[2; 8]);
}

#[test]
fn blocked_writer_fails_when_the_pipe_closes() {
    let (left, right) = limited_async_pipe(1);
    left.write(&[0; 2]).expect("首次写入");
    let left = Arc::new(left);
    let writer = {
        let left = Arc::clone(&left);
        thread::spawn(move || left.write(&[0; 2]))
    };

    thread::sleep(Duration::from_millis(50));
    right.close();
    assert_eq!(
        writer.join().expect("写线程不应 panic"),
        Err(MemTransportError::Closed)
    );
}

#[test]
fn directions_do_not_contend() {
    let (left, right) = limited_async_pipe(4);
    left.write(&[0; 8]).expect("填满左到右方向");

    // 左到右方向已超限，右到左方向不受影响。
    assert_eq!(right.write(b"free"), Ok(4));
    let mut buf = [0u8; 4];
    assert_eq!(left.read(&mut buf), Ok(4));
}

#[test]
fn dropping_an_end_does_not_close_the_peer() {
    let (left, right) = async_pipe();
    drop(left);
    assert!(!right.is_closed());
    assert_eq!(right.write(b"into the void"), Ok(13));

    right.set_read_deadline(Deadline::after(Duration::from_millis(20)));
    let mut buf = [0u8; 4];
    assert_eq!(right.read(&mut buf), Err(MemTransportError::Timeout));
}

#[test]
fn pipes_work_through_the_connection_trait() {
    fn ping<C>(conn: &C) -> Result<usize, MemTransportError>
    where
        C: Connection<Error = MemTransportError>,
    {
        conn.write(b"ping")
    }

    let (left, right) = async_pipe();
    assert_eq!(ping(&left), Ok(4));
    let mut buf = [0u8; 4];
    assert_eq!(Connection::read(&right, &mut buf), Ok(4));
    Connection::close(&right);
    assert_eq!(ping(&left), Err(MemTransportError::Closed));
}
