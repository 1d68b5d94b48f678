//! 报文管道：原子报文、缓冲区不足时非破坏性失败、超限报文立即拒绝。

use spark_transport::{DatagramConnection, Deadline, PipeAddr};
use spark_transport_mem::{MemTransportError, async_packet_pipe, limited_async_packet_pipe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn short_buffer_keeps_the_record_queued() {
    let (writer, reader) = async_packet_pipe();
    for len in [10usize, 20, 5] {
        let record = vec![len as u8; len];
        assert_eq!(writer.write(&record), Ok(len));
    }

    let mut big = [0u8; 30];
    assert_eq!(reader.read(&mut big), Ok(10));
    assert!(big[..10].iter().all(|byte| *byte == 10));

    let mut small = [0u8; 15];
    assert_eq!(
        reader.read(&mut small),
        Err(MemTransportError::ShortBuffer {
            required: 20,
            capacity: 15
        })
    );

    let mut exact = [0u8; 20];
    assert_eq!(reader.read(&mut exact), Ok(20), "重试时报文必须仍在队首");
    assert!(exact.iter().all(|byte| *byte == 20));

    assert_eq!(reader.read(&mut big), Ok(5));
    assert!(big[..5].iter().all(|byte| *byte == 5));
}

#[test]
fn records_are_never_coalesced() {
    let (writer, reader) = async_packet_pipe();
    writer.write(b"ab").expect("写入");
    writer.write(b"cd").expect("写入");

    let mut buf = [0u8; 16];
    assert_eq!(reader.read(&mut buf), Ok(2));
    assert_eq!(&buf[..2], b"ab");
    assert_eq!(reader.read(&mut buf), Ok(2));
    assert_eq!(&buf[..2], b"cd");
}

#[test]
fn oversized_record_is_rejected_without_blocking() {
    let (writer, _reader) = limited_async_packet_pipe(8);
    writer.write(&[0; 8]).expect("恰好等于上限的报文可以写入");
    writer.write(&[0; 8]).expect("缓冲未超限");

    let started = Instant::now();
    assert_eq!(
        writer.write(&[0; 9]),
        Err(MemTransportError::TooLarge { len: 9, limit: 8 })
    );
    assert!(
        started.elapsed() < Duration::from_millis(500),
        "永远放不下的报文必须立即失败，而不是先阻塞"
    );
}

#[test]
fn backpressure_counts_total_queued_bytes() {
    let (writer, reader) = limited_async_packet_pipe(8);
    writer.write(&[1; 5]).expect("写入");
    writer.write(&[2; 5]).expect("已缓冲 5 字节，未超限");

    let writer = Arc::new(writer);
    let blocked = {
        let writer = Arc::clone(&writer);
        thread::spawn(move || writer.write(&[3; 5]))
    };
    thread::sleep(Duration::from_millis(50));
    assert!(!blocked.is_finished(), "已缓冲 10 字节超过上限 8，写者必须阻塞");

    let mut buf = [0u8; 8];
    assert_eq!(reader.read(&mut buf), Ok(5));
    assert_eq!(blocked.join().expect("写线程不应 panic"), Ok(5));
}

#[test]
fn placeholder_address_on_every_call() {
    let (left, right) = async_packet_pipe();
    assert_eq!(left.send_to(b"x", &PipeAddr), Ok(1));
    let mut buf = [0u8; 1];
    assert_eq!(right.recv_from(&mut buf), Ok((1, PipeAddr)));

    right.set_read_deadline(Deadline::after(Duration::from_millis(20)));
    assert_eq!(
        DatagramConnection::recv_from(&right, &mut buf),
        Err(MemTransportError::Timeout)
    );
}

#[test]
fn close_ends_both_directions() {
    let (left, right) = async_packet_pipe();
    left.write(b"queued").expect("写入");
    right.close();

    assert_eq!(left.write(b"x"), Err(MemTransportError::Closed));
    let mut buf = [0u8; 8];
    assert_eq!(left.read(&mut buf), Err(MemTransportError::Closed));
    assert_eq!(
        right.read(&mut buf),
        Err(MemTransportError::Closed),
        "关闭后的报文读取不得交付已入队的报文"
    );
}

#[test]
fn read_issued_after_close_fails_even_with_queued_records() {
    let (left, right) = async_packet_pipe();
    left.write(b"queued").expect("写入");
    left.write(b"second").expect("写入");
    left.close();

    let mut buf = [0u8; 8];
    assert_eq!(right.read(&mut buf), Err(MemTransportError::Closed));
    assert_eq!(
        right.recv_from(&mut buf),
        Err(MemTransportError::Closed),
        "recv_from 与 read 共享同一关闭语义"
    );
    assert_eq!(left.read(&mut buf), Err(MemTransportError::Closed));
}

#[test]
fn close_wakes_a_blocked_packet_reader() {
    let (left, right) = async_packet_pipe();
    let right = Arc::new(right);
    let reader = {
        let right = Arc::clone(&right);
        thread::spawn(move || right.read(&mut [0u8; 8]))
    };
    thread::sleep(Duration::from_millis(20));
    left.close();
    assert_eq!(
        reader.join().expect("读线程不应 panic"),
        Err(MemTransportError::Closed)
    );
}

#[test]
fn write_deadline_recovers_after_clear() {
    let (left, right) = async_packet_pipe();
    left.set_write_deadline(Deadline::at(Instant::now() - Duration::from_secs(1)));
    assert_eq!(left.write(b"x"), Err(MemTransportError::Timeout));

    left.set_write_deadline(Deadline::none());
    assert_eq!(left.write(b"x"), Ok(1));
    let mut buf = [0u8; 1];
    assert_eq!(right.read(&mut buf), Ok(1));
}
