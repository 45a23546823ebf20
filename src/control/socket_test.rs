use super::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::{Duration, Instant, timeout};

const IO_TIMEOUT: Duration = Duration::from_millis(500);

#[tokio::test]
async fn udp_forwards_one_datagram_per_message() {
    let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = receiver.local_addr().unwrap().to_string();
    let control = SocketControl::spawn(Transport::Udp, addr, 16, IO_TIMEOUT);

    control.send("aag note BOWLING");
    control.send("hello");

    let mut buf = [0u8; 256];
    let n = timeout(Duration::from_secs(1), receiver.recv(&mut buf))
        .await
        .expect("first datagram timed out")
        .unwrap();
    assert_eq!(&buf[..n], b"aag note BOWLING");
    let n = timeout(Duration::from_secs(1), receiver.recv(&mut buf))
        .await
        .expect("second datagram timed out")
        .unwrap();
    assert_eq!(&buf[..n], b"hello");
}

#[tokio::test]
async fn tcp_forwards_newline_terminated_lines_in_order() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let control = SocketControl::spawn(Transport::Tcp, addr, 16, IO_TIMEOUT);

    control.send("first");
    control.send("aag note BOWLING");

    let (stream, _) = timeout(Duration::from_secs(1), listener.accept())
        .await
        .expect("accept timed out")
        .unwrap();
    let mut lines = BufReader::new(stream).lines();
    let first = timeout(Duration::from_secs(1), lines.next_line()).await.unwrap().unwrap();
    let second = timeout(Duration::from_secs(1), lines.next_line()).await.unwrap().unwrap();
    assert_eq!(first.as_deref(), Some("first"));
    assert_eq!(second.as_deref(), Some("aag note BOWLING"));
}

#[tokio::test]
async fn unreachable_tcp_target_drops_messages_and_keeps_worker_alive() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let (control, worker) = SocketControl::spawn_with_worker(Transport::Tcp, addr, 16, IO_TIMEOUT);
    control.send("lost one");
    control.send("lost two");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!worker.is_finished());

    drop(control);
    timeout(Duration::from_secs(1), worker)
        .await
        .expect("worker should stop once the queue closes")
        .unwrap();
}

#[tokio::test]
async fn refused_tcp_target_reconnects_on_next_message() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let control = SocketControl::spawn(Transport::Tcp, addr.to_string(), 16, IO_TIMEOUT);
    control.send("lost");
    let deadline = Instant::now() + Duration::from_secs(1);
    while control.tx.capacity() < 16 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    let listener = TcpListener::bind(addr).await.unwrap();
    control.send("after");

    let (stream, _) = timeout(Duration::from_secs(1), listener.accept())
        .await
        .expect("reconnect timed out")
        .unwrap();
    let mut lines = BufReader::new(stream).lines();
    let line = timeout(Duration::from_secs(1), lines.next_line()).await.unwrap().unwrap();
    assert_eq!(line.as_deref(), Some("after"));
}

#[tokio::test]
async fn stalled_tcp_peer_times_out_and_queue_keeps_draining() {
    // Accepts connections but never reads, so large writes cannot complete.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let mut held = Vec::new();

    let control = SocketControl::spawn(Transport::Tcp, addr, 4, Duration::from_millis(100));
    let big = "x".repeat(16 * 1024 * 1024);
    for _ in 0..4 {
        control.send(&big);
    }

    let deadline = Instant::now() + Duration::from_secs(5);
    while control.tx.capacity() < 4 && Instant::now() < deadline {
        if let Ok(Ok((stream, _))) = timeout(Duration::from_millis(10), listener.accept()).await {
            held.push(stream);
        }
    }
    assert_eq!(control.tx.capacity(), 4, "worker should drain the queue past a stalled peer");
    assert!(!held.is_empty());
}

#[test]
fn timeout_error_names_the_limit() {
    let err = ControlError::Timeout(Duration::from_millis(100));
    assert_eq!(err.to_string(), "control socket timed out after 100ms");
}

#[tokio::test]
async fn send_after_worker_stopped_does_not_panic() {
    let (tx, rx) = mpsc::channel::<String>(1);
    drop(rx);
    let control = SocketControl { tx, addr: "127.0.0.1:1".into() };
    control.send("nobody listening");
}

#[tokio::test]
async fn full_queue_drops_instead_of_blocking() {
    let (tx, mut rx) = mpsc::channel::<String>(1);
    let control = SocketControl { tx, addr: "127.0.0.1:1".into() };

    control.send("kept");
    control.send("dropped");

    assert_eq!(rx.recv().await.as_deref(), Some("kept"));
    assert!(rx.try_recv().is_err());
}
