// One arena server per test binary, started on an ephemeral port.
use arena_core::ServerConfig;
use std::{
    net::TcpStream,
    sync::{OnceLock, mpsc},
    time::Duration,
};

static SERVER_ADDR: OnceLock<String> = OnceLock::new();

/// Starts the server on first use and returns its `host:port`.
pub fn ensure_server() -> &'static str {
    SERVER_ADDR.get_or_init(|| {
        let (addr_tx, addr_rx) = mpsc::channel();
        // A dedicated thread and runtime so the server outlives each `#[tokio::test]` runtime.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                addr_tx.send(addr.to_string()).expect("publish test addr");

                let config = ServerConfig {
                    port: addr.port(),
                    tick_interval: Duration::from_millis(10),
                    seed: Some(1),
                    ..ServerConfig::default()
                };
                arena_core::serve(listener, config).await.expect("server failed");
            });
        });

        let addr = addr_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("server thread should publish its address");
        wait_until_accepting(&addr);
        addr
    })
}

fn wait_until_accepting(addr: &str) {
    for _ in 0..100 {
        if TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("server did not become ready in time");
}
