#[tokio::main]
async fn main() -> std::io::Result<()> {
    arena_core::frameworks::server::run_with_config().await
}
