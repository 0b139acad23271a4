use mcp_schema_server::config::ServerConfig;
use mcp_schema_server::server::McpServer;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let mut server = McpServer::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("fatal error: {e}");
        std::process::exit(1);
    }
}
