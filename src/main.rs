//! Chat relay binary
//!
//! Usage: chat-relay [BIND_ADDR]
//!
//! Accepts `IP`, `IP:PORT`, `localhost`, or `localhost:PORT`; defaults to
//! 0.0.0.0:7475. Runs until terminated.

use std::net::SocketAddr;

use chat_relay::{ChatServer, ServerConfig};

const DEFAULT_PORT: u16 = 7475;

/// Parse a bind address from a command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:7475
/// - "127.0.0.1" -> 127.0.0.1:7475
/// - "0.0.0.0:9000" -> 0.0.0.0:9000
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "invalid bind address '{}'; expected IP:PORT, IP, or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: chat-relay [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:7475)");
    eprintln!();
    eprintln!("Every line a client sends is relayed to all connected clients.");
    eprintln!("Try it: nc localhost 7475");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let bind_addr = match args.get(1) {
        Some(arg) => match parse_bind_addr(arg) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("chat_relay=info")),
        )
        .init();

    let config = ServerConfig::default().bind(bind_addr);
    let server = ChatServer::bind(config).await?;
    server.run().await?;

    Ok(())
}
