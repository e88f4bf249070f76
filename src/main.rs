//! Multi-user TCP Chat Server - Entry Point
//!
//! Clears the transcript, starts the ChatServer actor and accepts
//! connections forever.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use net_chat::{handle_connection, AppError, ChatServer, ServerConfig, SessionContext, Transcript};

/// Channel buffer size for server commands
const CHANNEL_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=net_chat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("net_chat=info")),
        )
        .init();

    let config = match ServerConfig::from_args(env::args().skip(1)) {
        Ok(config) => config,
        Err(AppError::Usage) => {
            println!("{}", AppError::Usage);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // Start TCP listener
    let listener = TcpListener::bind(config.bind_addr()).await?;
    println!("Listening on the port :{}", config.port);
    info!("Chat server listening on {}", config.bind_addr());

    // Fresh transcript for every run
    let transcript = Arc::new(Transcript::new(&config.transcript_path));
    transcript.clear().await?;

    let server = ChatServer::start(config.max_participants, CHANNEL_BUFFER_SIZE);
    let ctx = SessionContext::new(server, transcript, Arc::new(config));

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!("New connection from {}", addr);
                let ctx = ctx.clone();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    match handle_connection(stream, ctx).await {
                        Ok(()) => {}
                        Err(e) if e.is_disconnect() => debug!("Connection closed: {}", e),
                        Err(e) => error!("Connection handler error: {}", e),
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
