//! Multi-user TCP Chat Server Library
//!
//! A line-oriented chat room over raw TCP built on tokio, using the Actor
//! pattern for the shared membership table.
//!
//! # Features
//! - Greeting banner and name prompt on connect
//! - Unique, non-empty display names
//! - Room capacity with a waiting queue (repeated "room full" notices)
//! - Chat broadcast to every other participant
//! - Transcript replayed to newcomers
//! - `@help`, `@exit` and `@rename` commands
//! - Join, leave and rename notices
//!
//! # Architecture
//! - `ChatServer` is the actor that owns the membership table; every
//!   check-then-act (claim, admit, rename, remove) is one command
//! - Each connection runs a session task plus a writer task draining its
//!   outbound queue
//! - `Broadcaster` fans out over a snapshot, outside the actor
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use net_chat::{handle_connection, ChatServer, ServerConfig, SessionContext, Transcript};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::default();
//!     let listener = TcpListener::bind(config.bind_addr()).await.unwrap();
//!     let transcript = Arc::new(Transcript::new(&config.transcript_path));
//!     transcript.clear().await.unwrap();
//!
//!     let server = ChatServer::start(config.max_participants, 256);
//!     let ctx = SessionContext::new(server, transcript, Arc::new(config));
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         tokio::spawn(handle_connection(stream, ctx.clone()));
//!     }
//! }
//! ```

pub mod broadcast;
pub mod command;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod participant;
pub mod room;
pub mod server;
pub mod transcript;
pub mod types;

// Re-export main types for convenience
pub use broadcast::Broadcaster;
pub use command::Command;
pub use config::ServerConfig;
pub use error::{AppError, SendError};
pub use handler::{handle_connection, serve, SessionContext, SessionState};
pub use participant::{Outbound, Participant, Recipient};
pub use room::{Room, MAX_CAPACITY};
pub use server::{ChatServer, ServerCommand, ServerHandle};
pub use transcript::{Transcript, TranscriptGuard};
pub use types::ClientId;
