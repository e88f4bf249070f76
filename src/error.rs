//! Error types for the chat server
//!
//! Defines application-level errors and outbound send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Covers both fatal errors (the session ends) and
/// naming/admission errors (the peer is told and may retry).
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error on the peer connection (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Peer closed the connection (fatal)
    #[error("Peer disconnected")]
    Disconnected,

    /// Outbound queue closed, the writer task is gone (fatal)
    #[error("Send error: {0}")]
    Send(#[from] SendError),

    /// Transcript file could not be read or written
    #[error("Transcript error: {0}")]
    Transcript(#[source] std::io::Error),

    /// Chat server actor is gone (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// Name was empty after trimming
    #[error("Empty name")]
    EmptyName,

    /// Name is used by another participant
    #[error("Name already taken")]
    NameTaken,

    /// Room already holds the maximum number of participants
    #[error("Room is full")]
    RoomFull,

    /// Client is not in the membership table
    #[error("Not a member")]
    NotMember,

    /// Wrong number of command line arguments
    #[error("[USAGE]: ./TCPChat $port")]
    Usage,

    /// Port argument is not a valid port number
    #[error("Invalid port: {0}")]
    InvalidPort(String),
}

impl AppError {
    /// Naming errors the peer can fix by choosing another name
    pub fn is_name_error(&self) -> bool {
        matches!(self, AppError::EmptyName | AppError::NameTaken)
    }

    /// The peer simply went away; not worth more than a debug line
    pub fn is_disconnect(&self) -> bool {
        matches!(self, AppError::Disconnected | AppError::Send(_))
    }
}

/// Message send errors
///
/// Occurs when attempting to send through a closed outbound queue, or
/// when a non-blocking send finds the queue full.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The peer is not draining its queue
    #[error("Channel full")]
    Full,
}
