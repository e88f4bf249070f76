//! Participant struct definition
//!
//! Represents a named, admitted chat member and the outbound queue used
//! to deliver text to their connection.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::SendError;
use crate::types::ClientId;

/// Handle to a connection's outbound line queue
///
/// The receiving end is drained by the connection's writer task. Once that
/// task stops (socket write failed or the session ended) every send fails.
#[derive(Debug, Clone)]
pub struct Outbound {
    sender: mpsc::Sender<String>,
}

impl Outbound {
    /// Create a queue with room for `capacity` pending writes
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Queue text for delivery to the peer
    ///
    /// Returns an error if the channel is closed (peer disconnected).
    pub async fn send(&self, text: impl Into<String>) -> Result<(), SendError> {
        self.sender
            .send(text.into())
            .await
            .map_err(|_| SendError::ChannelClosed)
    }

    /// Queue text without waiting for space
    ///
    /// Used for fan-out, where a peer that stopped reading must not hold
    /// up delivery to everyone else.
    pub fn try_send(&self, text: impl Into<String>) -> Result<(), SendError> {
        self.sender.try_send(text.into()).map_err(|e| match e {
            TrySendError::Full(_) => SendError::Full,
            TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }
}

/// Admitted chat member
///
/// Owned by the membership table. Only the member's own session renames
/// or removes it.
#[derive(Debug)]
pub struct Participant {
    /// Unique identifier for this participant
    pub id: ClientId,
    /// Display name, unique within the room
    pub name: String,
    /// Server → peer text queue
    pub outbound: Outbound,
}

impl Participant {
    pub fn new(id: ClientId, name: impl Into<String>, outbound: Outbound) -> Self {
        Self {
            id,
            name: name.into(),
            outbound,
        }
    }

    /// Point-in-time copy used for fan-out
    pub fn recipient(&self) -> Recipient {
        Recipient {
            id: self.id,
            name: self.name.clone(),
            outbound: self.outbound.clone(),
        }
    }
}

/// Snapshot entry of a participant, safe to use outside the server actor
#[derive(Debug, Clone)]
pub struct Recipient {
    pub id: ClientId,
    pub name: String,
    pub outbound: Outbound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_outbound_delivers_in_order() {
        let (outbound, mut rx) = Outbound::channel(8);
        outbound.send("one").await.unwrap();
        outbound.send(String::from("two")).await.unwrap();

        assert_eq!(rx.recv().await.as_deref(), Some("one"));
        assert_eq!(rx.recv().await.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_outbound_closed_after_receiver_dropped() {
        let (outbound, rx) = Outbound::channel(8);
        drop(rx);

        assert!(matches!(
            outbound.send("lost").await,
            Err(SendError::ChannelClosed)
        ));
        assert!(matches!(
            outbound.try_send("lost"),
            Err(SendError::ChannelClosed)
        ));
    }

    #[tokio::test]
    async fn test_try_send_reports_full_queue() {
        let (outbound, mut rx) = Outbound::channel(1);
        outbound.try_send("first").unwrap();

        assert!(matches!(outbound.try_send("second"), Err(SendError::Full)));

        assert_eq!(rx.recv().await.as_deref(), Some("first"));
        outbound.try_send("third").unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("third"));
    }

    #[tokio::test]
    async fn test_recipient_copies_identity() {
        let (outbound, _rx) = Outbound::channel(8);
        let participant = Participant::new(ClientId::next(), "Alice", outbound);
        let recipient = participant.recipient();

        assert_eq!(recipient.id, participant.id);
        assert_eq!(recipient.name, "Alice");
    }
}
