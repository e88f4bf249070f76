//! Broadcast engine
//!
//! Fans a message out to every participant except one. The participant
//! list is a snapshot from the server actor; the deliveries happen
//! outside the actor so a slow peer never stalls membership changes.

use tracing::{debug, warn};

use crate::error::AppError;
use crate::message;
use crate::server::ServerHandle;
use crate::types::ClientId;

#[derive(Debug, Clone)]
pub struct Broadcaster {
    server: ServerHandle,
}

impl Broadcaster {
    pub fn new(server: ServerHandle) -> Self {
        Self { server }
    }

    /// Deliver `text` to everyone but `exclude`, in admission order
    ///
    /// Each recipient also gets a fresh prompt with their own name so their
    /// input line stays framed. Queuing never waits: a recipient whose queue
    /// is closed or full is logged and skipped. It is not removed here, its
    /// own session does that. Returns how many recipients were reached.
    pub async fn broadcast(&self, exclude: ClientId, text: &str) -> Result<usize, AppError> {
        let recipients = self.server.snapshot().await?;
        let mut delivered = 0;

        for recipient in recipients.iter().filter(|r| r.id != exclude) {
            if let Err(e) = recipient.outbound.try_send(text) {
                warn!("Broadcast to {} ('{}') failed: {}", recipient.id, recipient.name, e);
                continue;
            }

            let prompt = message::prompt(&message::timestamp(), &recipient.name);
            if let Err(e) = recipient.outbound.try_send(prompt) {
                warn!("Prompt to {} ('{}') failed: {}", recipient.id, recipient.name, e);
                continue;
            }

            delivered += 1;
        }

        debug!("Broadcast from {} reached {} recipient(s)", exclude, delivered);
        Ok(delivered)
    }
}
