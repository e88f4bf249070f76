//! ChatServer Actor implementation
//!
//! The central actor that owns the membership table. Every read and
//! mutation goes through one command channel and is applied in a single
//! step, so compound check-then-act sequences (validate name, check
//! capacity, insert) cannot interleave between sessions.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::error::AppError;
use crate::participant::{Participant, Recipient};
use crate::room::Room;
use crate::types::ClientId;

/// Commands sent from sessions to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// Validate a candidate name without reserving it
    CheckName {
        name: String,
        reply: oneshot::Sender<Result<(), AppError>>,
    },
    /// Re-validate the name, check capacity, queue the history and insert
    Admit {
        participant: Participant,
        history: String,
        reply: oneshot::Sender<Result<(), AppError>>,
    },
    /// Remove a participant (no-op if absent)
    Remove {
        client_id: ClientId,
        reply: oneshot::Sender<bool>,
    },
    /// Change a participant's display name
    Rename {
        client_id: ClientId,
        name: String,
        reply: oneshot::Sender<Result<String, AppError>>,
    },
    /// Copy of current participants
    Snapshot {
        reply: oneshot::Sender<Vec<Recipient>>,
    },
    /// Number of current participants
    Count {
        reply: oneshot::Sender<usize>,
    },
}

/// The main ChatServer actor
///
/// Owns the room and processes commands from session handlers.
pub struct ChatServer {
    room: Room,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>, capacity: usize) -> Self {
        Self {
            room: Room::new(capacity),
            receiver,
        }
    }

    /// Spawn the actor and return a handle to it
    pub fn start(capacity: usize, buffer: usize) -> ServerHandle {
        let (sender, receiver) = mpsc::channel(buffer);
        tokio::spawn(ChatServer::new(receiver, capacity).run());
        ServerHandle::new(sender)
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started (capacity {})", self.room.capacity());

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    ///
    /// A dropped reply receiver means the session went away; ignore it.
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::CheckName { name, reply } => {
                let _ = reply.send(self.room.validate_name(&name));
            }
            ServerCommand::Admit {
                participant,
                history,
                reply,
            } => {
                let _ = reply.send(self.handle_admit(participant, history));
            }
            ServerCommand::Remove { client_id, reply } => {
                let _ = reply.send(self.handle_remove(client_id));
            }
            ServerCommand::Rename {
                client_id,
                name,
                reply,
            } => {
                let _ = reply.send(self.handle_rename(client_id, &name));
            }
            ServerCommand::Snapshot { reply } => {
                let _ = reply.send(self.room.snapshot());
            }
            ServerCommand::Count { reply } => {
                let _ = reply.send(self.room.len());
            }
        }
    }

    /// The history goes into the newcomer's queue before the newcomer is
    /// visible to any snapshot, so it precedes all live traffic.
    fn handle_admit(&mut self, participant: Participant, history: String) -> Result<(), AppError> {
        let client_id = participant.id;
        let name = participant.name.clone();

        self.room.check_admission(&name)?;
        if !history.is_empty() {
            participant.outbound.try_send(history)?;
        }
        self.room.insert(participant)?;

        info!("Client {} joined as '{}'", client_id, name);
        debug!("Participants: {}/{}", self.room.len(), self.room.capacity());
        Ok(())
    }

    fn handle_remove(&mut self, client_id: ClientId) -> bool {
        match self.room.remove(client_id) {
            Some(participant) => {
                info!("Client {} ('{}') removed", client_id, participant.name);
                debug!("Participants: {}/{}", self.room.len(), self.room.capacity());
                true
            }
            None => false,
        }
    }

    fn handle_rename(&mut self, client_id: ClientId, name: &str) -> Result<String, AppError> {
        let old = self.room.rename(client_id, name)?;
        info!("Client {} renamed '{}' -> '{}'", client_id, old, name);
        Ok(old)
    }
}

/// Cloneable capability handle to the ChatServer actor
#[derive(Debug, Clone)]
pub struct ServerHandle {
    sender: mpsc::Sender<ServerCommand>,
}

impl ServerHandle {
    pub fn new(sender: mpsc::Sender<ServerCommand>) -> Self {
        Self { sender }
    }

    /// Send a command and wait for the actor's reply
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> ServerCommand,
    ) -> Result<T, AppError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| AppError::ChannelSend)?;
        response.await.map_err(|_| AppError::ChannelSend)
    }

    /// Fails with `EmptyName` or `NameTaken` if the name cannot be claimed now
    pub async fn check_name(&self, name: &str) -> Result<(), AppError> {
        let name = name.to_string();
        self.request(|reply| ServerCommand::CheckName { name, reply })
            .await?
    }

    /// Atomically re-check the name and capacity, then insert
    pub async fn admit(&self, participant: Participant) -> Result<(), AppError> {
        self.admit_with_history(participant, String::new()).await
    }

    /// Like `admit`, but the newcomer's first queued text is `history`
    ///
    /// Nothing is queued when admission fails.
    pub async fn admit_with_history(
        &self,
        participant: Participant,
        history: String,
    ) -> Result<(), AppError> {
        self.request(|reply| ServerCommand::Admit {
            participant,
            history,
            reply,
        })
        .await?
    }

    /// Remove a participant; returns whether it was present
    pub async fn remove(&self, client_id: ClientId) -> Result<bool, AppError> {
        self.request(|reply| ServerCommand::Remove { client_id, reply })
            .await
    }

    /// Rename a participant, returning the previous name
    pub async fn rename(&self, client_id: ClientId, name: &str) -> Result<String, AppError> {
        let name = name.to_string();
        self.request(|reply| ServerCommand::Rename {
            client_id,
            name,
            reply,
        })
        .await?
    }

    pub async fn snapshot(&self) -> Result<Vec<Recipient>, AppError> {
        self.request(|reply| ServerCommand::Snapshot { reply }).await
    }

    pub async fn count(&self) -> Result<usize, AppError> {
        self.request(|reply| ServerCommand::Count { reply }).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::participant::Outbound;
    use crate::room::MAX_CAPACITY;

    fn participant(name: &str) -> Participant {
        let (outbound, _rx) = Outbound::channel(4);
        Participant::new(ClientId::next(), name, outbound)
    }

    #[tokio::test]
    async fn test_admit_and_remove() {
        let server = ChatServer::start(MAX_CAPACITY, 16);
        let alice = participant("alice");
        let alice_id = alice.id;

        server.admit(alice).await.unwrap();
        assert_eq!(server.count().await.unwrap(), 1);

        assert!(server.remove(alice_id).await.unwrap());
        assert!(!server.remove(alice_id).await.unwrap());
        assert_eq!(server.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_history_precedes_live_traffic() {
        let server = ChatServer::start(MAX_CAPACITY, 16);
        let (outbound, mut rx) = Outbound::channel(4);
        let bob = Participant::new(ClientId::next(), "bob", outbound);

        server
            .admit_with_history(bob, "[alice]:earlier\n".to_string())
            .await
            .unwrap();
        for recipient in server.snapshot().await.unwrap() {
            recipient.outbound.try_send("live\n").unwrap();
        }

        assert_eq!(rx.recv().await.as_deref(), Some("[alice]:earlier\n"));
        assert_eq!(rx.recv().await.as_deref(), Some("live\n"));
    }

    #[tokio::test]
    async fn test_rejected_admission_queues_no_history() {
        let server = ChatServer::start(1, 16);
        server.admit(participant("alice")).await.unwrap();

        let (outbound, mut rx) = Outbound::channel(4);
        let bob = Participant::new(ClientId::next(), "bob", outbound);
        assert!(matches!(
            server.admit_with_history(bob, "history\n".to_string()).await,
            Err(AppError::RoomFull)
        ));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_check_name() {
        let server = ChatServer::start(MAX_CAPACITY, 16);
        server.admit(participant("alice")).await.unwrap();

        assert!(matches!(server.check_name("").await, Err(AppError::EmptyName)));
        assert!(matches!(
            server.check_name("alice").await,
            Err(AppError::NameTaken)
        ));
        assert!(server.check_name("bob").await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_claims_of_same_name() {
        let server = ChatServer::start(MAX_CAPACITY, 16);

        let first = tokio::spawn({
            let server = server.clone();
            async move { server.admit(participant("alice")).await }
        });
        let second = tokio::spawn({
            let server = server.clone();
            async move { server.admit(participant("alice")).await }
        });

        let results = [first.await.unwrap(), second.await.unwrap()];
        let admitted = results.iter().filter(|r| r.is_ok()).count();
        let taken = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::NameTaken)))
            .count();

        assert_eq!(admitted, 1);
        assert_eq!(taken, 1);
        assert_eq!(server.count().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_admissions_respect_capacity() {
        let server = ChatServer::start(MAX_CAPACITY, 64);

        let tasks: Vec<_> = (0..30)
            .map(|i| {
                let server = server.clone();
                tokio::spawn(async move { server.admit(participant(&format!("user{}", i))).await })
            })
            .collect();

        let mut admitted = 0;
        let mut full = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(()) => admitted += 1,
                Err(AppError::RoomFull) => full += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(admitted, MAX_CAPACITY);
        assert_eq!(full, 30 - MAX_CAPACITY);
        assert_eq!(server.count().await.unwrap(), MAX_CAPACITY);
    }

    #[tokio::test]
    async fn test_rename() {
        let server = ChatServer::start(MAX_CAPACITY, 16);
        let bob = participant("bob");
        let bob_id = bob.id;
        server.admit(bob).await.unwrap();
        server.admit(participant("rob")).await.unwrap();

        assert!(matches!(
            server.rename(bob_id, "rob").await,
            Err(AppError::NameTaken)
        ));

        let names: HashSet<_> = server
            .snapshot()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert!(names.contains("bob"));

        assert_eq!(server.rename(bob_id, "bobby").await.unwrap(), "bob");
        assert!(server.check_name("bob").await.is_ok());
    }

    #[tokio::test]
    async fn test_handle_fails_after_actor_stops() {
        let (sender, receiver) = mpsc::channel(4);
        drop(receiver);
        let server = ServerHandle::new(sender);

        assert!(matches!(server.count().await, Err(AppError::ChannelSend)));
    }
}
