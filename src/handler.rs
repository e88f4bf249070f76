//! Connection handler
//!
//! Drives one peer from connect to disconnect: greeting, naming,
//! capacity-gated admission, the chat loop and teardown. Output goes
//! through an outbound queue drained by a dedicated writer task, so this
//! session and concurrent broadcasts never write to the socket directly.

use std::sync::Arc;

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::broadcast::Broadcaster;
use crate::command::Command;
use crate::config::ServerConfig;
use crate::error::AppError;
use crate::message;
use crate::participant::{Outbound, Participant};
use crate::room::normalize_name;
use crate::server::ServerHandle;
use crate::transcript::Transcript;
use crate::types::ClientId;

/// Shared collaborators handed to every session
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub server: ServerHandle,
    pub broadcaster: Broadcaster,
    pub transcript: Arc<Transcript>,
    pub config: Arc<ServerConfig>,
}

impl SessionContext {
    pub fn new(server: ServerHandle, transcript: Arc<Transcript>, config: Arc<ServerConfig>) -> Self {
        Self {
            broadcaster: Broadcaster::new(server.clone()),
            server,
            transcript,
            config,
        }
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Naming,
    Admitting,
    Active,
    Closing,
}

/// Handle a new TCP connection
///
/// Assigns the client id, splits the stream and runs the session to
/// completion.
pub async fn handle_connection(stream: TcpStream, ctx: SessionContext) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let client_id = ClientId::next();
    info!("Client {} connected from {}", client_id, peer_addr);

    let (reader, writer) = stream.into_split();
    let result = serve(client_id, BufReader::new(reader), writer, ctx).await;

    info!("Client {} disconnected", client_id);
    result
}

/// Run a session over any line reader and byte writer
pub async fn serve<R, W>(
    client_id: ClientId,
    reader: R,
    writer: W,
    ctx: SessionContext,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (outbound, outbound_rx) = Outbound::channel(ctx.config.outbound_buffer);
    let write_task = tokio::spawn(write_loop(client_id, writer, outbound_rx));

    let mut session = Session::new(client_id, reader, outbound, ctx);
    let result = session.run().await;

    // Last queue handle goes away here; the writer drains and stops
    drop(session);
    if let Err(e) = write_task.await {
        warn!("Write task for {} panicked: {}", client_id, e);
    }

    result
}

/// Spawned writer: outbound queue -> peer
async fn write_loop<W>(client_id: ClientId, mut writer: W, mut rx: mpsc::Receiver<String>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(text) = rx.recv().await {
        let written = async {
            writer.write_all(text.as_bytes()).await?;
            writer.flush().await
        };
        if let Err(e) = written.await {
            debug!("Write to {} failed: {}", client_id, e);
            break;
        }
    }

    // Close the queue before shutdown so pending senders fail fast
    drop(rx);
    let _ = writer.shutdown().await;
    debug!("Write task ended for {}", client_id);
}

/// Per-connection state machine
struct Session<R> {
    id: ClientId,
    reader: R,
    outbound: Outbound,
    ctx: SessionContext,
    state: SessionState,
    name: String,
    /// In the membership table
    admitted: bool,
    /// Join notice went out, so a leave notice is owed
    announced: bool,
}

impl<R> Session<R>
where
    R: AsyncBufRead + Unpin,
{
    fn new(id: ClientId, reader: R, outbound: Outbound, ctx: SessionContext) -> Self {
        Self {
            id,
            reader,
            outbound,
            ctx,
            state: SessionState::Connecting,
            name: String::new(),
            admitted: false,
            announced: false,
        }
    }

    /// Drive the session, then tear down whatever path ended it
    async fn run(&mut self) -> Result<(), AppError> {
        let result = self.drive().await;
        if let Err(e) = &result {
            debug!("Session {} ended in {:?}: {}", self.id, self.state, e);
        }
        self.close().await;
        result
    }

    async fn drive(&mut self) -> Result<(), AppError> {
        self.send(message::greeting()).await?;

        self.enter_room().await?;

        self.transition(SessionState::Active);
        self.ctx
            .broadcaster
            .broadcast(self.id, &message::joined(&self.name))
            .await?;
        self.announced = true;

        self.chat_loop().await
    }

    /// Naming and Admitting until the participant is in the table
    async fn enter_room(&mut self) -> Result<(), AppError> {
        loop {
            self.transition(SessionState::Naming);
            let name = self.claim_name().await?;

            self.transition(SessionState::Admitting);
            match self.admit(&name).await {
                Ok(()) => {
                    self.name = name;
                    return Ok(());
                }
                // Someone else took the name after it was claimed
                Err(e) if e.is_name_error() => self.send(message::name_rejected(&e)).await?,
                Err(e) => return Err(e),
            }
        }
    }

    /// Prompt until the peer offers a name that is currently free
    async fn claim_name(&mut self) -> Result<String, AppError> {
        loop {
            let name = self.ask_name().await?;
            match self.ctx.server.check_name(&name).await {
                Ok(()) => return Ok(name),
                Err(e) if e.is_name_error() => {
                    debug!("Client {} offered rejected name '{}': {}", self.id, name, e);
                    self.send(message::name_rejected(&e)).await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn ask_name(&mut self) -> Result<String, AppError> {
        self.send(message::name_prompt()).await?;
        let line = self.read_line().await?;
        Ok(normalize_name(&line))
    }

    /// Wait for a free spot, then insert atomically along with the history
    ///
    /// Each attempt holds the transcript while it reads the history and
    /// joins, so every chat line reaches the newcomer exactly once, in the
    /// history or live. No lock is held while sleeping; capacity and name are
    /// re-checked by the server on every attempt.
    async fn admit(&mut self, name: &str) -> Result<(), AppError> {
        loop {
            let admitted = {
                let transcript = self.ctx.transcript.lock().await;
                let history = transcript.read_all().await.map_err(AppError::Transcript)?;
                let participant = Participant::new(self.id, name, self.outbound.clone());
                self.ctx.server.admit_with_history(participant, history).await
            };

            match admitted {
                Ok(()) => {
                    self.admitted = true;
                    return Ok(());
                }
                Err(AppError::RoomFull) => {
                    debug!("Room full, client {} waiting", self.id);
                    self.send(message::room_full()).await?;
                    tokio::time::sleep(self.ctx.config.full_room_interval).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn chat_loop(&mut self) -> Result<(), AppError> {
        loop {
            let timestamp = message::timestamp();
            self.send(message::prompt(&timestamp, &self.name)).await?;
            let line = self.read_line().await?;

            match Command::parse(&line) {
                Command::Empty => {}
                Command::Help => self.send(message::help()).await?,
                Command::Exit => {
                    info!("Client {} ('{}') sent @exit", self.id, self.name);
                    return Ok(());
                }
                Command::Rename => self.rename().await?,
                Command::Chat(text) => self.chat(&timestamp, &text).await?,
            }
        }
    }

    /// Record a chat line in the transcript and broadcast it
    ///
    /// Both happen under the transcript lock, so a concurrent admission
    /// sees the line either in its history or live, never both.
    async fn chat(&mut self, timestamp: &str, text: &str) -> Result<(), AppError> {
        let line = message::chat_line(timestamp, &self.name, text);
        let transcript = self.ctx.transcript.lock().await;

        if let Err(e) = transcript.append(&line).await {
            error!("Failed to log message from {}: {}", self.id, e);
        }
        self.ctx
            .broadcaster
            .broadcast(self.id, &format!("\n{}", line))
            .await?;
        Ok(())
    }

    /// Rename sub-protocol: same retry loop as naming
    async fn rename(&mut self) -> Result<(), AppError> {
        loop {
            let name = self.ask_name().await?;
            match self.ctx.server.rename(self.id, &name).await {
                Ok(old) => {
                    self.name = name;
                    self.ctx
                        .broadcaster
                        .broadcast(self.id, &message::renamed(&old, &self.name))
                        .await?;
                    return Ok(());
                }
                Err(e) if e.is_name_error() => self.send(message::name_rejected(&e)).await?,
                Err(e) => return Err(e),
            }
        }
    }

    /// Teardown, safe to call more than once
    async fn close(&mut self) {
        self.transition(SessionState::Closing);

        if std::mem::take(&mut self.announced) {
            if let Err(e) = self
                .ctx
                .broadcaster
                .broadcast(self.id, &message::left(&self.name))
                .await
            {
                warn!("Leave notice for {} failed: {}", self.id, e);
            }
        }

        if std::mem::take(&mut self.admitted) {
            if let Err(e) = self.ctx.server.remove(self.id).await {
                warn!("Failed to remove {}: {}", self.id, e);
            }
        }
    }

    async fn send(&self, text: impl Into<String>) -> Result<(), AppError> {
        self.outbound.send(text).await?;
        Ok(())
    }

    /// One line from the peer; EOF is a disconnect
    ///
    /// At most `max_line_bytes` are read, the rest of a longer line comes
    /// back on the next call. Invalid UTF-8 is replaced, not rejected.
    async fn read_line(&mut self) -> Result<String, AppError> {
        let limit = self.ctx.config.max_line_bytes as u64;
        let mut buf = Vec::new();
        let bytes = (&mut self.reader)
            .take(limit)
            .read_until(b'\n', &mut buf)
            .await?;
        if bytes == 0 {
            return Err(AppError::Disconnected);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session {}: {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }
}
