//! TCP driver for the channel state machine.
//!
//! One task owns the socket and the [`Channel`] together, which preserves
//! the single-thread-per-channel model: every machine event and every
//! completion callback runs on that task. The handle only moves messages
//! over bounded mpsc channels.
//!
//! The driver arms the machine's single-shot read itself — once when the
//! session establishes and again after each delivery — so the handle sees
//! a plain stream of events. Backpressure comes from the bounded event
//! channel: when the receiver lags, the driver stops re-arming.

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::channel::{Channel, ChannelAction};
use crate::error::ChannelError;
use crate::handshake::{Encryptor, Role};

/// Events surfaced to the channel owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Handshake finished; application traffic may flow.
    Established,
    /// One received message, already decrypted.
    Message(Vec<u8>),
    /// The message with this id has fully drained to the socket.
    Written(i64),
    /// Terminal failure or peer disconnect; the task has exited.
    Closed(String),
}

enum Command {
    Write { id: i64, payload: Vec<u8> },
    Stop,
}

/// Handle to a running channel task.
pub struct ChannelHandle {
    commands: mpsc::Sender<Command>,
    /// Ordered channel events; ends with [`ChannelEvent::Closed`].
    pub events: mpsc::Receiver<ChannelEvent>,
}

impl ChannelHandle {
    /// Enqueue one message for encrypted transmission.
    ///
    /// # Errors
    ///
    /// - `ChannelError::Transport` when the channel task has exited
    pub async fn write(&self, id: i64, payload: Vec<u8>) -> Result<(), ChannelError> {
        self.commands
            .send(Command::Write { id, payload })
            .await
            .map_err(|_| ChannelError::Transport("channel task exited".to_string()))
    }

    /// Stop the channel; the task aborts the socket and exits.
    pub async fn stop(&self) {
        // An already-exited task is fine; stop is idempotent.
        let _ = self.commands.send(Command::Stop).await;
    }
}

/// Connect to a responder and run the initiator side.
///
/// # Errors
///
/// - `ChannelError::Transport` when the TCP connect fails
pub async fn connect(
    address: &str,
    port: u16,
    encryptor: Encryptor,
) -> Result<ChannelHandle, ChannelError> {
    let stream = TcpStream::connect((address, port))
        .await
        .map_err(|e| ChannelError::Transport(e.to_string()))?;

    spawn_channel(stream, Role::Initiator, encryptor)
}

/// Run the responder side over an already-accepted socket.
///
/// # Errors
///
/// - `ChannelError::Transport` when socket options cannot be applied
pub fn accept(stream: TcpStream, encryptor: Encryptor) -> Result<ChannelHandle, ChannelError> {
    spawn_channel(stream, Role::Responder, encryptor)
}

fn spawn_channel(
    stream: TcpStream,
    role: Role,
    encryptor: Encryptor,
) -> Result<ChannelHandle, ChannelError> {
    stream.set_nodelay(true).map_err(|e| ChannelError::Transport(e.to_string()))?;

    let (command_tx, command_rx) = mpsc::channel(32);
    let (event_tx, event_rx) = mpsc::channel(32);

    tokio::spawn(run_channel(stream, role, encryptor, command_rx, event_tx));

    Ok(ChannelHandle { commands: command_tx, events: event_rx })
}

async fn run_channel(
    mut stream: TcpStream,
    role: Role,
    encryptor: Encryptor,
    mut commands: mpsc::Receiver<Command>,
    events: mpsc::Sender<ChannelEvent>,
) {
    let mut channel = Channel::new(role, encryptor);
    let mut buf = BytesMut::with_capacity(64 * 1024);

    let actions = channel.on_connected();
    if execute(&mut channel, &mut stream, &events, actions).await.is_break() {
        return;
    }

    loop {
        let actions = tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Write { id, payload }) => channel.write_message(id, &payload),
                Some(Command::Stop) | None => {
                    debug!("channel stopped by owner");
                    channel.stop();
                    return;
                }
            },

            read = stream.read_buf(&mut buf) => match read {
                Ok(0) => channel.on_transport_error("peer disconnected"),
                Ok(_) => {
                    let actions = channel.on_data(&buf);
                    buf.clear();
                    actions
                }
                Err(error) => channel.on_transport_error(error.to_string()),
            },
        };

        if execute(&mut channel, &mut stream, &events, actions).await.is_break() {
            return;
        }
    }
}

/// Execute a batch of machine actions, feeding write acknowledgements back
/// in as they happen. Returns `Break` when the channel is finished.
async fn execute(
    channel: &mut Channel,
    stream: &mut TcpStream,
    events: &mpsc::Sender<ChannelEvent>,
    actions: Vec<ChannelAction>,
) -> std::ops::ControlFlow<()> {
    use std::collections::VecDeque;
    use std::ops::ControlFlow;

    let mut queue: VecDeque<ChannelAction> = actions.into();

    while let Some(action) = queue.pop_front() {
        match action {
            ChannelAction::Transmit(bytes) => {
                if let Err(error) = stream.write_all(&bytes).await {
                    queue.extend(channel.on_transport_error(error.to_string()));
                    continue;
                }
                queue.extend(channel.on_bytes_written(bytes.len()));
            }

            ChannelAction::Deliver(message) => {
                if events.send(ChannelEvent::Message(message)).await.is_err() {
                    warn!("event receiver dropped, stopping channel");
                    channel.stop();
                    return ControlFlow::Break(());
                }
                // Single-shot read: re-arm for the next message.
                queue.extend(channel.read_message());
            }

            ChannelAction::Written(id) => {
                if events.send(ChannelEvent::Written(id)).await.is_err() {
                    channel.stop();
                    return ControlFlow::Break(());
                }
            }

            ChannelAction::Established => {
                if events.send(ChannelEvent::Established).await.is_err() {
                    channel.stop();
                    return ControlFlow::Break(());
                }
                queue.extend(channel.read_message());
            }

            ChannelAction::Close(error) => {
                let _ = events.send(ChannelEvent::Closed(error.to_string())).await;
                return ControlFlow::Break(());
            }
        }
    }

    ControlFlow::Continue(())
}
