//! Framed channel state machine.
//!
//! A [`Channel`] is a pure state machine in the action pattern: the driver
//! feeds it socket events (`on_connected`, `on_data`, `on_bytes_written`)
//! and application requests (`read_message`, `write_message`, `stop`), and
//! every call returns the ordered [`ChannelAction`]s to execute. The
//! machine holds no I/O handles, which keeps the pacing, framing, and
//! lifecycle rules testable without sockets.
//!
//! # Lifecycle
//!
//! ```text
//! ┌──────────────┐ on_connected ┌───────────┐ handshake done ┌───────────┐
//! │ NotConnected │─────────────>│ Connected │───────────────>│ Encrypted │
//! └──────────────┘              └───────────┘                └───────────┘
//!        ^  stop / any fatal error from either state  │
//!        └─────────────────────────────────────────────┘
//! ```
//!
//! While `Connected`, the only traffic is plaintext handshake records with
//! the reserved id; the machine drives its [`Encryptor`] from them. Once
//! `Encrypted`, every outgoing message is sealed before framing and every
//! incoming one opened after reassembly.
//!
//! # Ordering contracts
//!
//! - Writes drain in strict FIFO order; the socket never sees bytes of two
//!   messages interleaved, and `Written(id)` fires in submission order.
//! - The socket is fed in chunks of at most 1400 payload bytes (the head
//!   chunk also carries the length prefix); the next chunk is emitted only
//!   once the previous one is fully acknowledged.
//! - Reads are single-shot: one `read_message` arm produces exactly one
//!   `Deliver`, after which the caller must re-arm.

use std::collections::VecDeque;

use bytes::{Buf, BytesMut};
use tracing::{debug, warn};

use farview_crypto::SessionCipher;
use farview_proto::{FrameError, LengthDecoder, MAX_MESSAGE_SIZE, encode_length};

use crate::error::ChannelError;
use crate::handshake::{Encryptor, Role};

/// Reserved message id for plaintext handshake frames.
pub const HANDSHAKE_MESSAGE_ID: i64 = -1;

/// Upper bound on a single socket submission (one typical MTU payload).
const WRITE_CHUNK_SIZE: usize = 1400;

/// Initial receive buffer reservation.
const READ_BUFFER_RESERVE: usize = 128 * 1024;

/// Channel lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No socket, or terminally stopped.
    NotConnected,
    /// Socket up, handshake in progress, traffic is plaintext records.
    Connected,
    /// Session cipher installed; application traffic flows.
    Encrypted,
}

/// Ordered instructions for the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelAction {
    /// Submit these bytes to the socket and report back with
    /// `on_bytes_written`.
    Transmit(Vec<u8>),

    /// A complete message for the application (the armed read completing).
    Deliver(Vec<u8>),

    /// The message with this id has fully drained to the socket.
    Written(i64),

    /// Handshake complete; the channel is now encrypted.
    Established,

    /// Terminal failure. The machine has already stopped; the driver
    /// should tear down the socket and surface the error.
    Close(ChannelError),
}

struct PendingWrite {
    id: i64,
    /// Length prefix followed by the (sealed) message bytes.
    bytes: Vec<u8>,
    prefix_len: usize,
}

/// Framed, ordered, encrypted message channel over a reliable stream.
pub struct Channel {
    role: Role,
    state: ChannelState,
    encryptor: Option<Encryptor>,
    cipher: Option<SessionCipher>,

    write_queue: VecDeque<PendingWrite>,
    /// Bytes of the head entry handed to the driver so far.
    submitted: usize,
    /// Bytes of the head entry the driver has acknowledged.
    acked: usize,

    rx: BytesMut,
    length_decoder: LengthDecoder,
    pending_len: Option<usize>,
    read_armed: bool,
}

impl Channel {
    /// New channel in `NotConnected` state, owning its handshake driver.
    pub fn new(role: Role, encryptor: Encryptor) -> Self {
        Self {
            role,
            state: ChannelState::NotConnected,
            encryptor: Some(encryptor),
            cipher: None,
            write_queue: VecDeque::new(),
            submitted: 0,
            acked: 0,
            rx: BytesMut::with_capacity(READ_BUFFER_RESERVE),
            length_decoder: LengthDecoder::new(),
            pending_len: None,
            read_armed: false,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Which side of the handshake this channel runs.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The socket is up: enter `Connected` and start the handshake.
    ///
    /// The initiator speaks first; the responder arms a read for the
    /// opening record. A channel that has been stopped stays stopped.
    pub fn on_connected(&mut self) -> Vec<ChannelAction> {
        let mut actions = Vec::new();

        if self.state != ChannelState::NotConnected || self.encryptor.is_none() {
            return actions;
        }

        self.state = ChannelState::Connected;
        debug!(role = ?self.role, "channel connected, starting handshake");

        match self.role {
            Role::Responder => {
                self.read_armed = true;
                self.process_rx(&mut actions);
            }
            Role::Initiator => {
                let opening = match self.encryptor.as_mut().map(Encryptor::start) {
                    Some(Ok(opening)) => opening,
                    Some(Err(error)) => return self.close(error),
                    None => None,
                };

                if let Some(hello) = opening
                    && let Err(error) = self.enqueue_frame(HANDSHAKE_MESSAGE_ID, hello, &mut actions)
                {
                    return self.close(error);
                }
            }
        }

        actions
    }

    /// Arm receipt of exactly one message.
    ///
    /// No-op (with a warning) when a read is already armed or the channel
    /// is stopped.
    pub fn read_message(&mut self) -> Vec<ChannelAction> {
        let mut actions = Vec::new();

        if self.state == ChannelState::NotConnected {
            return actions;
        }

        if self.read_armed {
            warn!("read_message while a read is already armed");
            return actions;
        }

        self.read_armed = true;
        self.process_rx(&mut actions);
        actions
    }

    /// Seal and enqueue one application message.
    ///
    /// Only valid once `Encrypted`; earlier calls are dropped with a
    /// warning. `id` is echoed back in the `Written` action; the reserved
    /// handshake id is for internal use.
    pub fn write_message(&mut self, id: i64, payload: &[u8]) -> Vec<ChannelAction> {
        let mut actions = Vec::new();

        if self.state != ChannelState::Encrypted {
            warn!(id, "write_message on a channel that is not established");
            return actions;
        }

        let Some(cipher) = self.cipher.as_mut() else {
            return self.close(ChannelError::Crypto(farview_crypto::CryptoError::AeadFailure));
        };

        match cipher.encrypt(payload) {
            Ok(sealed) => {
                if let Err(error) = self.enqueue_frame(id, sealed, &mut actions) {
                    return self.close(error);
                }
            }
            Err(error) => return self.close(error.into()),
        }

        actions
    }

    /// The driver finished writing `written` bytes of the current chunk.
    pub fn on_bytes_written(&mut self, written: usize) -> Vec<ChannelAction> {
        let mut actions = Vec::new();

        if self.state == ChannelState::NotConnected {
            return actions;
        }

        self.acked += written;

        let Some(head) = self.write_queue.front() else {
            return actions;
        };

        if self.acked < self.submitted {
            // The current chunk is only partially acknowledged.
            return actions;
        }

        if self.acked < head.bytes.len() {
            self.submit_chunk(&mut actions);
            return actions;
        }

        let Some(head) = self.write_queue.pop_front() else {
            return actions;
        };
        self.submitted = 0;
        self.acked = 0;

        self.on_message_written(head.id, &mut actions);

        if self.state != ChannelState::NotConnected && !self.write_queue.is_empty() {
            self.submit_chunk(&mut actions);
        }

        actions
    }

    /// Bytes arrived from the socket.
    ///
    /// They are buffered unconditionally; parsing and delivery only happen
    /// while a read is armed.
    pub fn on_data(&mut self, data: &[u8]) -> Vec<ChannelAction> {
        let mut actions = Vec::new();

        if self.state == ChannelState::NotConnected {
            return actions;
        }

        self.rx.extend_from_slice(data);
        self.process_rx(&mut actions);
        actions
    }

    /// The socket failed; close with a transport error.
    pub fn on_transport_error(&mut self, message: impl Into<String>) -> Vec<ChannelAction> {
        if self.state == ChannelState::NotConnected {
            return Vec::new();
        }

        self.close(ChannelError::Transport(message.into()))
    }

    /// Stop the channel: drop queued writes without completion callbacks,
    /// discard buffered reads, return to `NotConnected`. Idempotent; every
    /// later event is a no-op.
    pub fn stop(&mut self) {
        self.state = ChannelState::NotConnected;
        self.write_queue.clear();
        self.submitted = 0;
        self.acked = 0;
        self.rx.clear();
        self.length_decoder.reset();
        self.pending_len = None;
        self.read_armed = false;
        self.encryptor = None;
        self.cipher = None;
    }

    fn close(&mut self, error: ChannelError) -> Vec<ChannelAction> {
        warn!(%error, "channel closed");
        self.stop();
        vec![ChannelAction::Close(error)]
    }

    /// Frame `message` behind its length prefix and queue it; schedules
    /// the first chunk when the queue was idle.
    fn enqueue_frame(
        &mut self,
        id: i64,
        message: Vec<u8>,
        actions: &mut Vec<ChannelAction>,
    ) -> Result<(), ChannelError> {
        if message.is_empty() {
            return Err(FrameError::ZeroLength.into());
        }

        if message.len() > MAX_MESSAGE_SIZE {
            return Err(FrameError::TooLarge { size: message.len(), max: MAX_MESSAGE_SIZE }.into());
        }

        let prefix = encode_length(message.len())?;

        let mut bytes = Vec::with_capacity(prefix.len() + message.len());
        bytes.extend_from_slice(prefix.as_slice());
        bytes.extend_from_slice(&message);

        let idle = self.write_queue.is_empty();
        self.write_queue.push_back(PendingWrite { id, bytes, prefix_len: prefix.len() });

        if idle {
            self.submit_chunk(actions);
        }

        Ok(())
    }

    /// Hand the driver the next chunk of the head message. The first chunk
    /// carries the prefix plus up to one MTU of payload; later chunks are
    /// pure payload.
    fn submit_chunk(&mut self, actions: &mut Vec<ChannelAction>) {
        let Some(head) = self.write_queue.front() else {
            return;
        };

        let end = if self.submitted == 0 {
            (head.prefix_len + WRITE_CHUNK_SIZE).min(head.bytes.len())
        } else {
            (self.submitted + WRITE_CHUNK_SIZE).min(head.bytes.len())
        };

        actions.push(ChannelAction::Transmit(head.bytes[self.submitted..end].to_vec()));
        self.submitted = end;
    }

    /// The head message has fully drained.
    fn on_message_written(&mut self, id: i64, actions: &mut Vec<ChannelAction>) {
        match self.state {
            ChannelState::Encrypted => actions.push(ChannelAction::Written(id)),

            // While connected, the only in-flight frames are handshake
            // records. A drained record either completes the handshake or
            // means we now wait for the peer's next record.
            ChannelState::Connected => {
                if self.encryptor.as_ref().is_some_and(Encryptor::is_ready) {
                    self.install_cipher(actions);
                } else {
                    self.read_armed = true;
                    self.process_rx(actions);
                }
            }

            ChannelState::NotConnected => {}
        }
    }

    fn install_cipher(&mut self, actions: &mut Vec<ChannelAction>) {
        let Some(encryptor) = self.encryptor.take() else {
            return;
        };

        match encryptor.session_cipher() {
            Ok(cipher) => {
                self.cipher = Some(cipher);
                self.state = ChannelState::Encrypted;
                debug!(role = ?self.role, "session established");
                actions.push(ChannelAction::Established);
            }
            Err(error) => {
                let closed = self.close(error);
                actions.extend(closed);
            }
        }
    }

    /// Drain the receive buffer: decode the prefix byte at a time, then
    /// wait for the full payload, then dispatch exactly one message (the
    /// arm clears on delivery).
    fn process_rx(&mut self, actions: &mut Vec<ChannelAction>) {
        while self.read_armed && self.state != ChannelState::NotConnected {
            if self.pending_len.is_none() {
                while !self.rx.is_empty() {
                    let byte = self.rx[0];
                    self.rx.advance(1);

                    match self.length_decoder.push(byte) {
                        Ok(None) => {}
                        Ok(Some(len)) => {
                            self.pending_len = Some(len);
                            break;
                        }
                        Err(error) => {
                            let closed = self.close(error.into());
                            actions.extend(closed);
                            return;
                        }
                    }
                }
            }

            let Some(len) = self.pending_len else {
                return;
            };

            if self.rx.len() < len {
                return;
            }

            let message = self.rx.split_to(len).to_vec();
            self.pending_len = None;
            self.read_armed = false;

            self.dispatch_message(&message, actions);
        }
    }

    fn dispatch_message(&mut self, message: &[u8], actions: &mut Vec<ChannelAction>) {
        match self.state {
            ChannelState::Encrypted => {
                let Some(cipher) = self.cipher.as_mut() else {
                    let closed =
                        self.close(ChannelError::Crypto(farview_crypto::CryptoError::AeadFailure));
                    actions.extend(closed);
                    return;
                };

                match cipher.decrypt(message) {
                    Ok(plain) => actions.push(ChannelAction::Deliver(plain)),
                    Err(error) => {
                        let closed = self.close(error.into());
                        actions.extend(closed);
                    }
                }
            }

            ChannelState::Connected => {
                let Some(encryptor) = self.encryptor.as_mut() else {
                    let closed = self.close(ChannelError::UnexpectedHandshake);
                    actions.extend(closed);
                    return;
                };

                match encryptor.read_hello(message) {
                    Ok(Some(reply)) => {
                        if let Err(error) =
                            self.enqueue_frame(HANDSHAKE_MESSAGE_ID, reply, actions)
                        {
                            let closed = self.close(error);
                            actions.extend(closed);
                        }
                    }
                    Ok(None) => {
                        if self.encryptor.as_ref().is_some_and(Encryptor::is_ready) {
                            self.install_cipher(actions);
                        } else {
                            self.read_armed = true;
                        }
                    }
                    Err(error) => {
                        let closed = self.close(error);
                        actions.extend(closed);
                    }
                }
            }

            ChannelState::NotConnected => {}
        }
    }
}
