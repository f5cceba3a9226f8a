//! Handshake step machine.
//!
//! Wraps the per-role SRP contexts from `farview-crypto` behind one
//! interface the channel can drive without caring which side it is on:
//! [`Encryptor::start`] yields the opening message (initiator only), and
//! every received handshake record goes through [`Encryptor::read_hello`],
//! which returns the next record to send, if any. When
//! [`Encryptor::is_ready`] reports true and nothing remains to be written,
//! the channel takes the session cipher and switches to encrypted traffic.
//!
//! ```text
//! initiator                               responder
//! start() -> Identify ──────────────────> read_hello -> ServerKeyExchange
//! read_hello -> ClientKeyExchange ──────> read_hello -> (ready)
//! (ready once the reply drains)
//! ```

use rand::RngCore;
use rand::rngs::OsRng;

use farview_crypto::{
    EncryptionMethod, SessionCipher, SrpClientContext, SrpServerContext, VerifierStore,
};
use farview_proto::{SrpClientKeyExchange, SrpIdentify, SrpServerKeyExchange};

use crate::error::ChannelError;

/// Which half of the handshake this endpoint runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Connecting side; knows the username and password.
    Initiator,
    /// Accepting side; holds verifiers.
    Responder,
}

enum InitiatorStep {
    AwaitingServerKeyExchange,
    Ready,
}

struct InitiatorFlow {
    context: SrpClientContext,
    step: InitiatorStep,
}

enum ResponderStep {
    AwaitingIdentify,
    AwaitingClientKeyExchange,
    Ready,
}

struct ResponderFlow {
    method: EncryptionMethod,
    store: Box<dyn VerifierStore + Send>,
    context: Option<SrpServerContext>,
    step: ResponderStep,
}

enum Flow {
    Initiator(InitiatorFlow),
    Responder(ResponderFlow),
}

/// Role-aware handshake driver owned by a channel while it is in the
/// plaintext phase.
pub struct Encryptor {
    flow: Flow,
    rng: Box<dyn RngCore + Send>,
}

impl Encryptor {
    /// Initiator-side handshake for the given identity.
    ///
    /// # Errors
    ///
    /// - `HandshakeError::EmptyCredentials` via the SRP context
    pub fn initiator(
        method: EncryptionMethod,
        username: &str,
        password: &str,
    ) -> Result<Self, ChannelError> {
        Self::initiator_with_rng(method, username, password, Box::new(OsRng))
    }

    /// Initiator-side handshake with an injected random source.
    ///
    /// # Errors
    ///
    /// - `HandshakeError::EmptyCredentials` via the SRP context
    pub fn initiator_with_rng(
        method: EncryptionMethod,
        username: &str,
        password: &str,
        rng: Box<dyn RngCore + Send>,
    ) -> Result<Self, ChannelError> {
        let context = SrpClientContext::new(method, username, password)?;

        Ok(Self {
            flow: Flow::Initiator(InitiatorFlow {
                context,
                step: InitiatorStep::AwaitingServerKeyExchange,
            }),
            rng,
        })
    }

    /// Responder-side handshake backed by a verifier store.
    pub fn responder(method: EncryptionMethod, store: Box<dyn VerifierStore + Send>) -> Self {
        Self::responder_with_rng(method, store, Box::new(OsRng))
    }

    /// Responder-side handshake with an injected random source.
    pub fn responder_with_rng(
        method: EncryptionMethod,
        store: Box<dyn VerifierStore + Send>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            flow: Flow::Responder(ResponderFlow {
                method,
                store,
                context: None,
                step: ResponderStep::AwaitingIdentify,
            }),
            rng,
        }
    }

    /// The opening message, if this side speaks first.
    ///
    /// # Errors
    ///
    /// - `FrameError::Codec` if the record fails to serialize
    pub fn start(&mut self) -> Result<Option<Vec<u8>>, ChannelError> {
        match &self.flow {
            Flow::Initiator(flow) => {
                let identify = SrpIdentify { username: flow.context.username().to_string() };
                Ok(Some(identify.encode().map_err(ChannelError::Frame)?))
            }
            Flow::Responder(_) => Ok(None),
        }
    }

    /// Feed one received handshake record; returns the reply to send, if
    /// any.
    ///
    /// # Errors
    ///
    /// Any parse failure, validation failure, or out-of-order record is
    /// fatal for the channel.
    pub fn read_hello(&mut self, bytes: &[u8]) -> Result<Option<Vec<u8>>, ChannelError> {
        match &mut self.flow {
            Flow::Initiator(flow) => match flow.step {
                InitiatorStep::AwaitingServerKeyExchange => {
                    let ske = SrpServerKeyExchange::decode(bytes).map_err(ChannelError::Frame)?;

                    let reply = flow.context.read_server_key_exchange(
                        &ske.number,
                        &ske.generator,
                        &ske.salt,
                        &ske.b,
                        &ske.iv,
                        self.rng.as_mut(),
                    )?;

                    let cke = SrpClientKeyExchange { a: reply.a, iv: reply.iv.to_vec() };
                    flow.step = InitiatorStep::Ready;

                    Ok(Some(cke.encode().map_err(ChannelError::Frame)?))
                }
                InitiatorStep::Ready => Err(ChannelError::UnexpectedHandshake),
            },

            Flow::Responder(flow) => match flow.step {
                ResponderStep::AwaitingIdentify => {
                    let identify = SrpIdentify::decode(bytes).map_err(ChannelError::Frame)?;

                    let entry = flow
                        .store
                        .find(&identify.username)
                        .ok_or(farview_crypto::HandshakeError::UnknownUser)?;

                    let context = SrpServerContext::new(flow.method, entry, self.rng.as_mut());
                    let exchange = context.server_key_exchange();

                    let ske = SrpServerKeyExchange {
                        number: exchange.number,
                        generator: exchange.generator,
                        salt: exchange.salt,
                        b: exchange.b,
                        iv: exchange.iv.to_vec(),
                    };

                    flow.context = Some(context);
                    flow.step = ResponderStep::AwaitingClientKeyExchange;

                    Ok(Some(ske.encode().map_err(ChannelError::Frame)?))
                }
                ResponderStep::AwaitingClientKeyExchange => {
                    let cke = SrpClientKeyExchange::decode(bytes).map_err(ChannelError::Frame)?;

                    let context = flow
                        .context
                        .as_mut()
                        .ok_or(farview_crypto::HandshakeError::ExchangeIncomplete)?;
                    context.read_client_key_exchange(&cke.a, &cke.iv)?;

                    flow.step = ResponderStep::Ready;
                    Ok(None)
                }
                ResponderStep::Ready => Err(ChannelError::UnexpectedHandshake),
            },
        }
    }

    /// True once this side has everything it needs to derive the session
    /// key.
    pub fn is_ready(&self) -> bool {
        match &self.flow {
            Flow::Initiator(flow) => matches!(flow.step, InitiatorStep::Ready),
            Flow::Responder(flow) => matches!(flow.step, ResponderStep::Ready),
        }
    }

    /// Derive the session key and build the per-direction AEAD state.
    ///
    /// # Errors
    ///
    /// - `HandshakeError::ExchangeIncomplete` before the exchange finished
    /// - `HandshakeError::InvalidPublicValue` for a degenerate peer value
    pub fn session_cipher(&self) -> Result<SessionCipher, ChannelError> {
        let cipher = match &self.flow {
            Flow::Initiator(flow) => flow.context.session_cipher()?,
            Flow::Responder(flow) => flow
                .context
                .as_ref()
                .ok_or(farview_crypto::HandshakeError::ExchangeIncomplete)?
                .session_cipher()?,
        };

        Ok(cipher)
    }
}
