//! # Error Types
//!
//! Errors are layered the same way the crate is: the command channel, the
//! bearer/socket state machine, the transport (send path), the packet codec and
//! the MQTT session. Each layer wraps the one below it through `From`, so the
//! `?` operator carries a failure up to the caller unchanged.
//!
//! Every layer is generic over `E`, the error type of the underlying
//! [`ByteChannel`](crate::channel::ByteChannel).

use crate::modem::SocketStatus;

/// Failures of a single command/response exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelError<E> {
    /// The modem produced no line before the read timeout elapsed.
    Timeout,
    /// A reply line did not match the expected token.
    Mismatch,
    /// A reply line did not fit into the line buffer.
    Overflow,
    /// The underlying byte channel failed.
    Io(E),
}

/// The initialization step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStep {
    SimReady,
    SignalQuality,
    NetworkRegistration,
    PacketAttach,
}

/// The bearer bring-up step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BringUpStep {
    SingleConnection,
    NonTransparentMode,
    StartTask,
    ActivateBearer,
    LocalAddress,
}

/// Failures of the bearer/socket state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BearerError<E> {
    /// Modem initialization stopped at the given step.
    InitFailed(InitStep),
    /// Bearer bring-up stopped at the given step.
    BringUpFailed(BringUpStep),
    /// The modem reported a socket status the state machine does not act on.
    UnrecognizedState(SocketStatus),
    /// The socket did not reach `CONNECT OK` within the status poll budget.
    OpenTimeout,
    /// A status query or socket command failed at the channel level.
    Channel(ChannelError<E>),
}

impl<E> From<ChannelError<E>> for BearerError<E> {
    fn from(err: ChannelError<E>) -> Self {
        BearerError::Channel(err)
    }
}

/// Failures of the socket send path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError<E> {
    /// The modem never offered the `> ` data prompt.
    PromptTimeout,
    /// The modem reported `SEND FAIL`/`ERROR`, or never confirmed the send.
    SendFailed,
    /// The payload exceeds what the modem accepts in a single send.
    PayloadTooLarge,
    /// The socket is closed and no endpoint is stored to reopen it.
    NoEndpoint,
    /// Reopening the socket failed.
    Bearer(BearerError<E>),
    /// The send exchange failed at the channel level.
    Channel(ChannelError<E>),
}

impl<E> From<BearerError<E>> for TransportError<E> {
    fn from(err: BearerError<E>) -> Self {
        TransportError::Bearer(err)
    }
}

impl<E> From<ChannelError<E>> for TransportError<E> {
    fn from(err: ChannelError<E>) -> Self {
        TransportError::Channel(err)
    }
}

/// Failures while encoding or decoding packet fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// A string exceeds 65535 bytes or a length exceeds the remaining-length range.
    TooLong,
    /// The output buffer cannot hold the encoded packet.
    BufferTooSmall,
    /// A remaining-length field is truncated or longer than four bytes.
    Malformed,
}

/// Return codes of a `CONNACK` packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectReturnCode {
    /// The connection was accepted.
    Accepted,
    /// The broker does not support the requested protocol version.
    UnacceptableProtocolVersion,
    /// The client identifier is not valid.
    IdentifierRejected,
    /// The broker is unavailable.
    ServerUnavailable,
    /// The username or password is not valid.
    BadUserNameOrPassword,
    /// The client is not authorized to connect.
    NotAuthorized,
    /// A code outside the 3.1 range.
    Other(u8),
}

impl From<u8> for ConnectReturnCode {
    fn from(val: u8) -> Self {
        match val {
            0 => Self::Accepted,
            1 => Self::UnacceptableProtocolVersion,
            2 => Self::IdentifierRejected,
            3 => Self::ServerUnavailable,
            4 => Self::BadUserNameOrPassword,
            5 => Self::NotAuthorized,
            _ => Self::Other(val),
        }
    }
}

/// Failures of MQTT session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError<E> {
    /// The broker did not confirm the operation with the expected acknowledgment.
    NotAcknowledged,
    /// The broker answered `CONNACK` with a non-zero return code.
    ConnectionRefused(ConnectReturnCode),
    /// The operation needs an accepted `CONNECT` first.
    NotConnected,
    /// QoS 2 flows are not implemented.
    UnsupportedQos,
    /// The packet could not be encoded.
    Encode(EncodeError),
    /// The packet could not be delivered to the broker.
    Transport(TransportError<E>),
}

impl<E> From<EncodeError> for SessionError<E> {
    fn from(err: EncodeError) -> Self {
        SessionError::Encode(err)
    }
}

impl<E> From<TransportError<E>> for SessionError<E> {
    fn from(err: TransportError<E>) -> Self {
        SessionError::Transport(err)
    }
}

impl<E> From<BearerError<E>> for SessionError<E> {
    fn from(err: BearerError<E>) -> Self {
        SessionError::Transport(TransportError::Bearer(err))
    }
}
