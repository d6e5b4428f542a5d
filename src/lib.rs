//! # MQTT over GPRS for Embedded Systems
//!
//! `gprs-mqtt` publishes MQTT 3.1 messages through a SIM808-class cellular
//! modem that is driven with AT commands over a serial line. It is `no_std`,
//! allocation free and async, built on the [Embassy](https://embassy.dev/)
//! ecosystem.
//!
//! ## Layers
//!
//! - [`channel`]: line-oriented access to the serial port, with read timeouts.
//! - [`command`]: one AT command, one validated reply.
//! - [`modem`]: the bearer/socket state machine that keeps a TCP socket open and
//!   reopens it when the modem reports it closed.
//! - [`packet`] and [`util`]: the MQTT 3.1 (`MQIsdp`) packet encoder.
//! - [`session`]: connect, publish, ping and disconnect on top of the modem.
//! - [`outbox`]: a channel other tasks use to queue publishes for the session.
//!
//! ```ignore
//! let channel = UartChannel::new(uart, Duration::from_secs(2));
//! let config = ModemConfig::new(Apn::new("internet", "", ""));
//! let modem = Modem::new(channel, embassy_time::Delay, config);
//!
//! let mut session = Session::<_, _, 256>::new(modem, MqttOptions::new("tracker-01"));
//! session.open(Endpoint::new("broker.example", 1883)).await?;
//! session.connect().await?;
//! session.publish_next("tracker/position", b"-23.55,-46.63", QoS::AtLeastOnce, false).await?;
//! session.disconnect().await;
//! ```
//!
//! Every operation runs to completion before the next one starts. When several
//! tasks need the session, share it behind an `embassy_sync::mutex::Mutex` and
//! let producers go through the [`outbox`].

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod channel;
pub mod command;
pub mod config;
pub mod error;
pub mod modem;
pub mod outbox;
pub mod packet;
pub mod session;
pub mod util;

#[cfg(test)]
mod testing;

// Re-export key types for easier access at the crate root.
pub use channel::{ByteChannel, UartChannel};
pub use config::{Apn, ModemConfig, MqttOptions};
pub use error::{BearerError, ChannelError, EncodeError, SessionError, TransportError};
pub use modem::{BearerState, Endpoint, Modem, SocketStatus};
pub use outbox::{PublishRequest, PublisherHandle};
pub use packet::QoS;
pub use session::Session;
