//! # MQTT Session
//!
//! [`Session`] couples the packet encoder with the [`Modem`]: each operation
//! encodes one packet into the session buffer, hands it to
//! [`Modem::send`], and validates the reply the broker sent back through the
//! socket. Recovery from a dropped socket happens inside the modem; the session
//! itself never retries.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::channel::ByteChannel;
use crate::command::Line;
use crate::config::MqttOptions;
use crate::error::{ConnectReturnCode, SessionError};
use crate::modem::{Endpoint, Modem};
use crate::outbox::OutboxReceiver;
use crate::packet::{Ack, EncodePacket, MqttPacket, Publish, QoS, connack_return_code};

/// An MQTT 3.1 session carried over the modem's TCP socket.
///
/// `BUF` bounds the size of a single encoded packet.
pub struct Session<'a, C, D, const BUF: usize = 256> {
    modem: Modem<'a, C, D>,
    options: MqttOptions<'a>,
    connected: bool,
    next_packet_id: u16,
    buf: [u8; BUF],
}

impl<'a, C, D, const BUF: usize> Session<'a, C, D, BUF>
where
    C: ByteChannel,
    D: DelayNs,
{
    pub fn new(modem: Modem<'a, C, D>, options: MqttOptions<'a>) -> Self {
        Self {
            modem,
            options,
            connected: false,
            next_packet_id: 1,
            buf: [0; BUF],
        }
    }

    /// Whether the broker accepted the last `CONNECT` and the session has not
    /// been closed since.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn options(&self) -> &MqttOptions<'a> {
        &self.options
    }

    pub fn modem(&self) -> &Modem<'a, C, D> {
        &self.modem
    }

    pub fn modem_mut(&mut self) -> &mut Modem<'a, C, D> {
        &mut self.modem
    }

    /// Brings the bearer up from scratch and opens the socket to `endpoint`.
    pub async fn open(&mut self, endpoint: Endpoint<'a>) -> Result<(), SessionError<C::Error>> {
        self.connected = false;
        self.modem.open_bearer().await?;
        self.modem.open(endpoint).await?;
        Ok(())
    }

    /// Sends one packet and returns the broker's reply line.
    ///
    /// A socket the modem had to reopen is a new TCP stream the broker has
    /// never seen a `CONNECT` on, so a connected session ends there.
    async fn send_packet(&mut self, packet: &MqttPacket<'_>) -> Result<Line, SessionError<C::Error>> {
        let len = packet.encode(&mut self.buf)?;
        let reopens = self.modem.reopen_count();
        let result = self.modem.send(&self.buf[..len]).await;

        if self.connected && self.modem.reopen_count() != reopens {
            warn!("socket was reopened, MQTT session lost");
            self.connected = false;
            result?;
            return Err(SessionError::NotConnected);
        }
        Ok(result?)
    }

    /// Sends `CONNECT` built from the session options and validates `CONNACK`.
    ///
    /// Succeeds only when the broker answers with return code 0 (accepted);
    /// [`is_connected`](Self::is_connected) then reports `true`. A well-formed
    /// `CONNACK` with any other code is `ConnectionRefused`.
    pub async fn connect(&mut self) -> Result<(), SessionError<C::Error>> {
        self.connected = false;
        let packet = MqttPacket::Connect(self.options.connect_packet());
        let reply = self.send_packet(&packet).await?;

        if !Ack::ConnAck.matches(&reply) {
            warn!("no CONNACK from broker");
            return Err(SessionError::NotAcknowledged);
        }
        match connack_return_code(&reply) {
            Some(ConnectReturnCode::Accepted) => {
                info!("MQTT session established as {}", self.options.client_id);
                self.connected = true;
                Ok(())
            }
            Some(code) => {
                error!("broker refused connection: {:?}", code);
                Err(SessionError::ConnectionRefused(code))
            }
            None => {
                warn!("truncated CONNACK");
                Err(SessionError::NotAcknowledged)
            }
        }
    }

    /// Publishes `message` to `topic` with every header field given.
    ///
    /// `QoS::AtLeastOnce` succeeds only on a `PUBACK`. `QoS::AtMostOnce`
    /// still reads the reply line but does not validate it. A failed
    /// acknowledgment is an error, never a silent `Ok`.
    pub async fn publish(
        &mut self,
        dup: bool,
        qos: QoS,
        retain: bool,
        packet_id: u16,
        topic: &str,
        message: &[u8],
    ) -> Result<(), SessionError<C::Error>> {
        if !self.connected {
            return Err(SessionError::NotConnected);
        }
        if qos == QoS::ExactlyOnce {
            return Err(SessionError::UnsupportedQos);
        }

        let packet = MqttPacket::Publish(Publish {
            dup,
            qos,
            retain,
            packet_id,
            topic,
            payload: message,
        });
        let reply = self.send_packet(&packet).await?;
        debug!("published {} bytes to {}", message.len(), topic);

        if qos == QoS::AtLeastOnce && !Ack::PubAck.matches(&reply) {
            warn!("no PUBACK for packet {}", packet_id);
            return Err(SessionError::NotAcknowledged);
        }
        Ok(())
    }

    /// Publishes with a freshly allocated packet identifier.
    pub async fn publish_next(
        &mut self,
        topic: &str,
        message: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), SessionError<C::Error>> {
        let packet_id = match qos {
            QoS::AtMostOnce => 0,
            _ => self.allocate_packet_id(),
        };
        self.publish(false, qos, retain, packet_id, topic, message).await
    }

    /// Packet identifiers run from 1 to 65535 and wrap, skipping 0.
    fn allocate_packet_id(&mut self) -> u16 {
        let id = self.next_packet_id;
        self.next_packet_id = id.checked_add(1).unwrap_or(1);
        id
    }

    /// Sends `PINGREQ`; succeeds only on a `PINGRESP` (`0xD0 0x00`).
    pub async fn ping(&mut self) -> Result<(), SessionError<C::Error>> {
        if !self.connected {
            return Err(SessionError::NotConnected);
        }
        let reply = self.send_packet(&MqttPacket::PingReq).await?;
        if Ack::PingResp.matches(&reply) {
            trace!("PINGRESP received");
            Ok(())
        } else {
            warn!("no PINGRESP from broker");
            Err(SessionError::NotAcknowledged)
        }
    }

    /// Sends `DISCONNECT` if connected, then closes the bearer. A failed
    /// `DISCONNECT` is logged and ignored.
    pub async fn disconnect(&mut self) {
        if self.connected && self.send_packet(&MqttPacket::Disconnect).await.is_err() {
            warn!("DISCONNECT not delivered");
        }
        self.close().await;
    }

    /// Deactivates the bearer and marks the session disconnected.
    pub async fn close(&mut self) {
        self.modem.close().await;
        self.connected = false;
        info!("session closed");
    }

    /// Publishes every request currently queued on `receiver`, in arrival
    /// order, and returns how many were sent.
    ///
    /// Stops at the first failure; the failed request is not re-queued.
    pub async fn flush_outbox<M: RawMutex, const DEPTH: usize>(
        &mut self,
        receiver: &OutboxReceiver<'_, '_, M, DEPTH>,
    ) -> Result<usize, SessionError<C::Error>> {
        let mut sent = 0;
        while let Ok(request) = receiver.try_receive() {
            self.publish_next(request.topic, request.payload, request.qos, request.retain)
                .await?;
            sent += 1;
        }
        if sent > 0 {
            debug!("flushed {} queued publishes", sent);
        }
        Ok(sent)
    }
}
