//! # Configuration
//!
//! [`ModemConfig`] holds the carrier access point and every retry bound and
//! backoff used by the bearer/socket state machine. [`MqttOptions`] holds the
//! protocol constants of the session. Both start from sensible defaults and are
//! adjusted with `with_*` builder methods.

use embassy_time::Duration;

use crate::packet::{Connect, PROTOCOL_VERSION, Will};

/// Access point credentials passed to `AT+CSTT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Apn<'a> {
    pub name: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

impl<'a> Apn<'a> {
    pub const fn new(name: &'a str, username: &'a str, password: &'a str) -> Self {
        Self {
            name,
            username,
            password,
        }
    }
}

/// Bearer and socket settings for the modem state machine.
#[derive(Debug, Clone, Copy)]
pub struct ModemConfig<'a> {
    /// Carrier access point.
    pub apn: Apn<'a>,
    /// Number of `init()` attempts made by `init_with_retry()`.
    pub init_attempts: u8,
    /// Pause between initialization attempts.
    pub init_backoff: Duration,
    /// Pause after shutting down a stale PDP context before bring-up.
    pub shutdown_settle: Duration,
    /// Settle time between writing `AT+CIICR` and reading its reply.
    pub activate_settle: Duration,
    /// Maximum number of status queries made by a single socket open.
    pub status_polls: u8,
    /// Pause after a failed `AT+CIPSTART` before re-querying the status.
    pub start_backoff: Duration,
    /// Pause while the socket reports `TCP CONNECTING`.
    pub connecting_backoff: Duration,
    /// Number of reads spent waiting for the `> ` data prompt.
    pub prompt_attempts: u8,
    /// Pause between prompt reads.
    pub prompt_backoff: Duration,
    /// Maximum number of lines read while waiting for `SEND OK`.
    pub send_reply_lines: u8,
}

impl Default for ModemConfig<'_> {
    fn default() -> Self {
        Self {
            apn: Apn::new("", "", ""),
            init_attempts: 3,
            init_backoff: Duration::from_secs(5),
            shutdown_settle: Duration::from_secs(5),
            activate_settle: Duration::from_secs(0),
            status_polls: 10,
            start_backoff: Duration::from_secs(10),
            connecting_backoff: Duration::from_secs(10),
            prompt_attempts: 5,
            prompt_backoff: Duration::from_millis(200),
            send_reply_lines: 8,
        }
    }
}

impl<'a> ModemConfig<'a> {
    /// Creates a configuration for the given access point with default timings.
    pub fn new(apn: Apn<'a>) -> Self {
        Self {
            apn,
            ..Self::default()
        }
    }

    pub fn with_init_retry(mut self, attempts: u8, backoff: Duration) -> Self {
        self.init_attempts = attempts;
        self.init_backoff = backoff;
        self
    }

    pub fn with_shutdown_settle(mut self, settle: Duration) -> Self {
        self.shutdown_settle = settle;
        self
    }

    pub fn with_activate_settle(mut self, settle: Duration) -> Self {
        self.activate_settle = settle;
        self
    }

    /// Sets the status poll budget and both backoffs used while opening a socket.
    pub fn with_open_polling(mut self, polls: u8, start: Duration, connecting: Duration) -> Self {
        self.status_polls = polls;
        self.start_backoff = start;
        self.connecting_backoff = connecting;
        self
    }

    pub fn with_prompt_wait(mut self, attempts: u8, backoff: Duration) -> Self {
        self.prompt_attempts = attempts;
        self.prompt_backoff = backoff;
        self
    }

    pub fn with_send_reply_lines(mut self, lines: u8) -> Self {
        self.send_reply_lines = lines;
        self
    }
}

/// Protocol constants for an MQTT session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MqttOptions<'a> {
    pub client_id: &'a str,
    /// Keep-alive interval in seconds.
    pub keep_alive: u16,
    /// Protocol level byte; 3 for `MQIsdp`.
    pub protocol_version: u8,
    pub clean_session: bool,
    pub username: Option<&'a str>,
    pub password: Option<&'a [u8]>,
    pub will: Option<Will<'a>>,
}

impl<'a> MqttOptions<'a> {
    /// Creates options with a 60 second keep-alive and a clean session.
    pub fn new(client_id: &'a str) -> Self {
        Self {
            client_id,
            keep_alive: 60,
            protocol_version: PROTOCOL_VERSION,
            clean_session: true,
            username: None,
            password: None,
            will: None,
        }
    }

    pub fn with_keep_alive(mut self, seconds: u16) -> Self {
        self.keep_alive = seconds;
        self
    }

    pub fn with_protocol_version(mut self, version: u8) -> Self {
        self.protocol_version = version;
        self
    }

    pub fn with_clean_session(mut self, clean: bool) -> Self {
        self.clean_session = clean;
        self
    }

    /// Sets the username, and the password when one is given.
    pub fn with_credentials(mut self, username: &'a str, password: Option<&'a [u8]>) -> Self {
        self.username = Some(username);
        self.password = password;
        self
    }

    pub fn with_will(mut self, will: Will<'a>) -> Self {
        self.will = Some(will);
        self
    }

    /// The `CONNECT` packet announcing these options.
    pub fn connect_packet(&self) -> Connect<'a> {
        Connect {
            protocol_version: self.protocol_version,
            keep_alive: self.keep_alive,
            client_id: self.client_id,
            clean_session: self.clean_session,
            username: self.username,
            password: self.password,
            will: self.will,
        }
    }
}
