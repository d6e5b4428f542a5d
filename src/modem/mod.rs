//! # Bearer and Socket State Machine
//!
//! [`Modem`] drives a SIM808-class modem from power-up to an open TCP socket
//! and moves bytes through it. Every step is one AT exchange on the
//! [`CommandChannel`]; the modem's own `AT+CIPSTATUS` report is the source of
//! truth for the socket, and [`BearerState`] mirrors the last observation.
//!
//! ```text
//! Uninitialized --init--> BearerDown --bring_up--> SocketClosed
//!   SocketClosed --CIPSTART--> SocketConnecting --> SocketOpen
//!   SocketOpen --(modem reports TCP CLOSED)--> SocketClosed --open--> ...
//!   any --close--> BearerDown
//! ```

mod commands;
mod status;

pub use commands::{MAX_COMMAND_LEN, SendReply};
pub use status::{BearerState, MAX_STATUS_LEN, SocketStatus};

use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;

use crate::channel::ByteChannel;
use crate::command::{CommandChannel, Line, MAX_LINE_LEN, Token};
use crate::config::ModemConfig;
use crate::error::{BearerError, BringUpStep, ChannelError, TransportError};
use crate::fmt::printable;

/// Largest payload accepted by a single `AT+CIPSEND`.
pub const MAX_SEND_LEN: usize = 1460;

const NO_SETTLE: Duration = Duration::from_ticks(0);

/// Remote TCP endpoint of the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Endpoint<'a> {
    pub host: &'a str,
    pub port: u16,
}

impl<'a> Endpoint<'a> {
    pub const fn new(host: &'a str, port: u16) -> Self {
        Self { host, port }
    }
}

/// A cellular modem carrying one TCP socket over a GPRS bearer.
pub struct Modem<'a, C, D> {
    commands: CommandChannel<C, D>,
    config: ModemConfig<'a>,
    state: BearerState,
    endpoint: Option<Endpoint<'a>>,
    local_ip: Option<Line>,
    reopens: u32,
}

impl<'a, C, D> Modem<'a, C, D>
where
    C: ByteChannel,
    D: DelayNs,
{
    pub fn new(channel: C, delay: D, config: ModemConfig<'a>) -> Self {
        Self {
            commands: CommandChannel::new(channel, delay),
            config,
            state: BearerState::Uninitialized,
            endpoint: None,
            local_ip: None,
            reopens: 0,
        }
    }

    /// Last observed lifecycle state.
    pub fn state(&self) -> BearerState {
        self.state
    }

    /// Whether the last status query reported an open socket.
    pub fn is_connected(&self) -> bool {
        self.state == BearerState::SocketOpen
    }

    pub fn config(&self) -> &ModemConfig<'a> {
        &self.config
    }

    /// Endpoint of the last `open`, reused when the socket is reopened.
    pub fn endpoint(&self) -> Option<Endpoint<'a>> {
        self.endpoint
    }

    /// Address reported by `AT+CIFSR` during the last bring-up.
    pub fn local_ip(&self) -> Option<&str> {
        self.local_ip
            .as_ref()
            .map(|line| printable(line).trim())
    }

    /// Number of times `send` found the socket closed and opened a new one.
    /// Each reopen is a fresh TCP stream to the endpoint.
    pub fn reopen_count(&self) -> u32 {
        self.reopens
    }

    pub fn commands(&self) -> &CommandChannel<C, D> {
        &self.commands
    }

    pub fn release(self) -> (C, D) {
        self.commands.release()
    }

    fn set_state(&mut self, state: BearerState) {
        if self.state != state {
            debug!("bearer state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    /// Verifies SIM, signal, registration and packet attach, in that order.
    pub async fn init(&mut self) -> Result<(), BearerError<C::Error>> {
        for (step, command, expected) in commands::INIT_SEQUENCE {
            if self.commands.execute(command, expected, NO_SETTLE).await.is_err() {
                warn!("modem init failed at {:?}", step);
                self.set_state(BearerState::Error);
                return Err(BearerError::InitFailed(*step));
            }
        }
        info!("modem ready");
        self.set_state(BearerState::BearerDown);
        Ok(())
    }

    /// Runs [`init`](Self::init) up to `init_attempts` times, pausing
    /// `init_backoff` between attempts.
    pub async fn init_with_retry(&mut self) -> Result<(), BearerError<C::Error>> {
        let attempts = self.config.init_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.init().await {
                Ok(()) => return Ok(()),
                Err(_) if attempt < attempts => {
                    info!("modem init attempt {}/{} failed, retrying", attempt, attempts);
                    let backoff = self.config.init_backoff;
                    self.commands.delay(backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("modem init failed after {} attempts", attempts);
                    return Err(e);
                }
            }
        }
    }

    async fn bring_up_step(
        &mut self,
        step: BringUpStep,
        command: &[u8],
        expected: &[Token<'_>],
        settle: Duration,
    ) -> Result<Option<Line>, BearerError<C::Error>> {
        match self.commands.execute(command, expected, settle).await {
            Ok(captured) => Ok(captured),
            Err(_) => {
                warn!("bearer bring-up failed at {:?}", step);
                self.set_state(BearerState::Error);
                Err(BearerError::BringUpFailed(step))
            }
        }
    }

    /// Configures the TCP/IP stack and activates the GPRS bearer.
    pub async fn bring_up(&mut self) -> Result<(), BearerError<C::Error>> {
        self.bring_up_step(
            BringUpStep::SingleConnection,
            commands::SINGLE_CONNECTION,
            commands::EXPECT_OK,
            NO_SETTLE,
        )
        .await?;
        self.bring_up_step(
            BringUpStep::NonTransparentMode,
            commands::NON_TRANSPARENT,
            commands::EXPECT_OK,
            NO_SETTLE,
        )
        .await?;

        let start_task = commands::start_task(&self.config.apn)
            .map_err(|_| BearerError::BringUpFailed(BringUpStep::StartTask))?;
        self.bring_up_step(
            BringUpStep::StartTask,
            start_task.as_bytes(),
            commands::EXPECT_OK,
            NO_SETTLE,
        )
        .await?;

        let settle = self.config.activate_settle;
        self.bring_up_step(
            BringUpStep::ActivateBearer,
            commands::ACTIVATE_BEARER,
            commands::EXPECT_OK,
            settle,
        )
        .await?;

        let address = self
            .bring_up_step(
                BringUpStep::LocalAddress,
                commands::LOCAL_ADDRESS,
                commands::EXPECT_ADDRESS,
                NO_SETTLE,
            )
            .await?;
        match address {
            Some(line) if !line.starts_with(b"ERROR") => {
                info!("bearer up, local address {}", printable(&line).trim());
                self.local_ip = Some(line);
            }
            _ => {
                warn!("bearer bring-up failed at {:?}", BringUpStep::LocalAddress);
                self.set_state(BearerState::Error);
                return Err(BearerError::BringUpFailed(BringUpStep::LocalAddress));
            }
        }

        self.set_state(BearerState::SocketClosed);
        Ok(())
    }

    /// Initializes the modem and brings the bearer up from scratch, shutting
    /// down any PDP context left over from a previous run.
    pub async fn open_bearer(&mut self) -> Result<(), BearerError<C::Error>> {
        self.init_with_retry().await?;

        let status = self.query_status().await?;
        if status != SocketStatus::IpInitial {
            info!("stale PDP context ({:?}), shutting it down", status);
            if !self.shutdown().await {
                warn!("shutting down the stale context failed");
            }
            let settle = self.config.shutdown_settle;
            self.commands.delay(settle).await;
        }

        self.bring_up().await
    }

    /// Asks the modem for its connection status and tracks the result.
    pub async fn query_status(&mut self) -> Result<SocketStatus, BearerError<C::Error>> {
        let line = self
            .commands
            .execute(commands::SOCKET_STATUS, commands::EXPECT_STATUS, NO_SETTLE)
            .await?
            .unwrap_or_default();
        let status = SocketStatus::parse(&line);
        trace!("socket status {:?}", status);
        self.set_state(status.bearer_state());
        Ok(status)
    }

    /// Opens the TCP socket to `endpoint` and remembers it for reopening.
    pub async fn open(&mut self, endpoint: Endpoint<'a>) -> Result<(), BearerError<C::Error>> {
        self.endpoint = Some(endpoint);
        self.connect_socket(endpoint).await
    }

    /// Polls the status and acts on it until the socket is open or the poll
    /// budget runs out.
    async fn connect_socket(&mut self, endpoint: Endpoint<'a>) -> Result<(), BearerError<C::Error>> {
        let polls = self.config.status_polls.max(1);
        for _ in 0..polls {
            match self.query_status().await? {
                SocketStatus::ConnectOk => {
                    info!("socket open to {}:{}", endpoint.host, endpoint.port);
                    return Ok(());
                }
                SocketStatus::IpInitial => {
                    info!("bearer lost, bringing it up again");
                    self.bring_up().await?;
                }
                SocketStatus::TcpClosed | SocketStatus::IpStatus => {
                    let start = commands::socket_start(&endpoint)
                        .map_err(|_| BearerError::Channel(ChannelError::Overflow))?;
                    let started = self
                        .commands
                        .execute(start.as_bytes(), commands::EXPECT_OK, NO_SETTLE)
                        .await;
                    if started.is_err() {
                        warn!("socket start rejected, backing off");
                        let backoff = self.config.start_backoff;
                        self.commands.delay(backoff).await;
                    }
                }
                SocketStatus::TcpConnecting => {
                    let backoff = self.config.connecting_backoff;
                    self.commands.delay(backoff).await;
                }
                other => {
                    error!("cannot open socket from state {:?}", other);
                    self.set_state(BearerState::Error);
                    return Err(BearerError::UnrecognizedState(other));
                }
            }
        }
        error!("socket did not open within {} status polls", polls);
        Err(BearerError::OpenTimeout)
    }

    /// Sends `payload` on the open socket and returns the first line the
    /// remote answered with. A socket found closed is reopened once to the
    /// remembered endpoint first.
    pub async fn send(&mut self, payload: &[u8]) -> Result<Line, TransportError<C::Error>> {
        if payload.len() > MAX_SEND_LEN {
            return Err(TransportError::PayloadTooLarge);
        }

        match self.query_status().await? {
            SocketStatus::ConnectOk => {}
            SocketStatus::TcpClosed => {
                let endpoint = self.endpoint.ok_or(TransportError::NoEndpoint)?;
                info!("socket closed by remote, reopening");
                self.reopens = self.reopens.wrapping_add(1);
                self.connect_socket(endpoint).await?;
            }
            other => {
                self.set_state(BearerState::Error);
                return Err(BearerError::UnrecognizedState(other).into());
            }
        }

        let command = commands::send_length(payload.len())
            .map_err(|_| TransportError::Channel(ChannelError::Overflow))?;
        self.commands
            .execute(command.as_bytes(), commands::EXPECT_ECHO, NO_SETTLE)
            .await?;
        self.wait_prompt().await?;

        self.commands.write_raw(payload).await?;
        self.read_send_result(payload).await
    }

    async fn wait_prompt(&mut self) -> Result<(), TransportError<C::Error>> {
        let attempts = self.config.prompt_attempts.max(1);
        for attempt in 1..=attempts {
            let line = self.commands.read_line().await?;
            if commands::is_prompt(&line) {
                return Ok(());
            }
            if attempt < attempts {
                let backoff = self.config.prompt_backoff;
                self.commands.delay(backoff).await;
            }
        }
        warn!("no data prompt after {} reads", attempts);
        Err(TransportError::PromptTimeout)
    }

    /// Waits for `SEND OK`. The modem may echo the payload first, as one line
    /// per `\n` and per line-buffer chunk, so the budget grows with it.
    async fn read_send_result(&mut self, payload: &[u8]) -> Result<Line, TransportError<C::Error>> {
        let echo_lines = payload.len().div_ceil(MAX_LINE_LEN)
            + payload.iter().filter(|&&b| b == b'\n').count();
        let budget = usize::from(self.config.send_reply_lines.max(1)) + echo_lines;
        for _ in 0..budget {
            let line = self.commands.read_line().await?;
            match SendReply::classify(&line) {
                SendReply::Ok => {
                    let reply = self.commands.read_line().await?;
                    trace!("remote replied with {} bytes", reply.len());
                    return Ok(reply);
                }
                SendReply::Failed => {
                    warn!("modem reported send failure");
                    return Err(TransportError::SendFailed);
                }
                SendReply::Other => {}
            }
        }
        warn!("no send confirmation");
        Err(TransportError::SendFailed)
    }

    async fn shutdown(&mut self) -> bool {
        self.commands
            .execute(commands::DEACTIVATE, commands::EXPECT_SHUT, NO_SETTLE)
            .await
            .is_ok()
    }

    /// Deactivates the bearer. A failed deactivation is logged and ignored.
    pub async fn close(&mut self) {
        if !self.shutdown().await {
            warn!("bearer deactivation failed, continuing");
        }
        self.local_ip = None;
        self.set_state(BearerState::BearerDown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Apn;
    use crate::error::InitStep;
    use crate::testing::{RecordingDelay, Script, ScriptedChannel};
    use embassy_futures::block_on;

    const ENDPOINT: Endpoint<'static> = Endpoint::new("broker.example", 1883);
    const CIPSTART: &str = "AT+CIPSTART=\"TCP\",\"broker.example\",\"1883\"";

    fn config() -> ModemConfig<'static> {
        ModemConfig::new(Apn::new("internet", "", ""))
            .with_init_retry(3, Duration::from_secs(5))
            .with_open_polling(6, Duration::from_secs(10), Duration::from_secs(10))
    }

    fn modem(script: Script) -> Modem<'static, ScriptedChannel, RecordingDelay> {
        Modem::new(script.channel(), RecordingDelay::default(), config())
    }

    fn channel<'m>(modem: &'m Modem<'static, ScriptedChannel, RecordingDelay>) -> &'m ScriptedChannel {
        modem.commands().parts().0
    }

    fn delay<'m>(modem: &'m Modem<'static, ScriptedChannel, RecordingDelay>) -> &'m RecordingDelay {
        modem.commands().parts().1
    }

    #[test]
    fn test_init_success() {
        let mut modem = modem(Script::new().init());
        assert_eq!(block_on(modem.init()), Ok(()));
        assert_eq!(modem.state(), BearerState::BearerDown);
        assert_eq!(channel(&modem).remaining(), 0);
    }

    #[test]
    fn test_init_reports_failed_step() {
        let script = Script::new()
            .reply("AT+CPIN?", &["+CPIN: READY", "", "OK"])
            .reply("AT+CSQ", &["+CSQ: 18,0", "", "OK"])
            .reply("AT+CREG?", &["+CREG: 0,2", "", "OK"]);
        let mut modem = modem(script);
        assert_eq!(
            block_on(modem.init()),
            Err(BearerError::InitFailed(InitStep::NetworkRegistration))
        );
        assert_eq!(modem.state(), BearerState::Error);
        assert_eq!(channel(&modem).count_written(b"AT+CGATT"), 0);
    }

    #[test]
    fn test_init_with_retry_backs_off_between_attempts() {
        let script = Script::new()
            .reply("AT+CPIN?", &["+CPIN: NOT READY", "", "OK"])
            .reply("AT+CPIN?", &["+CPIN: NOT READY", "", "OK"])
            .init();
        let mut modem = modem(script);
        assert_eq!(block_on(modem.init_with_retry()), Ok(()));
        assert_eq!(delay(&modem).history_ms, std::vec![5000, 5000]);
    }

    #[test]
    fn test_init_with_retry_gives_up() {
        let mut modem = modem(Script::new());
        assert_eq!(
            block_on(modem.init_with_retry()),
            Err(BearerError::InitFailed(InitStep::SimReady))
        );
        assert_eq!(channel(&modem).count_written(b"AT+CPIN?"), 3);
        assert_eq!(delay(&modem).calls, 2);
    }

    #[test]
    fn test_bring_up_records_local_address() {
        let mut modem = modem(Script::new().bring_up());
        assert_eq!(block_on(modem.bring_up()), Ok(()));
        assert_eq!(modem.state(), BearerState::SocketClosed);
        assert_eq!(modem.local_ip(), Some("10.64.12.7"));
    }

    #[test]
    fn test_bring_up_rejects_address_error() {
        let script = Script::new()
            .ok("AT+CIPMUX=0")
            .ok("AT+CIPMODE=0")
            .ok("AT+CSTT=\"internet\",\"\",\"\"")
            .ok("AT+CIICR")
            .reply("AT+CIFSR", &["ERROR"]);
        let mut modem = modem(script);
        assert_eq!(
            block_on(modem.bring_up()),
            Err(BearerError::BringUpFailed(BringUpStep::LocalAddress))
        );
        assert_eq!(modem.local_ip(), None);
    }

    #[test]
    fn test_open_bearer_shuts_down_stale_context() {
        let script = Script::new()
            .init()
            .status("IP GPRSACT")
            .reply("AT+CIPSHUT", &["SHUT OK"])
            .bring_up();
        let mut modem = modem(script);
        assert_eq!(block_on(modem.open_bearer()), Ok(()));
        assert_eq!(channel(&modem).count_written(b"AT+CIPSHUT"), 1);
        assert_eq!(delay(&modem).history_ms, std::vec![5000]);
        assert_eq!(modem.state(), BearerState::SocketClosed);
    }

    #[test]
    fn test_open_from_initial_walks_every_state() {
        let script = Script::new()
            .status("IP INITIAL")
            .bring_up()
            .status("TCP CLOSED")
            .ok(CIPSTART)
            .status("TCP CONNECTING")
            .status("CONNECT OK");
        let mut modem = modem(script);
        assert_eq!(block_on(modem.open(ENDPOINT)), Ok(()));
        assert_eq!(modem.state(), BearerState::SocketOpen);
        assert_eq!(channel(&modem).count_written(b"AT+CIPSTATUS"), 4);
        assert_eq!(channel(&modem).count_written(b"AT+CIPSTART"), 1);
        assert_eq!(delay(&modem).history_ms, std::vec![10_000]);
    }

    #[test]
    fn test_open_retries_rejected_start() {
        let script = Script::new()
            .status("IP STATUS")
            .reply(CIPSTART, &["ERROR"])
            .status("TCP CLOSED")
            .ok(CIPSTART)
            .status("CONNECT OK");
        let mut modem = modem(script);
        assert_eq!(block_on(modem.open(ENDPOINT)), Ok(()));
        assert_eq!(channel(&modem).count_written(b"AT+CIPSTART"), 2);
        assert_eq!(delay(&modem).history_ms, std::vec![10_000]);
    }

    #[test]
    fn test_open_gives_up_after_poll_budget() {
        let mut script = Script::new();
        for _ in 0..6 {
            script = script.status("TCP CONNECTING");
        }
        let mut modem = modem(script);
        assert_eq!(block_on(modem.open(ENDPOINT)), Err(BearerError::OpenTimeout));
        assert_eq!(channel(&modem).count_written(b"AT+CIPSTATUS"), 6);
    }

    #[test]
    fn test_open_rejects_unhandled_state() {
        let mut modem = modem(Script::new().status("PDP DEACT"));
        assert_eq!(
            block_on(modem.open(ENDPOINT)),
            Err(BearerError::UnrecognizedState(SocketStatus::PdpDeact))
        );
        assert_eq!(modem.state(), BearerState::Error);
    }

    #[test]
    fn test_send_returns_remote_reply() {
        let script = Script::new()
            .status("CONNECT OK")
            .send(4, b"ping", &[0xD0, 0x00, b'\n']);
        let mut modem = modem(script);
        let reply = block_on(modem.send(b"ping")).unwrap();
        assert_eq!(reply.as_slice(), &[0xD0, 0x00, b'\n']);
        assert!(channel(&modem).written.iter().any(|w| w.as_slice() == b"ping"));
    }

    #[test]
    fn test_send_reopens_closed_socket_once() {
        let script = Script::new()
            .status("CONNECT OK")
            .status("TCP CLOSED")
            .status("TCP CLOSED")
            .ok(CIPSTART)
            .status("CONNECT OK")
            .send(2, b"hi", b"ok\r\n");
        let mut modem = modem(script);
        assert_eq!(block_on(modem.open(ENDPOINT)), Ok(()));
        assert_eq!(modem.reopen_count(), 0);
        assert!(block_on(modem.send(b"hi")).is_ok());
        assert_eq!(channel(&modem).count_written(b"AT+CIPSTART"), 1);
        assert_eq!(modem.state(), BearerState::SocketOpen);
        assert_eq!(modem.reopen_count(), 1);
    }

    /// Script for a send whose payload the modem echoes back as `echo` lines.
    fn echoed_send(len: usize, echo: &[&[u8]], ack: &[u8]) -> Script {
        let mut script = Script::new()
            .status("CONNECT OK")
            .reply(&std::format!("AT+CIPSEND={len}"), &[])
            .raw(b"> ");
        for line in echo {
            script = script.raw(line);
        }
        script.raw(b"SEND OK\r\n").raw(ack)
    }

    #[test]
    fn test_send_skips_multi_line_payload_echo() {
        let payload: std::vec::Vec<u8> = (0..9)
            .flat_map(|i| std::format!("temp{i}=21.{i}\n").into_bytes())
            .collect();
        let echo: std::vec::Vec<&[u8]> = payload.split_inclusive(|&b| b == b'\n').collect();
        assert_eq!(echo.len(), 9);

        let mut modem = modem(echoed_send(payload.len(), &echo, &[0x40, 0x02, 0x00, 0x01]));
        let reply = block_on(modem.send(&payload)).unwrap();
        assert_eq!(reply.as_slice(), &[0x40, 0x02, 0x00, 0x01]);
    }

    #[test]
    fn test_send_skips_chunked_echo_of_large_payload() {
        let payload = [b'x'; 1100];
        let mut echo: std::vec::Vec<&[u8]> = payload.chunks(MAX_LINE_LEN).collect();
        echo.push(b"\r\n");
        assert_eq!(echo.len(), 10);

        let mut modem = modem(echoed_send(payload.len(), &echo, &[0xD0, 0x00]));
        let reply = block_on(modem.send(&payload)).unwrap();
        assert_eq!(reply.as_slice(), &[0xD0, 0x00]);
    }

    #[test]
    fn test_send_ignores_echo_ending_in_send_ok() {
        let payload = b"relay: SEND OK";
        let mut modem = modem(echoed_send(payload.len(), &[b"relay: SEND OK\r\n".as_slice()], &[0xD0, 0x00]));
        let reply = block_on(modem.send(payload)).unwrap();
        assert_eq!(reply.as_slice(), &[0xD0, 0x00]);
    }

    #[test]
    fn test_send_without_confirmation_fails() {
        let script = Script::new()
            .status("CONNECT OK")
            .reply("AT+CIPSEND=1", &[])
            .raw(b"> ");
        let mut modem = modem(script);
        assert_eq!(block_on(modem.send(b"x")), Err(TransportError::SendFailed));
    }

    #[test]
    fn test_send_without_endpoint_on_closed_socket() {
        let mut modem = modem(Script::new().status("TCP CLOSED"));
        assert_eq!(block_on(modem.send(b"x")), Err(TransportError::NoEndpoint));
    }

    #[test]
    fn test_send_prompt_timeout() {
        let script = Script::new()
            .status("CONNECT OK")
            .reply("AT+CIPSEND=1", &["ERROR"]);
        let mut modem = modem(script);
        assert_eq!(block_on(modem.send(b"x")), Err(TransportError::PromptTimeout));
        assert_eq!(delay(&modem).history_ms, std::vec![200, 200, 200, 200]);
        assert!(!channel(&modem).written.iter().any(|w| w.as_slice() == b"x"));
    }

    #[test]
    fn test_send_fail_reply() {
        let script = Script::new()
            .status("CONNECT OK")
            .reply("AT+CIPSEND=1", &[])
            .raw(b"> ")
            .raw(b"SEND FAIL\r\n");
        let mut modem = modem(script);
        assert_eq!(block_on(modem.send(b"x")), Err(TransportError::SendFailed));
    }

    #[test]
    fn test_send_rejects_oversized_payload() {
        let mut modem = modem(Script::new());
        let payload = [0u8; MAX_SEND_LEN + 1];
        assert_eq!(block_on(modem.send(&payload)), Err(TransportError::PayloadTooLarge));
        assert!(channel(&modem).written.is_empty());
    }

    #[test]
    fn test_close_ignores_deactivation_failure() {
        let mut modem = modem(Script::new().reply("AT+CIPSHUT", &["ERROR"]));
        block_on(modem.close());
        assert_eq!(modem.state(), BearerState::BearerDown);
        assert!(!modem.is_connected());
    }
}
