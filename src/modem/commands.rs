//! AT command vocabulary of the SIM808 TCP/IP stack and the replies expected
//! in non-transparent, single-connection mode.

use core::fmt::Write;

use heapless::String;

use crate::command::Token;
use crate::config::Apn;
use crate::error::InitStep;
use crate::modem::Endpoint;

/// Room for a formatted command line.
pub const MAX_COMMAND_LEN: usize = 160;

pub type CommandLine = String<MAX_COMMAND_LEN>;

const OK: Token<'static> = Token::Literal(b"OK\r\n");
const BLANK: Token<'static> = Token::Literal(b"\r\n");

pub const SIM_READY: &[u8] = b"AT+CPIN?\r\n";
pub const SIGNAL_QUALITY: &[u8] = b"AT+CSQ\r\n";
pub const NETWORK_REGISTRATION: &[u8] = b"AT+CREG?\r\n";
pub const PACKET_ATTACH: &[u8] = b"AT+CGATT?\r\n";
pub const SOCKET_STATUS: &[u8] = b"AT+CIPSTATUS\r\n";
pub const SINGLE_CONNECTION: &[u8] = b"AT+CIPMUX=0\r\n";
pub const NON_TRANSPARENT: &[u8] = b"AT+CIPMODE=0\r\n";
pub const ACTIVATE_BEARER: &[u8] = b"AT+CIICR\r\n";
pub const LOCAL_ADDRESS: &[u8] = b"AT+CIFSR\r\n";
pub const DEACTIVATE: &[u8] = b"AT+CIPSHUT\r\n";

/// Initialization checks, in order.
pub const INIT_SEQUENCE: &[(InitStep, &[u8], &[Token<'static>])] = &[
    (
        InitStep::SimReady,
        SIM_READY,
        &[Token::Echo, Token::Literal(b"+CPIN: READY\r\n"), BLANK, OK],
    ),
    // Any signal value will do; the reply only has to be there.
    (
        InitStep::SignalQuality,
        SIGNAL_QUALITY,
        &[Token::Echo, Token::Wildcard, BLANK, OK],
    ),
    (
        InitStep::NetworkRegistration,
        NETWORK_REGISTRATION,
        &[Token::Echo, Token::Literal(b"+CREG: 0,1\r\n"), BLANK, OK],
    ),
    (
        InitStep::PacketAttach,
        PACKET_ATTACH,
        &[Token::Echo, Token::Literal(b"+CGATT: 1\r\n"), BLANK, OK],
    ),
];

pub const EXPECT_OK: &[Token<'static>] = &[Token::Echo, OK];
pub const EXPECT_STATUS: &[Token<'static>] = &[Token::Echo, OK, BLANK, Token::Capture];
pub const EXPECT_ADDRESS: &[Token<'static>] = &[Token::Echo, Token::Capture];
pub const EXPECT_SHUT: &[Token<'static>] = &[Token::Echo, Token::Literal(b"SHUT OK\r\n")];
pub const EXPECT_ECHO: &[Token<'static>] = &[Token::Echo];

/// `AT+CSTT="<apn>","<user>","<password>"`
pub fn start_task(apn: &Apn<'_>) -> Result<CommandLine, core::fmt::Error> {
    let mut line = CommandLine::new();
    write!(
        line,
        "AT+CSTT=\"{}\",\"{}\",\"{}\"\r\n",
        apn.name, apn.username, apn.password
    )?;
    Ok(line)
}

/// `AT+CIPSTART="TCP","<host>","<port>"`
pub fn socket_start(endpoint: &Endpoint<'_>) -> Result<CommandLine, core::fmt::Error> {
    let mut line = CommandLine::new();
    write!(
        line,
        "AT+CIPSTART=\"TCP\",\"{}\",\"{}\"\r\n",
        endpoint.host, endpoint.port
    )?;
    Ok(line)
}

/// `AT+CIPSEND=<len>`
pub fn send_length(len: usize) -> Result<CommandLine, core::fmt::Error> {
    let mut line = CommandLine::new();
    write!(line, "AT+CIPSEND={len}\r\n")?;
    Ok(line)
}

/// Terminal outcome of a send, read after the payload was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendReply {
    Ok,
    Failed,
    /// Payload echo or blank line.
    Other,
}

impl SendReply {
    pub fn classify(line: &[u8]) -> Self {
        let line = line.trim_ascii();
        if line == b"SEND OK" {
            SendReply::Ok
        } else if line == b"SEND FAIL" || line == b"ERROR" {
            SendReply::Failed
        } else {
            SendReply::Other
        }
    }
}

/// Whether `line` carries the `> ` data prompt.
pub fn is_prompt(line: &[u8]) -> bool {
    line.windows(2).any(|w| w == b"> ")
}
