//! Socket status reported by `AT+CIPSTATUS`, and the state the machine tracks.

use heapless::String;

/// Longest unrecognized status kept for diagnostics.
pub const MAX_STATUS_LEN: usize = 32;

/// Connection status strings of the modem in single-connection mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketStatus {
    IpInitial,
    IpStart,
    IpConfig,
    IpGprsAct,
    /// Bearer up with a local address, no socket yet.
    IpStatus,
    TcpConnecting,
    ConnectOk,
    TcpClosing,
    TcpClosed,
    PdpDeact,
    Unrecognized(String<MAX_STATUS_LEN>),
}

impl SocketStatus {
    /// Parses a status line such as `STATE: CONNECT OK\r\n`.
    pub fn parse(line: &[u8]) -> Self {
        let text = core::str::from_utf8(line).unwrap_or("").trim();
        let text = text.strip_prefix("STATE:").map(str::trim).unwrap_or(text);
        match text {
            "IP INITIAL" => Self::IpInitial,
            "IP START" => Self::IpStart,
            "IP CONFIG" => Self::IpConfig,
            "IP GPRSACT" => Self::IpGprsAct,
            "IP STATUS" => Self::IpStatus,
            "TCP CONNECTING" => Self::TcpConnecting,
            "CONNECT OK" => Self::ConnectOk,
            "TCP CLOSING" => Self::TcpClosing,
            "TCP CLOSED" => Self::TcpClosed,
            "PDP DEACT" => Self::PdpDeact,
            other => {
                let mut kept = String::new();
                for c in other.chars() {
                    if kept.push(c).is_err() {
                        break;
                    }
                }
                Self::Unrecognized(kept)
            }
        }
    }

    /// The bearer state this status corresponds to.
    pub fn bearer_state(&self) -> BearerState {
        match self {
            Self::IpInitial | Self::IpStart | Self::IpConfig | Self::IpGprsAct | Self::PdpDeact => {
                BearerState::BearerDown
            }
            Self::IpStatus | Self::TcpClosing | Self::TcpClosed => BearerState::SocketClosed,
            Self::TcpConnecting => BearerState::SocketConnecting,
            Self::ConnectOk => BearerState::SocketOpen,
            Self::Unrecognized(_) => BearerState::Error,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SocketStatus {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Unrecognized(text) => defmt::write!(f, "Unrecognized({=str})", text.as_str()),
            known => defmt::write!(f, "{=str}", known.label()),
        }
    }
}

impl SocketStatus {
    /// The modem's own spelling of a known status.
    pub fn label(&self) -> &str {
        match self {
            Self::IpInitial => "IP INITIAL",
            Self::IpStart => "IP START",
            Self::IpConfig => "IP CONFIG",
            Self::IpGprsAct => "IP GPRSACT",
            Self::IpStatus => "IP STATUS",
            Self::TcpConnecting => "TCP CONNECTING",
            Self::ConnectOk => "CONNECT OK",
            Self::TcpClosing => "TCP CLOSING",
            Self::TcpClosed => "TCP CLOSED",
            Self::PdpDeact => "PDP DEACT",
            Self::Unrecognized(text) => text.as_str(),
        }
    }
}

/// Where the modem is in the bearer/socket lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BearerState {
    Uninitialized,
    BearerDown,
    SocketClosed,
    SocketConnecting,
    SocketOpen,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_states() {
        assert_eq!(SocketStatus::parse(b"STATE: IP INITIAL\r\n"), SocketStatus::IpInitial);
        assert_eq!(SocketStatus::parse(b"STATE: TCP CLOSED\r\n"), SocketStatus::TcpClosed);
        assert_eq!(SocketStatus::parse(b"STATE: CONNECT OK\r\n"), SocketStatus::ConnectOk);
        assert_eq!(
            SocketStatus::parse(b"STATE: TCP CONNECTING\r\n"),
            SocketStatus::TcpConnecting
        );
        assert_eq!(SocketStatus::parse(b"CONNECT OK\r\n"), SocketStatus::ConnectOk);
    }

    #[test]
    fn test_parse_unrecognized_keeps_text() {
        match SocketStatus::parse(b"STATE: SERVER LISTENING\r\n") {
            SocketStatus::Unrecognized(text) => assert_eq!(text.as_str(), "SERVER LISTENING"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            SocketStatus::parse(&[0xFF, 0x00]),
            SocketStatus::Unrecognized(_)
        ));
    }

    #[test]
    fn test_label_round_trips_known_states() {
        for status in [SocketStatus::IpGprsAct, SocketStatus::TcpClosing, SocketStatus::PdpDeact] {
            assert_eq!(SocketStatus::parse(status.label().as_bytes()), status);
        }
    }

    #[test]
    fn test_status_maps_to_bearer_state() {
        assert_eq!(SocketStatus::IpInitial.bearer_state(), BearerState::BearerDown);
        assert_eq!(SocketStatus::IpStatus.bearer_state(), BearerState::SocketClosed);
        assert_eq!(SocketStatus::ConnectOk.bearer_state(), BearerState::SocketOpen);
    }
}
