//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;

use crate::channel::ByteChannel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptError;

/// A `ByteChannel` that replays a fixed list of reply lines and records writes.
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    script: VecDeque<Vec<u8>>,
    pub written: Vec<Vec<u8>>,
    /// Bytes reported by `bytes_waiting` until the next flush.
    pub stale: usize,
    pub flushes: usize,
}

impl ScriptedChannel {
    pub fn new(lines: &[&[u8]]) -> Self {
        Self {
            script: lines.iter().map(|line| line.to_vec()).collect(),
            ..Self::default()
        }
    }

    /// Writes that look like AT commands.
    pub fn written_commands(&self) -> Vec<Vec<u8>> {
        self.written
            .iter()
            .filter(|w| w.starts_with(b"AT"))
            .cloned()
            .collect()
    }

    /// Number of writes starting with `prefix`.
    pub fn count_written(&self, prefix: &[u8]) -> usize {
        self.written.iter().filter(|w| w.starts_with(prefix)).count()
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ByteChannel for ScriptedChannel {
    type Error = ScriptError;

    async fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.written.push(buf.to_vec());
        Ok(())
    }

    async fn read_line(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.script.pop_front() {
            Some(line) => {
                let n = line.len().min(buf.len());
                buf[..n].copy_from_slice(&line[..n]);
                Ok(n)
            }
            None => Ok(0),
        }
    }

    fn bytes_waiting(&mut self) -> usize {
        self.stale
    }

    async fn flush_input(&mut self) -> Result<(), Self::Error> {
        self.stale = 0;
        self.flushes += 1;
        Ok(())
    }
}

/// A `DelayNs` that returns immediately and records the requested time.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub calls: usize,
    pub total_ms: u64,
    pub history_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.delay_us(ns / 1000).await;
    }

    async fn delay_us(&mut self, us: u32) {
        self.delay_ms(us / 1000).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        self.total_ms += u64::from(ms);
        self.history_ms.push(ms);
    }
}

/// Builder for modem reply scripts in the modem's own line format.
#[derive(Debug, Default)]
pub struct Script {
    lines: Vec<Vec<u8>>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// The echo of `command` followed by `lines`, each terminated with `\r\n`.
    pub fn reply(mut self, command: &str, lines: &[&str]) -> Self {
        self.lines.push(std::format!("{command}\r\r\n").into_bytes());
        for line in lines {
            self.lines.push(std::format!("{line}\r\n").into_bytes());
        }
        self
    }

    pub fn ok(self, command: &str) -> Self {
        self.reply(command, &["OK"])
    }

    /// One line exactly as given, no terminator added.
    pub fn raw(mut self, line: &[u8]) -> Self {
        self.lines.push(line.to_vec());
        self
    }

    pub fn status(self, state: &str) -> Self {
        let state = std::format!("STATE: {state}");
        self.reply("AT+CIPSTATUS", &["OK", "", &state])
    }

    pub fn init(self) -> Self {
        self.reply("AT+CPIN?", &["+CPIN: READY", "", "OK"])
            .reply("AT+CSQ", &["+CSQ: 18,0", "", "OK"])
            .reply("AT+CREG?", &["+CREG: 0,1", "", "OK"])
            .reply("AT+CGATT?", &["+CGATT: 1", "", "OK"])
    }

    /// Bearer bring-up for the `internet` APN without credentials.
    pub fn bring_up(self) -> Self {
        self.ok("AT+CIPMUX=0")
            .ok("AT+CIPMODE=0")
            .ok("AT+CSTT=\"internet\",\"\",\"\"")
            .ok("AT+CIICR")
            .reply("AT+CIFSR", &["10.64.12.7"])
    }

    /// A complete send exchange answered by the broker with `ack`.
    pub fn send(self, len: usize, payload: &[u8], ack: &[u8]) -> Self {
        let command = std::format!("AT+CIPSEND={len}");
        self.reply(&command, &[])
            .raw(b"> ")
            .raw(&[payload, b"\r\n"].concat())
            .raw(b"SEND OK\r\n")
            .raw(ack)
    }

    pub fn channel(self) -> ScriptedChannel {
        ScriptedChannel {
            script: self.lines.into_iter().collect(),
            ..ScriptedChannel::default()
        }
    }
}
