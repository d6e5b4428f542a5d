//! # Command/Response Primitive
//!
//! The modem answers every AT command with a fixed, ordered sequence of lines.
//! [`CommandChannel::execute`] writes one command and checks each reply line
//! against a table of [`Token`]s, so every higher layer states what it expects
//! instead of parsing free-form text.

use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use crate::channel::ByteChannel;
use crate::error::ChannelError;
use crate::fmt::printable;

/// Longest reply line the command layer keeps.
pub const MAX_LINE_LEN: usize = 128;

/// One reply line, terminator included.
pub type Line = Vec<u8, MAX_LINE_LEN>;

/// Expected content of a single reply line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// The modem's echo of the command: the command with its final `\n`
    /// replaced by `\r\n`.
    Echo,
    /// The line must equal these bytes exactly.
    Literal(&'a [u8]),
    /// Any line matches.
    Wildcard,
    /// Any line matches and is returned to the caller.
    Capture,
}

/// Checks whether `line` is the modem's echo of `command`.
fn is_echo(command: &[u8], line: &[u8]) -> bool {
    let body = command.strip_suffix(b"\n").unwrap_or(command);
    line.len() == body.len() + 2 && line.starts_with(body) && line.ends_with(b"\r\n")
}

/// Request/expected-reply primitive over a [`ByteChannel`].
pub struct CommandChannel<C, D> {
    channel: C,
    delay: D,
}

impl<C, D> CommandChannel<C, D>
where
    C: ByteChannel,
    D: DelayNs,
{
    pub fn new(channel: C, delay: D) -> Self {
        Self { channel, delay }
    }

    /// The byte channel and delay source.
    pub fn parts(&self) -> (&C, &D) {
        (&self.channel, &self.delay)
    }

    /// Gives the byte channel and delay source back.
    pub fn release(self) -> (C, D) {
        (self.channel, self.delay)
    }

    /// Executes one command and validates its reply.
    ///
    /// Stale input is drained first. After writing `command` and waiting
    /// `settle`, exactly one line is read per token. All lines are consumed
    /// even after a mismatch so the next command starts aligned. Returns the
    /// line matched by the last [`Token::Capture`], if any.
    pub async fn execute(
        &mut self,
        command: &[u8],
        expected: &[Token<'_>],
        settle: Duration,
    ) -> Result<Option<Line>, ChannelError<C::Error>> {
        if self.channel.bytes_waiting() > 0 {
            trace!("draining stale input before command");
        }
        self.channel.flush_input().await.map_err(ChannelError::Io)?;

        debug!("AT > {}", printable(command).trim_end());
        self.channel.write(command).await.map_err(ChannelError::Io)?;

        if settle.as_ticks() > 0 {
            self.delay(settle).await;
        }

        let mut matched = true;
        let mut captured = None;
        for token in expected {
            let line = self.read_line().await?;
            if line.is_empty() {
                warn!("AT timeout waiting for reply to {}", printable(command).trim_end());
                return Err(ChannelError::Timeout);
            }
            if line.len() == MAX_LINE_LEN && !line.ends_with(b"\n") {
                return Err(ChannelError::Overflow);
            }
            trace!("AT < {}", printable(&line).trim_end());

            let ok = match token {
                Token::Echo => is_echo(command, &line),
                Token::Literal(literal) => line.as_slice() == *literal,
                Token::Wildcard => true,
                Token::Capture => {
                    captured = Some(line.clone());
                    true
                }
            };
            if !ok && matched {
                warn!(
                    "AT reply mismatch for {}: {}",
                    printable(command).trim_end(),
                    printable(&line).trim_end()
                );
            }
            matched &= ok;
        }

        if matched {
            Ok(captured)
        } else {
            Err(ChannelError::Mismatch)
        }
    }

    /// Writes bytes without expecting a reply.
    pub async fn write_raw(&mut self, bytes: &[u8]) -> Result<(), ChannelError<C::Error>> {
        self.channel.write(bytes).await.map_err(ChannelError::Io)
    }

    /// Reads one line; an empty line means the read timed out.
    pub async fn read_line(&mut self) -> Result<Line, ChannelError<C::Error>> {
        let mut buf = [0u8; MAX_LINE_LEN];
        let n = self.channel.read_line(&mut buf).await.map_err(ChannelError::Io)?;
        let mut line = Line::new();
        // `n` never exceeds the buffer, which has the line's capacity.
        let _ = line.extend_from_slice(&buf[..n]);
        Ok(line)
    }

    /// Suspends for `duration`.
    pub async fn delay(&mut self, duration: Duration) {
        let ms = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        self.delay.delay_ms(ms).await;
    }
}
