//! # Byte Channel Abstraction
//!
//! This module defines the `ByteChannel` trait, the line-oriented byte stream the
//! modem is reached through, and `UartChannel`, an implementation over any async
//! UART from the `embedded-io-async` ecosystem.
//!
//! The command layer depends only on this trait, so the same state machine runs
//! against real hardware and against scripted channels in tests.

use core::pin::pin;

use embassy_time::{Duration, Instant, Timer};
use embedded_io_async::{Read, ReadReady, Write};
use futures::future::{Either, select};
use heapless::Vec;

/// Capacity of the receive buffer kept by [`UartChannel`].
pub const RX_BUFFER_SIZE: usize = 256;

/// Upper bound on the bytes discarded by a single `flush_input` call, so a modem
/// that never stops talking cannot stall the caller.
const FLUSH_LIMIT: usize = 1024;

/// A line-oriented byte stream to the modem.
#[allow(async_fn_in_trait)]
pub trait ByteChannel {
    /// The error type returned by the channel.
    type Error: core::fmt::Debug;

    /// Writes all bytes to the channel.
    async fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    /// Reads one line, including its `\n` terminator, into `buf`.
    ///
    /// Blocks up to the channel's read timeout. Returns the number of bytes
    /// stored; `0` means nothing arrived before the timeout. When the timeout
    /// elapses mid-line, or `buf` fills up, the partial line is returned.
    async fn read_line(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Number of bytes received but not yet consumed.
    fn bytes_waiting(&mut self) -> usize;

    /// Discards everything received so far.
    async fn flush_input(&mut self) -> Result<(), Self::Error>;
}

/// `ByteChannel` implementation over an async UART.
pub struct UartChannel<U> {
    uart: U,
    timeout: Duration,
    pending: Vec<u8, RX_BUFFER_SIZE>,
}

impl<U> UartChannel<U>
where
    U: Read + Write + ReadReady,
{
    /// Creates a new `UartChannel` with the given UART and read timeout.
    pub fn new(uart: U, timeout: Duration) -> Self {
        Self {
            uart,
            timeout,
            pending: Vec::new(),
        }
    }

    /// Gives the UART back, dropping any buffered input.
    pub fn release(self) -> U {
        self.uart
    }

    /// Moves the first `n` pending bytes into `buf`.
    fn take(&mut self, buf: &mut [u8], n: usize) -> usize {
        let n = n.min(buf.len()).min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        let rest = self.pending.len() - n;
        self.pending.copy_within(n.., 0);
        self.pending.truncate(rest);
        n
    }
}

impl<U> ByteChannel for UartChannel<U>
where
    U: Read + Write + ReadReady,
{
    type Error = U::Error;

    async fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        trace!("UART TX ({} bytes)", buf.len());
        self.uart.write_all(buf).await?;
        self.uart.flush().await
    }

    async fn read_line(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let deadline = Instant::now() + self.timeout;
        let limit = buf.len().min(RX_BUFFER_SIZE);

        loop {
            if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
                return Ok(self.take(buf, pos + 1));
            }
            if self.pending.len() >= limit {
                return Ok(self.take(buf, limit));
            }

            let mut chunk = [0u8; 32];
            let room = (RX_BUFFER_SIZE - self.pending.len()).min(chunk.len());

            // Race the read against the line deadline.
            let outcome = match select(
                pin!(self.uart.read(&mut chunk[..room])),
                pin!(Timer::at(deadline)),
            )
            .await
            {
                Either::Left((result, _)) => Some(result),
                Either::Right(((), _)) => None,
            };

            match outcome {
                Some(Ok(0)) => {
                    let pending = self.pending.len();
                    return Ok(self.take(buf, pending));
                }
                Some(Ok(n)) => {
                    // `room` bounds `n`, so the buffer cannot overflow here.
                    let _ = self.pending.extend_from_slice(&chunk[..n]);
                }
                Some(Err(e)) => {
                    warn!("UART read error");
                    return Err(e);
                }
                None => {
                    trace!("UART read timeout with {} bytes pending", self.pending.len());
                    let pending = self.pending.len();
                    return Ok(self.take(buf, pending));
                }
            }
        }
    }

    fn bytes_waiting(&mut self) -> usize {
        let ready = self.uart.read_ready().unwrap_or(false);
        self.pending.len() + usize::from(ready)
    }

    async fn flush_input(&mut self) -> Result<(), Self::Error> {
        let mut discarded = self.pending.len();
        self.pending.clear();

        let mut scratch = [0u8; 32];
        while discarded < FLUSH_LIMIT && self.uart.read_ready()? {
            let n = self.uart.read(&mut scratch).await?;
            if n == 0 {
                break;
            }
            discarded += n;
        }

        if discarded > 0 {
            debug!("discarded {} stale bytes", discarded);
        }
        Ok(())
    }
}
