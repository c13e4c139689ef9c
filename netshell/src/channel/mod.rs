//! Channel layer: the interactive shell seam and prompt matching.
//!
//! A [`ShellChannel`] is one open interactive shell on a device. The session
//! engine only ever reads bounded chunks from it, writes lines to it and
//! closes it; everything else (SSH, PTY allocation, authentication) belongs
//! to the transport that produced it.

mod buffer;
#[cfg(test)]
pub(crate) mod mock;
mod patterns;

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;

use crate::error::ChannelError;

pub use buffer::PatternBuffer;
pub use patterns::{PromptMatcher, strip_ansi};

/// An open interactive shell on a device.
pub trait ShellChannel: Send {
    /// Wait at most `wait` for the next chunk of output.
    ///
    /// Returns `Ok(None)` when nothing arrived in time and
    /// `Err(ChannelError::Closed)` once the remote side is gone.
    fn read_chunk(
        &mut self,
        wait: Duration,
    ) -> impl Future<Output = Result<Option<Bytes>, ChannelError>> + Send;

    /// Write raw bytes to the shell.
    fn write_all(&mut self, data: &[u8]) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Close the shell. Calling this more than once is a no-op.
    fn close(&mut self) -> impl Future<Output = Result<(), ChannelError>> + Send;
}
