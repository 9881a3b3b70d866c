//! Adapters over byte streams.
//!
//! A terminal, a serial line or a socket enters a
//! chain as a [`ReadChars`] source and leaves it
//! through a [`WriteText`] sink.

use crate::contract::{Outcome, PullFlow, Sink, Source};
use crate::error::{FlowError, Result};
use futures::lock::Mutex;
use std::fmt::Display;
use std::rc::Rc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Source reading one character at a time.
///
/// An empty read ends the stream. So does a failed
/// read, after reporting the failure.
pub struct ReadChars<R> {
    reader: Rc<Mutex<R>>,
}

impl<R> Clone for ReadChars<R> {
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
        }
    }
}

impl<R> ReadChars<R>
where
    R: AsyncRead + Unpin + 'static,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader: Rc::new(Mutex::new(reader)),
        }
    }

    async fn read_char(&self) -> Result<Option<char>> {
        let mut reader = self.reader.lock().await;
        let mut buf = [0u8; 4];
        if reader.read(&mut buf[..1]).await? == 0 {
            return Ok(None);
        }
        let len = match buf[0] {
            0x00..=0x7f => 1,
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            lead => {
                return Err(FlowError::Invalid(format!(
                    "unexpected leading byte {lead:#04x}"
                )));
            }
        };
        reader.read_exact(&mut buf[1..len]).await?;
        let text = std::str::from_utf8(&buf[..len])
            .map_err(|err| FlowError::Invalid(err.to_string()))?;
        Ok(text.chars().next())
    }
}

impl<R> Source for ReadChars<R>
where
    R: AsyncRead + Unpin + 'static,
{
    type Output = char;
    type Flow = PullFlow<Self>;

    async fn pull(&self) -> Outcome<char> {
        match self.read_char().await {
            Ok(c) => c.into(),
            Err(err) => {
                tracing::warn!(%err, "stream read failed");
                Outcome::End
            }
        }
    }

    fn iterate(&self) -> PullFlow<Self> {
        PullFlow::new(self.clone())
    }
}

/// Sink writing the text of every value.
///
/// Each value is flushed as soon as written.
pub struct WriteText<W> {
    writer: W,
}

impl<W> WriteText<W>
where
    W: AsyncWrite + Unpin + 'static,
{
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<T, W> Sink<T> for WriteText<W>
where
    T: Display + 'static,
    W: AsyncWrite + Unpin + 'static,
{
    async fn accept(&mut self, value: T) -> Result<()> {
        self.writer.write_all(value.to_string().as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
