//! JSON-RPC message framing for the MCP stdio transport.
//!
//! Supports two framing modes:
//!
//! - **Content-Length**: `Content-Length: N\r\n\r\n<N bytes>`
//! - **Newline-delimited**: one JSON object per `\n`-terminated line
//!
//! [`MessageReader`] auto-detects the mode per message and remembers the last
//! one seen, so replies can be written back the way the client framed its
//! requests.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Largest Content-Length body accepted (16 MiB).
pub const MAX_MESSAGE_LEN: usize = 16 * 1024 * 1024;

/// How a message was (or should be) framed on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Framing {
    #[default]
    NewlineDelimited,
    ContentLength,
}

/// Reads MCP messages from an async reader, auto-detecting Content-Length vs
/// newline framing.
pub struct MessageReader<R> {
    reader: BufReader<R>,
    buf: String,
    framing: Framing,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buf: String::new(),
            framing: Framing::default(),
        }
    }

    /// Framing of the most recently read message.
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Read the next JSON-RPC message, returning `None` on EOF.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading fails, or if a Content-Length header
    /// is malformed or above [`MAX_MESSAGE_LEN`].
    pub async fn next_message(&mut self) -> io::Result<Option<String>> {
        loop {
            self.buf.clear();
            let n = self.reader.read_line(&mut self.buf).await?;
            if n == 0 {
                return Ok(None);
            }

            let trimmed = self.buf.trim();
            if trimmed.is_empty() {
                continue;
            }

            let Some(rest) = strip_prefix_ignore_case(trimmed, "Content-Length:") else {
                self.framing = Framing::NewlineDelimited;
                return Ok(Some(trimmed.to_string()));
            };

            let len: usize = rest
                .trim()
                .parse()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            if len > MAX_MESSAGE_LEN {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Content-Length {len} exceeds limit of {MAX_MESSAGE_LEN} bytes"),
                ));
            }

            // Skip remaining headers up to the blank separator line.
            loop {
                self.buf.clear();
                if self.reader.read_line(&mut self.buf).await? == 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "EOF in Content-Length headers",
                    ));
                }
                if self.buf.trim().is_empty() {
                    break;
                }
            }

            let mut body = vec![0u8; len];
            self.reader.read_exact(&mut body).await?;
            let msg = String::from_utf8(body)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            self.framing = Framing::ContentLength;
            return Ok(Some(msg));
        }
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &line[prefix.len()..])
}

/// Write one JSON message using `framing`, then flush.
///
/// For newline framing the `json` string must not contain embedded newlines
/// (compact `serde_json` output never does).
///
/// # Errors
///
/// Returns an I/O error if writing or flushing fails.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    json: &str,
    framing: Framing,
) -> io::Result<()> {
    match framing {
        Framing::NewlineDelimited => {
            writer.write_all(json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
        Framing::ContentLength => {
            let header = format!("Content-Length: {}\r\n\r\n", json.len());
            writer.write_all(header.as_bytes()).await?;
            writer.write_all(json.as_bytes()).await?;
        }
    }
    writer.flush().await
}
