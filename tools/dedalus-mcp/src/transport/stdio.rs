//! stdio transport for JSON-RPC 2.0 over NDJSON
//!
//! Reads one message per line and writes one reply per line. Notifications
//! produce no output.

use crate::error::McpResult;
use crate::protocol::{IncomingMessage, OutgoingMessage};
use crate::server::McpServer;
use std::future::Future;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

/// Line-oriented transport over any async reader/writer pair
pub struct StdioTransport<R, W> {
    reader: R,
    writer: W,
}

impl StdioTransport<BufReader<io::Stdin>, io::Stdout> {
    /// Transport bound to the process stdin/stdout
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a transport over `reader`/`writer`
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read the next non-blank line as raw bytes, `None` on EOF
    ///
    /// Lines need not be valid UTF-8; the parser answers those with a parse
    /// error.
    pub async fn read_line(&mut self) -> McpResult<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if self.reader.read_until(b'\n', &mut buf).await? == 0 {
                return Ok(None);
            }
            let trimmed = buf.trim_ascii();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_vec()));
            }
        }
    }

    /// Write one line and flush
    pub async fn write_line(&mut self, line: &str) -> McpResult<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Serve `server` until EOF
    pub async fn run(&mut self, server: &mut McpServer) -> McpResult<()> {
        while let Some(line) = self.read_line().await? {
            debug!("📨 Received: {}", String::from_utf8_lossy(&line));

            let reply = match IncomingMessage::parse_slice(&line) {
                Ok(message) => server.handle_message(message).await,
                Err(parse_error) => {
                    error!("❌ Failed to parse JSON-RPC message");
                    Some(OutgoingMessage::Single(parse_error))
                }
            };

            if let Some(reply) = reply {
                let out = serde_json::to_string(&reply)?;
                self.write_line(&out).await?;
            }
        }

        info!("📪 EOF received, shutting down gracefully");
        Ok(())
    }
}

/// Run the stdio loop until EOF or `shutdown` resolves
///
/// The server is closed on either exit path.
pub async fn run_stdio<R, W, F>(
    mut transport: StdioTransport<R, W>,
    mut server: McpServer,
    shutdown: F,
) -> McpResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    info!("✅ Server ready on stdio, waiting for initialize request...");

    let result = tokio::select! {
        result = transport.run(&mut server) => result,
        _ = shutdown => Ok(()),
    };

    server.close();
    result
}
