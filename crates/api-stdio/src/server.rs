//! Stdio Server
//!
//! Reads newline-delimited requests and writes one response line per request,
//! flushed before the next line is read. End of input ends the loop.

use crate::handler::StdioHandler;
use crate::types::Response;
use eclips_core::port::MethodProvider;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

/// What one run of the loop handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    /// Non-blank lines answered
    pub requests: u64,
    /// Of those, answered with an error
    pub failures: u64,
}

/// Stdio Server
pub struct StdioServer {
    handler: StdioHandler,
}

impl StdioServer {
    pub fn new(provider: Arc<dyn MethodProvider>) -> Self {
        Self {
            handler: StdioHandler::new(provider),
        }
    }

    /// Serve the process's stdin/stdout until stdin closes
    pub async fn run_stdio(&self) -> io::Result<ServeSummary> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve any line-oriented reader/writer pair until the reader is exhausted
    ///
    /// # Errors
    /// - I/O errors on the underlying streams (request-level problems are
    ///   answered on the wire instead)
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> io::Result<ServeSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Bridge loop started");

        let mut summary = ServeSummary::default();
        let mut line = Vec::new();

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).await? == 0 {
                break;
            }

            if line.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }

            let response = self.handler.handle_line(&line);
            summary.requests += 1;
            if !response.is_success() {
                summary.failures += 1;
            }

            write_response(&mut writer, &response).await?;
            debug!(id = %response.id(), "Response written");
        }

        info!(
            requests = summary.requests,
            failures = summary.failures,
            "Input closed, bridge loop finished"
        );
        Ok(summary)
    }
}

async fn write_response<W>(writer: &mut W, response: &Response) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut payload = serde_json::to_vec(response)?;
    payload.push(b'\n');
    writer.write_all(&payload).await?;
    writer.flush().await
}
