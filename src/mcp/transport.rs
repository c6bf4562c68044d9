use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::config::ServerLaunch;

/// Line-oriented JSON-RPC transport. Implementations normalize the
/// difference between spawned subprocesses and in-memory streams so the
/// session layer (and its tests) never care which one they talk to.
#[async_trait]
pub trait McpTransport: Send {
    async fn send_line(&mut self, line: &str) -> io::Result<()>;

    /// Next line from the server, or `None` once the stream is closed.
    async fn recv_line(&mut self) -> io::Result<Option<String>>;

    async fn close(&mut self);
}

/// Transport over any async read/write pair.
pub struct StreamTransport<R, W> {
    lines: Lines<BufReader<R>>,
    writer: W,
}

impl<R, W> StreamTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }
}

#[async_trait]
impl<R, W> McpTransport for StreamTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    async fn recv_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next_line().await
    }

    async fn close(&mut self) {
        let _ = self.writer.shutdown().await;
    }
}

/// Transport over a spawned MCP server subprocess.
pub struct StdioTransport {
    child: Child,
    io: StreamTransport<ChildStdout, ChildStdin>,
}

impl StdioTransport {
    /// Spawns the server. A missing launch command surfaces as
    /// `io::ErrorKind::NotFound` so callers can skip the server with a
    /// warning instead of failing the whole run.
    pub fn spawn(launch: &ServerLaunch) -> io::Result<Self> {
        let mut child = Command::new(&launch.command)
            .args(&launch.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("child stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout not captured"))?;

        Ok(Self {
            child,
            io: StreamTransport::new(stdout, stdin),
        })
    }
}

#[async_trait]
impl McpTransport for StdioTransport {
    async fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.io.send_line(line).await
    }

    async fn recv_line(&mut self) -> io::Result<Option<String>> {
        self.io.recv_line().await
    }

    async fn close(&mut self) {
        self.io.close().await;
        let _ = self.child.kill().await;
    }
}
