//! IPC Client - Unix socket client for the CLI

use guestlog_core::{Error, Result};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::debug;

use crate::protocol::{Request, Response};
use crate::server::MAX_MESSAGE_SIZE;

pub struct IpcClient {
    socket_path: PathBuf,
}

impl IpcClient {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    pub fn is_daemon_running(&self) -> bool {
        self.socket_path.exists()
    }

    pub async fn connect(&self) -> Result<UnixStream> {
        if !self.socket_path.exists() {
            return Err(Error::DaemonNotRunning);
        }

        UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused => {
                    Error::DaemonNotRunning
                }
                _ => Error::IpcConnectionFailed(e.to_string()),
            })
    }

    /// Send a request and wait for its response
    pub async fn send(&self, request: &Request) -> Result<Response> {
        let mut stream = self.connect().await?;

        let mut json = serde_json::to_string(request)?;
        json.push('\n');

        stream
            .write_all(json.as_bytes())
            .await
            .map_err(|e| Error::ipc(format!("Write error: {}", e)))?;

        stream
            .flush()
            .await
            .map_err(|e| Error::ipc(format!("Flush error: {}", e)))?;

        debug!("Sent request: {:?}", request);

        let mut reader = BufReader::new(stream.take(MAX_MESSAGE_SIZE));
        let mut line = String::new();

        let read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| Error::ipc(format!("Read error: {}", e)))?;
        if read == 0 {
            return Err(Error::ipc("Daemon closed the connection without responding"));
        }

        let response: Response = serde_json::from_str(line.trim())
            .map_err(|e| Error::ipc(format!("Invalid response: {}", e)))?;

        debug!("Received response: {:?}", response);
        Ok(response)
    }

    /// Ping the daemon; `false` when it is not running
    pub async fn ping(&self) -> Result<bool> {
        match self.send(&Request::Ping).await {
            Ok(Response::Pong) => Ok(true),
            Ok(_) => Ok(false),
            Err(Error::DaemonNotRunning) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
