//! Agent side of the socket: one JSON request line in, one response line out

use guestlog_core::{Error, Result};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info, warn};

use crate::protocol::{Request, Response};

/// Largest request or response line, in bytes
pub(crate) const MAX_MESSAGE_SIZE: u64 = 10 * 1024 * 1024;

const SOCKET_MODE: u32 = 0o600;

fn ipc_failure(context: &'static str) -> impl FnOnce(std::io::Error) -> Error {
    move |e| Error::ipc(format!("{}: {}", context, e))
}

pub struct IpcServer {
    socket_path: PathBuf,
    listener: UnixListener,
}

impl IpcServer {
    /// Listen on `socket_path`, taking over a leftover socket file
    pub async fn bind(socket_path: &Path) -> Result<Self> {
        match std::fs::remove_file(socket_path) {
            Ok(()) => debug!("Removed leftover socket {}", socket_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(socket_path).map_err(ipc_failure("Failed to bind socket"))?;
        std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(SOCKET_MODE))
            .map_err(ipc_failure("Failed to restrict socket"))?;

        info!("Guest agent listening on {}", socket_path.display());
        Ok(Self {
            socket_path: socket_path.to_path_buf(),
            listener,
        })
    }

    pub async fn accept(&self) -> Result<IpcConnection> {
        let (stream, _) = self.listener.accept().await.map_err(ipc_failure("Accept failed"))?;
        Ok(IpcConnection::new(stream))
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.socket_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove socket {}: {}", self.socket_path.display(), e);
            }
        }
    }
}

/// A connected CLI client
pub struct IpcConnection {
    stream: UnixStream,
}

impl IpcConnection {
    pub fn new(stream: UnixStream) -> Self {
        Self { stream }
    }

    /// Next request from the client; `None` once it hung up
    pub async fn read_request(&mut self) -> Result<Option<Request>> {
        let mut reader = BufReader::new((&mut self.stream).take(MAX_MESSAGE_SIZE));
        let mut line = String::new();

        let read = reader
            .read_line(&mut line)
            .await
            .map_err(ipc_failure("Read error"))?;
        if read == 0 {
            return Ok(None);
        }
        if !line.ends_with('\n') && read as u64 >= MAX_MESSAGE_SIZE {
            return Err(Error::ipc(format!(
                "Request exceeds {} bytes",
                MAX_MESSAGE_SIZE
            )));
        }

        let request: Request = serde_json::from_str(line.trim())
            .map_err(|e| Error::ipc(format!("Invalid request: {}", e)))?;
        debug!("Request: {:?}", request);
        Ok(Some(request))
    }

    pub async fn send_response(&mut self, response: &Response) -> Result<()> {
        let mut line = serde_json::to_vec(response)?;
        line.push(b'\n');

        self.stream
            .write_all(&line)
            .await
            .map_err(ipc_failure("Write error"))?;
        self.stream.flush().await.map_err(ipc_failure("Flush error"))?;
        Ok(())
    }
}
