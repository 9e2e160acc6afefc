//! Main daemon orchestration

use guestlog_agent::GuestLogManager;
use guestlog_core::Result;
use guestlog_ipc::{IpcServer, Request, Response};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::handlers::RequestHandler;

pub struct Daemon {
    server: IpcServer,
    handler: Arc<RwLock<RequestHandler>>,
}

impl Daemon {
    pub async fn new(manager: GuestLogManager, socket_path: &Path) -> Result<Self> {
        let server = IpcServer::bind(socket_path).await?;

        Ok(Self {
            server,
            handler: Arc::new(RwLock::new(RequestHandler::new(manager))),
        })
    }

    /// Accept connections forever, one task per connection
    pub async fn run(&self) -> Result<()> {
        info!("Daemon running, waiting for connections...");

        loop {
            match self.server.accept().await {
                Ok(mut conn) => {
                    let handler = Arc::clone(&self.handler);

                    tokio::spawn(async move {
                        loop {
                            match conn.read_request().await {
                                Ok(Some(request)) => {
                                    let response = Self::handle_request(&handler, request).await;

                                    if let Err(e) = conn.send_response(&response).await {
                                        error!("Failed to send response: {}", e);
                                        break;
                                    }
                                }
                                Ok(None) => {
                                    debug!("Connection closed");
                                    break;
                                }
                                Err(e) => {
                                    error!("Error reading request: {}", e);
                                    break;
                                }
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    /// Requests run one at a time under the handler's write lock
    async fn handle_request(handler: &Arc<RwLock<RequestHandler>>, request: Request) -> Response {
        let mut h = handler.write().await;

        match request {
            Request::Ping => Response::Pong,
            Request::UpdateStatus => h.update_status().await,
            Request::GuestLogList => h.guest_log_list().await,
            Request::GuestLogAction {
                name,
                enable,
                disable,
                publish,
                discard,
            } => {
                h.guest_log_action(&name, enable, disable, publish, discard)
                    .await
            }
            Request::BuildLogFileName {
                log_name,
                owner,
                datastore_dir,
            } => h.build_log_file_name(&log_name, &owner, datastore_dir.as_deref()),
            Request::ValidateLogFile { file_name, owner } => {
                h.validate_log_file(&file_name, &owner)
            }
        }
    }
}
