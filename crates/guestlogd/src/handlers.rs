//! IPC request handlers

use guestlog_agent::GuestLogManager;
use guestlog_core::{Error, ErrorKind};
use guestlog_ipc::Response;
use std::path::Path;
use tracing::{error, info, warn};

/// Request handler for IPC commands
pub struct RequestHandler {
    manager: GuestLogManager,
}

/// Map a failed operation to an error response, logging it by severity
fn failure(operation: &str, e: Error) -> Response {
    match e.kind() {
        ErrorKind::CollaboratorFailure | ErrorKind::Config => {
            error!("{} failed: {}", operation, e)
        }
        _ => warn!("{} rejected: {}", operation, e),
    }
    Response::from(&e)
}

impl RequestHandler {
    pub fn new(manager: GuestLogManager) -> Self {
        Self { manager }
    }

    pub async fn update_status(&mut self) -> Response {
        match self.manager.update_status().await {
            Ok(()) => Response::ok("Datastore status updated"),
            Err(e) => failure("Status update", e),
        }
    }

    pub async fn guest_log_list(&mut self) -> Response {
        match self.manager.guest_log_list().await {
            Ok(logs) => Response::LogList { logs },
            Err(e) => failure("Listing guest logs", e),
        }
    }

    pub async fn guest_log_action(
        &mut self,
        name: &str,
        enable: bool,
        disable: bool,
        publish: bool,
        discard: bool,
    ) -> Response {
        info!("Handling guest log action for: {}", name);

        match self
            .manager
            .guest_log_action(name, enable, disable, publish, discard)
            .await
        {
            Ok(details) => Response::LogDetails { details },
            Err(e) => failure("Guest log action", e),
        }
    }

    pub fn build_log_file_name(
        &self,
        log_name: &str,
        owner: &str,
        datastore_dir: Option<&Path>,
    ) -> Response {
        match self.manager.build_log_file_name(log_name, owner, datastore_dir) {
            Ok(path) => Response::LogFile { path },
            Err(e) => failure("Building log file name", e),
        }
    }

    pub fn validate_log_file(&self, file: &Path, owner: &str) -> Response {
        match self.manager.validate_log_file(file, owner) {
            Ok(path) => Response::LogFile { path },
            Err(e) => failure("Validating log file", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guestlog_core::{AgentConfig, ConfigFormat, LogStatus};
    use std::io::Write;
    use tempfile::TempDir;

    fn handler(dir: &TempDir) -> RequestHandler {
        let owner = guestlog_fs::current_user().unwrap();
        let content = format!(
            r#"
manager = "mysql"
instance_id = "6e4f1c2a"
base_dir = "{base}"
container_root = "{containers}"
segment_size = 4
guest_log_owner = "{owner}"

[[logs]]
name = "general"
type = "user"
owner = "{owner}"
enable_command = "true"
disable_command = "true"

[[logs]]
name = "slow_query"
type = "user"
owner = "{owner}"
enable_command = "true"
restart_required = true
"#,
            base = dir.path().join("trove").display(),
            containers = dir.path().join("containers").display(),
            owner = owner,
        );
        let config = AgentConfig::parse(&content, ConfigFormat::Toml).unwrap();
        RequestHandler::new(GuestLogManager::from_config(&config).unwrap())
    }

    fn details(response: Response) -> guestlog_core::LogDetails {
        match response {
            Response::LogDetails { details } => details,
            other => panic!("unexpected response: {:?}", other),
        }
    }

    fn error_kind(response: Response) -> ErrorKind {
        match response {
            Response::Error { kind, .. } => kind,
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list() {
        let dir = TempDir::new().unwrap();
        let mut h = handler(&dir);

        match h.guest_log_list().await {
            Response::LogList { logs } => {
                let names: Vec<&str> = logs.iter().map(|l| l.name.as_str()).collect();
                assert_eq!(names, vec!["general", "guest", "slow_query"]);
                assert_eq!(logs[0].status, LogStatus::Disabled);
                assert_eq!(logs[1].status, LogStatus::Enabled);
                assert_eq!(logs[1].prefix, "6e4f1c2a/mysql-guest");
                assert_eq!(logs[1].container, "n/a");
            }
            other => panic!("unexpected response: {:?}", other),
        }
        assert!(dir.path().join("trove/datastore/mysql-general.log").is_file());
    }

    #[tokio::test]
    async fn test_publish_and_discard_guest_log() {
        let dir = TempDir::new().unwrap();
        let mut h = handler(&dir);
        h.guest_log_list().await;

        let path = dir.path().join("trove/datastore/mysql-guest.log");
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"agent started\n").unwrap();

        let published = details(h.guest_log_action("guest", false, false, true, false).await);
        assert_eq!(published.status, LogStatus::Published);
        assert_eq!(published.published, 14);
        assert_eq!(published.pending, 0);
        assert_eq!(published.container, "database_logs");
        assert!(dir
            .path()
            .join("containers/database_logs/6e4f1c2a/mysql-guest_metafile")
            .is_file());

        let discarded = details(h.guest_log_action("guest", false, false, false, true).await);
        assert_eq!(discarded.status, LogStatus::Enabled);
        assert_eq!(discarded.published, 0);
        assert!(!dir
            .path()
            .join("containers/database_logs/6e4f1c2a/mysql-guest")
            .exists());
    }

    #[tokio::test]
    async fn test_enable_user_logs() {
        let dir = TempDir::new().unwrap();
        let mut h = handler(&dir);

        let general = details(h.guest_log_action("general", true, false, false, false).await);
        assert_eq!(general.status, LogStatus::Enabled);

        let slow = details(h.guest_log_action("slow_query", true, false, false, false).await);
        assert_eq!(slow.status, LogStatus::RestartRequired);

        // No disable command configured
        let response = h.guest_log_action("slow_query", false, true, false, false).await;
        assert_eq!(error_kind(response), ErrorKind::CollaboratorFailure);
    }

    #[tokio::test]
    async fn test_rejected_actions() {
        let dir = TempDir::new().unwrap();
        let mut h = handler(&dir);

        let response = h.guest_log_action("guest", true, false, false, false).await;
        assert_eq!(error_kind(response), ErrorKind::BadRequest);

        let response = h.guest_log_action("general", true, true, false, false).await;
        assert_eq!(error_kind(response), ErrorKind::BadRequest);

        let response = h.guest_log_action("audit", false, false, true, false).await;
        assert_eq!(error_kind(response), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_status() {
        let dir = TempDir::new().unwrap();
        let mut h = handler(&dir);
        assert!(matches!(h.update_status().await, Response::Ok { .. }));
    }

    #[test]
    fn test_log_file_requests() {
        let dir = TempDir::new().unwrap();
        let h = handler(&dir);
        let owner = guestlog_fs::current_user().unwrap();

        match h.build_log_file_name("audit", &owner, Some(dir.path())) {
            Response::LogFile { path } => assert_eq!(path, dir.path().join("mysql-audit.log")),
            other => panic!("unexpected response: {:?}", other),
        }

        let file = dir.path().join("custom.log");
        match h.validate_log_file(&file, &owner) {
            Response::LogFile { path } => assert!(path.is_file()),
            other => panic!("unexpected response: {:?}", other),
        }

        let response = h.validate_log_file(Path::new("relative.log"), &owner);
        assert_eq!(error_kind(response), ErrorKind::BadRequest);
    }
}
