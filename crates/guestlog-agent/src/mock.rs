//! Mock collaborators for testing

use async_trait::async_trait;
use guestlog_core::{Error, Result};
use guestlog_logs::{ContainerClient, GuestLog};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::driver::AppDriver;
use crate::status::StatusPoller;

/// Driver recording every toggle request
#[derive(Default)]
pub struct MockDriver {
    call_count: AtomicUsize,
    restart_required: bool,
    should_fail: bool,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A driver whose changes only apply after a restart
    pub fn restart_required() -> Self {
        Self {
            restart_required: true,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AppDriver for MockDriver {
    async fn guest_log_enable(&self, _log_name: &str, _enable: bool, _disable: bool) -> Result<bool> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(Error::driver("Mock failure"));
        }
        Ok(self.restart_required)
    }
}

#[derive(Default)]
pub struct MockStatus {
    call_count: AtomicUsize,
}

impl MockStatus {
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusPoller for MockStatus {
    async fn update(&self) -> Result<()> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// How [`MockContainer::publish`] responds
#[derive(Debug, Clone, Copy, Default)]
pub enum PublishMode {
    /// Accept every pending byte
    #[default]
    All,
    /// Accept this many bytes, then fail
    Partial(u64),
    /// Fail before accepting anything
    Fail,
}

/// Container recording publish and delete calls
#[derive(Default)]
pub struct MockContainer {
    publish_count: AtomicUsize,
    delete_count: AtomicUsize,
    mode: PublishMode,
}

impl MockContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: PublishMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn publish_count(&self) -> usize {
        self.publish_count.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContainerClient for MockContainer {
    fn container_name(&self) -> &str {
        "log_container"
    }

    async fn publish(&self, log: &GuestLog) -> Result<u64> {
        self.publish_count.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            PublishMode::All => Ok(log.pending()),
            PublishMode::Partial(sent) => Err(Error::PartialPublish {
                log: log.name().to_string(),
                sent,
                reason: "Mock failure".to_string(),
            }),
            PublishMode::Fail => Err(Error::container("Mock failure")),
        }
    }

    async fn delete_components(&self, _log: &GuestLog) -> Result<()> {
        self.delete_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
