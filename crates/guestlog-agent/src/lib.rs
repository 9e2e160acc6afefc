//! Guestlog Agent - Validates and executes guest log actions against the
//! datastore driver, the status poller, and the log container

mod discovery;
mod driver;
mod manager;
#[cfg(test)]
mod mock;
mod status;

pub use discovery::ConfigDiscovery;
pub use driver::{AppDriver, CommandDriver, LogCommands};
pub use manager::GuestLogManager;
pub use status::{CommandStatus, ServiceStatus, StatusPoller};
