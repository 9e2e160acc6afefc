//! Guestlog Logs - Guest log entries, the log registry, and container publishing

mod container;
mod entry;
mod registry;

pub use container::{ContainerClient, DirectoryContainer, Metafile};
pub use entry::GuestLog;
pub use registry::{Discovery, GuestLogRegistry};
