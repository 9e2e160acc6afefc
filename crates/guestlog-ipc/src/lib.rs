//! Guestlog IPC - Newline-delimited JSON over a Unix socket

pub mod client;
pub mod protocol;
pub mod server;

pub use client::IpcClient;
pub use protocol::{Request, Response};
pub use server::{IpcConnection, IpcServer};
