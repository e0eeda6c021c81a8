pub mod client;
pub mod machine;

pub use client::{ClientError, ClientEvent, SyncClient};
pub use machine::{Action, Origin, SyncMachine, SyncStatus};
