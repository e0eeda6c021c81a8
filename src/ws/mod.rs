pub mod broadcast;
pub mod handler;
pub mod msg_edit_handler;
pub mod msg_join_handler;
pub mod msg_ping_handler;
pub mod registry;

pub use broadcast::ChangeBroadcaster;
pub use registry::RoomRegistry;
