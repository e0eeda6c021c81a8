pub mod diagnostics;
pub mod document;
pub mod error;
pub mod health;
pub mod messages;

pub use diagnostics::*;
pub use document::*;
pub use error::*;
pub use health::*;
pub use messages::*;
