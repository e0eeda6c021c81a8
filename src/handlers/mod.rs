pub mod diagnostics;
pub mod doc_fetch;
pub mod doc_save;
pub mod health;

pub use diagnostics::*;
pub use doc_fetch::*;
pub use doc_save::*;
pub use health::*;
