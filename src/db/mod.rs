pub mod memstore;
pub mod pgstore;
pub mod store;

pub use memstore::MemDocStore;
pub use pgstore::PgDocStore;
pub use store::{DocStore, StoreError, StoredDocument};
