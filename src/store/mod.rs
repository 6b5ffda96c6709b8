pub mod store;

pub use store::InMemoryStore;
pub use store::Store;
pub use store::StoreError;
