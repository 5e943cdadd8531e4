pub mod catalog;
pub mod errors;
pub mod ids;
pub mod markers;
pub mod recommend;
pub mod searches;
pub mod session;
pub mod store;

// Re-exports
pub use errors::StoreError;
pub use store::{Document, DocumentStore, LiveQuery};
