pub mod client;
pub mod error;
pub mod memory;
pub mod store;
pub mod types;

pub use client::HttpStatusStore;
pub use error::SyncError;
pub use memory::MemoryStore;
pub use store::StatusStore;
pub use types::UpdateStatusRequest;
