//! Token store adapters

pub mod file_store;
pub mod memory;

pub use file_store::FileTokenStore;
pub use memory::MemoryTokenStore;
