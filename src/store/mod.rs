//! Blob stores for the persisted rate cache.

pub mod disk;
pub mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;
