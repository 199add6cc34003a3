pub mod memory;

#[cfg(feature = "mongodb")]
pub mod mongo;

pub use memory::MemoryStorage;

#[cfg(feature = "mongodb")]
pub use mongo::{MongoBlockingStorage, MongoStorage};
