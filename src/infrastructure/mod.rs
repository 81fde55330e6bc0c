//! 基础设施层（Infrastructure）
//!
//! 持有存储资源，只暴露读写能力。

pub mod gateway;
pub mod memory;
pub mod sqlite;

pub use gateway::{Deletion, StorageGateway};
pub use memory::MemoryGateway;
pub use sqlite::SqliteGateway;
