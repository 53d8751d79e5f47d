pub mod files;
pub mod snapshot;
pub mod store;

pub use files::{atomic_write, ensure_data_dir, init_local_data_dir, read_file};
pub use snapshot::{PausedSnapshot, RecoveredSnapshot, RunningSnapshot, SnapshotManager};
pub use store::{FileStore, KeyValueStore};

#[cfg(test)]
pub use store::{FailingStore, MemoryStore};
