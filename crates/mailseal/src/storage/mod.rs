pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

pub use memory::MemoryPreferenceStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqlitePreferenceStore;
pub use traits::PreferenceStore;
