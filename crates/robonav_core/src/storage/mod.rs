pub mod json_store;
pub mod prefs;

pub use json_store::{CollectionLoad, CollectionSource, DataStore};
pub use prefs::{FilePreferences, KeyValueStore, MemoryPreferences};
