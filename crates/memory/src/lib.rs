pub mod config_store;
pub mod history;
pub mod types;

pub use config_store::{ConfigStore, MemoryError};
pub use history::{CommandHistory, DEFAULT_HISTORY_CAPACITY};
pub use types::*;
