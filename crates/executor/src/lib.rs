pub mod environment;
pub mod process_runner;
pub mod system;

pub use environment::SystemFacts;
pub use process_runner::{CommandResult, ProcessRunner, DEFAULT_COMMAND_TIMEOUT};
pub use system::SystemCommands;
