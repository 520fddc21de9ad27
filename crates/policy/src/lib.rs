pub mod apps;
pub mod classifier;
pub mod platform;

pub use apps::{launch_target, LogicalApp};
pub use classifier::CommandClassifier;
pub use platform::Platform;
