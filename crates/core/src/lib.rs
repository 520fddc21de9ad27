pub mod assistant;
pub mod gateway;
pub mod metrics;
pub mod prompt;
pub mod types;

pub use assistant::Assistant;
pub use gateway::{AiGateway, CONFIGURATION_PROMPT};
pub use metrics::{Metrics, MetricsSnapshot};
pub use types::*;
