use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub struct Metrics {
    ai_queries: AtomicU64,
    ai_failures: AtomicU64,
    commands_executed: AtomicU64,
    command_failures: AtomicU64,
    command_timeouts: AtomicU64,
    speech_requests: AtomicU64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_ai_queries(&self) {
        self.ai_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_ai_failures(&self) {
        self.ai_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_commands_executed(&self) {
        self.commands_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_command_failures(&self) {
        self.command_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_command_timeouts(&self) {
        self.command_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_speech_requests(&self) {
        self.speech_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ai_queries: self.ai_queries.load(Ordering::Relaxed),
            ai_failures: self.ai_failures.load(Ordering::Relaxed),
            commands_executed: self.commands_executed.load(Ordering::Relaxed),
            command_failures: self.command_failures.load(Ordering::Relaxed),
            command_timeouts: self.command_timeouts.load(Ordering::Relaxed),
            speech_requests: self.speech_requests.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub ai_queries: u64,
    pub ai_failures: u64,
    pub commands_executed: u64,
    pub command_failures: u64,
    pub command_timeouts: u64,
    pub speech_requests: u64,
}

impl MetricsSnapshot {
    pub fn ai_success_rate(&self) -> f64 {
        if self.ai_queries == 0 {
            return 1.0;
        }
        1.0 - (self.ai_failures as f64 / self.ai_queries as f64)
    }

    pub fn command_success_rate(&self) -> f64 {
        if self.commands_executed == 0 {
            return 1.0;
        }
        1.0 - (self.command_failures as f64 / self.commands_executed as f64)
    }
}
