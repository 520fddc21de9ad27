use genx_policy::Platform;
use serde::{Deserialize, Serialize};
use std::env;
use sysinfo::System;

const GIB: u64 = 1024 * 1024 * 1024;

/// Local facts embedded in the model prompt and shown by `sysinfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemFacts {
    pub platform: Platform,
    pub arch: String,
    pub cpu_cores: usize,
    pub total_memory_bytes: u64,
    pub free_memory_bytes: u64,
    pub uptime_seconds: u64,
    pub hostname: String,
    pub username: String,
    pub home_dir: String,
    pub temp_dir: String,
}

impl SystemFacts {
    /// Blocking: takes a full `sysinfo` snapshot.
    pub fn gather() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            platform: Platform::current(),
            arch: env::consts::ARCH.to_string(),
            cpu_cores: sys.cpus().len(),
            total_memory_bytes: sys.total_memory(),
            free_memory_bytes: sys.free_memory(),
            uptime_seconds: System::uptime(),
            hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            username: current_username(),
            home_dir: dirs::home_dir()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default(),
            temp_dir: env::temp_dir().to_string_lossy().to_string(),
        }
    }

    pub async fn gather_async() -> Self {
        tokio::task::spawn_blocking(Self::gather)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("System facts collection failed: {}", e);
                Self::fallback()
            })
    }

    fn fallback() -> Self {
        Self {
            platform: Platform::current(),
            arch: env::consts::ARCH.to_string(),
            cpu_cores: 0,
            total_memory_bytes: 0,
            free_memory_bytes: 0,
            uptime_seconds: 0,
            hostname: "unknown".to_string(),
            username: current_username(),
            home_dir: String::new(),
            temp_dir: env::temp_dir().to_string_lossy().to_string(),
        }
    }

    pub fn used_memory_bytes(&self) -> u64 {
        self.total_memory_bytes.saturating_sub(self.free_memory_bytes)
    }

    /// Total memory in whole GiB, rounded to nearest.
    pub fn total_memory_gb(&self) -> u64 {
        (self.total_memory_bytes + GIB / 2) / GIB
    }

    pub fn to_concise_string(&self) -> String {
        format!(
            "Platform: {} ({})\nHost: {}\nUser: {}\nCPU cores: {}\nMemory: {}/{} MB used\nUptime: {}s",
            self.platform,
            self.arch,
            self.hostname,
            self.username,
            self.cpu_cores,
            self.used_memory_bytes() / 1024 / 1024,
            self.total_memory_bytes / 1024 / 1024,
            self.uptime_seconds
        )
    }
}

fn current_username() -> String {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "user".to_string())
}
