//! Environment configuration loading from .env files
//!
//! Machine settings can be overridden from `.env` or the process environment.
//! Values that fail to parse fall back to the defaults.

use std::env;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Default memory size (2^16 cells)
pub const DEFAULT_MEMORY_SIZE: usize = 65536;

/// Consecutive empty polls before a network interface counts as idle
pub const DEFAULT_IDLE_POLLS: usize = 100;

// Automatically load .env when config module is accessed
static DOTENV_INIT: Lazy<()> = Lazy::new(|| {
    let _ = dotenv::dotenv();
});

/// Ensure environment is loaded
#[inline]
fn ensure_loaded() {
    let _ = &*DOTENV_INIT;
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    ensure_loaded();
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Load memory size from environment
/// Default: 65536 cells
pub fn memory_size() -> usize {
    parse_var("INTCODE_MEMORY_SIZE")
        .filter(|&size: &usize| size > 0)
        .unwrap_or(DEFAULT_MEMORY_SIZE)
}

/// Load per-instruction tracing switch from environment
/// Default: false
pub fn trace_enabled() -> bool {
    parse_var("INTCODE_TRACE").unwrap_or(false)
}

/// Load idle threshold for network interfaces from environment
/// Default: 100 polls
pub fn idle_polls() -> usize {
    parse_var("INTCODE_IDLE_POLLS").unwrap_or(DEFAULT_IDLE_POLLS)
}

/// Configuração da máquina
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Capacidade da memória (em células)
    pub memory_size: usize,
    /// Nome da thread quando executada em background
    pub thread_name: String,
    /// Loga cada instrução executada (nível trace)
    pub trace: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            thread_name: "intcode".to_string(),
            trace: false,
        }
    }
}

impl MachineConfig {
    /// Configuração a partir do ambiente (.env + variáveis)
    pub fn from_env() -> Self {
        Self {
            memory_size: memory_size(),
            trace: trace_enabled(),
            ..Self::default()
        }
    }

    /// Define a capacidade da memória
    pub fn with_memory_size(mut self, memory_size: usize) -> Self {
        self.memory_size = memory_size;
        self
    }

    /// Define o nome da thread
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Habilita trace por instrução
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MachineConfig::default();
        assert_eq!(config.memory_size, 65536);
        assert!(!config.trace);
    }

    #[test]
    fn test_builder() {
        let config = MachineConfig::default()
            .with_memory_size(128)
            .with_thread_name("amp-0")
            .with_trace(true);
        assert_eq!(config.memory_size, 128);
        assert_eq!(config.thread_name, "amp-0");
        assert!(config.trace);
    }

    #[test]
    fn test_env_defaults_are_sane() {
        assert!(memory_size() > 0);
        assert!(MachineConfig::from_env().memory_size > 0);
    }

    #[test]
    fn test_config_serde() {
        let config = MachineConfig::default().with_memory_size(4096);
        let json = serde_json::to_string(&config).unwrap();
        let back: MachineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
