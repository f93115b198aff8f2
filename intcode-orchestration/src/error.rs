//! Erros de orquestração

use intcode_core::IntcodeError;
use thiserror::Error;

pub type OrchestrationResult<T> = Result<T, OrchestrationError>;

/// Erros de orquestração
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrchestrationError {
    /// Erro de uma máquina
    #[error("Machine error: {0}")]
    Machine(#[from] IntcodeError),

    /// Pipeline inválido
    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(String),

    /// Pacote para endereço sem NIC nem NAT
    #[error("Unknown address: {0}")]
    UnknownAddress(i64),

    /// Timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrchestrationError::UnknownAddress(77);
        assert!(err.to_string().contains("77"));
    }

    #[test]
    fn test_machine_error_conversion() {
        let err: OrchestrationError = IntcodeError::Cancelled.into();
        assert!(err.to_string().contains("Machine error"));
        assert_eq!(err, OrchestrationError::Machine(IntcodeError::Cancelled));
    }
}
