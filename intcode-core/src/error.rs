//! Erros da máquina Intcode

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tipo de resultado da máquina
pub type IntcodeResult<T> = Result<T, IntcodeError>;

/// Motivo de um endereço inválido
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressFault {
    /// Endereço negativo
    Negative,
    /// Endereço além da capacidade da memória
    OutOfRange,
}

impl std::fmt::Display for AddressFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Negative => write!(f, "negative"),
            Self::OutOfRange => write!(f, "out of range"),
        }
    }
}

/// Erros da máquina Intcode
///
/// Everything except [`IntcodeError::NoDataAvailable`] stops the run loop
/// of the instance that raised it.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntcodeError {
    /// Opcode sem instrução definida
    #[error("Invalid opcode {code} at ip {ip}")]
    InvalidOpCode { code: i64, ip: usize },

    /// Dígito de modo fora de {0,1,2}, ou modo imediato como destino
    #[error("Invalid memory mode {mode} in instruction {instruction} (operand {operand})")]
    InvalidMemoryMode {
        mode: i64,
        instruction: i64,
        operand: i64,
    },

    /// Endereço negativo ou fora da memória
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { reason: AddressFault, address: i64 },

    /// Leitura sem bloqueio (ou com timeout) sem dados
    #[error("No data available")]
    NoDataAvailable,

    /// Base relativa ficaria negativa
    #[error("Relative base underflow: {0}")]
    RelativeBaseUnderflow(i64),

    /// Overflow aritmético em add/multiply ou no cálculo de endereço
    #[error("Arithmetic overflow in {operation}: {lhs} and {rhs}")]
    ArithmeticOverflow {
        operation: String,
        lhs: i64,
        rhs: i64,
    },

    /// Programa maior que a memória
    #[error("Program of {len} cells does not fit in memory of {capacity} cells")]
    ProgramTooLarge { len: usize, capacity: usize },

    /// Texto de programa vazio
    #[error("Empty program")]
    EmptyProgram,

    /// Token inválido no texto do programa
    #[error("Invalid integer {token:?} at position {position}")]
    Parse { position: usize, token: String },

    /// Provedor de input esgotado
    #[error("Input exhausted")]
    InputExhausted,

    /// Canal cheio em envio sem bloqueio (ou com timeout)
    #[error("Channel full")]
    ChannelFull,

    /// Consumidor de output não aceita mais valores
    #[error("Output closed")]
    OutputClosed,

    /// Máquina já parou (halt ou falha) e não pode ser reutilizada
    #[error("Machine already finished")]
    MachineFinished,

    /// Máquina parou e a fila de saída está vazia
    #[error("Machine stopped with no pending output")]
    MachineStopped,

    /// Execução cancelada externamente
    #[error("Execution cancelled")]
    Cancelled,

    /// Thread da máquina entrou em pânico
    #[error("Machine thread panicked: {0}")]
    ThreadPanicked(String),

    /// Erro de I/O ao carregar programa
    #[error("I/O error: {0}")]
    Io(String),
}

impl IntcodeError {
    /// `false` only for conditions the caller may simply retry.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::NoDataAvailable)
    }

    pub(crate) fn overflow(operation: &str, lhs: i64, rhs: i64) -> Self {
        Self::ArithmeticOverflow {
            operation: operation.to_string(),
            lhs,
            rhs,
        }
    }
}

impl From<std::io::Error> for IntcodeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IntcodeError::InvalidOpCode { code: 42, ip: 7 };
        assert!(err.to_string().contains("42"));

        let err = IntcodeError::InvalidAddress {
            reason: AddressFault::Negative,
            address: -3,
        };
        assert!(err.to_string().contains("negative"));

        let err = IntcodeError::InvalidAddress {
            reason: AddressFault::OutOfRange,
            address: 70000,
        };
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_no_data_is_not_fatal() {
        assert!(!IntcodeError::NoDataAvailable.is_fatal());
        assert!(IntcodeError::RelativeBaseUnderflow(-1).is_fatal());
        assert!(IntcodeError::Cancelled.is_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: IntcodeError = io.into();
        assert!(matches!(err, IntcodeError::Io(msg) if msg.contains("missing")));
    }
}
