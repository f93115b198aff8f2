//! Estado da máquina
//!
//! Registradores, resultado de um passo e status de execução.

use serde::{Deserialize, Serialize};

use crate::error::IntcodeError;

/// Registradores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// Instruction pointer
    pub ip: usize,
    /// Base relativa (sempre >= 0)
    pub relative_base: i64,
}

/// Resultado de um passo de execução
///
/// Faults travel as `Err(IntcodeError)` next to this, so a step is one of
/// continue, halted or faulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Instrução executada, há próxima
    Continue,
    /// Instrução halt executada
    Halted,
}

/// Status de uma máquina
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineStatus {
    /// Pronta para executar
    Ready,
    /// Executando
    Running,
    /// Terminou via halt
    Halted,
    /// Parou por falha
    Faulted(IntcodeError),
    /// Cancelada externamente
    Cancelled,
}

impl MachineStatus {
    /// Loop de execução terminou (por qualquer motivo)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Halted | Self::Faulted(_) | Self::Cancelled)
    }

    /// Falha, se houver
    pub fn fault(&self) -> Option<&IntcodeError> {
        match self {
            Self::Faulted(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Running => write!(f, "running"),
            Self::Halted => write!(f, "halted"),
            Self::Faulted(err) => write!(f, "faulted: {}", err),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Resumo de uma execução completa
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Instruções executadas
    pub steps: u64,
    /// Registradores finais
    pub registers: Registers,
}
