//! Opcodes da máquina
//!
//! Definição dos opcodes do conjunto de instruções Intcode.

use serde::{Deserialize, Serialize};

/// Opcodes Intcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// mem[out] = in1 + in2
    Add = 1,
    /// mem[out] = in1 * in2
    Multiply = 2,
    /// mem[out] = próximo input
    Input = 3,
    /// Emite in1
    Output = 4,
    /// Se in1 ≠ 0: ip = in2
    JumpIfTrue = 5,
    /// Se in1 = 0: ip = in2
    JumpIfFalse = 6,
    /// mem[out] = (in1 < in2) as i64
    LessThan = 7,
    /// mem[out] = (in1 == in2) as i64
    Equals = 8,
    /// rel_base += in1
    AdjustRelativeBase = 9,
    /// Termina com sucesso
    Halt = 99,
}

impl Opcode {
    /// Todos os opcodes, em ordem de código
    pub const ALL: [Opcode; 10] = [
        Self::Add,
        Self::Multiply,
        Self::Input,
        Self::Output,
        Self::JumpIfTrue,
        Self::JumpIfFalse,
        Self::LessThan,
        Self::Equals,
        Self::AdjustRelativeBase,
        Self::Halt,
    ];

    /// Converte código numérico em opcode
    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            1 => Self::Add,
            2 => Self::Multiply,
            3 => Self::Input,
            4 => Self::Output,
            5 => Self::JumpIfTrue,
            6 => Self::JumpIfFalse,
            7 => Self::LessThan,
            8 => Self::Equals,
            9 => Self::AdjustRelativeBase,
            99 => Self::Halt,
            _ => return None,
        })
    }

    /// Código numérico
    pub fn code(&self) -> i64 {
        *self as i64
    }

    /// Número de parâmetros
    pub fn arity(&self) -> usize {
        match self {
            Self::Add | Self::Multiply | Self::LessThan | Self::Equals => 3,
            Self::JumpIfTrue | Self::JumpIfFalse => 2,
            Self::Input | Self::Output | Self::AdjustRelativeBase => 1,
            Self::Halt => 0,
        }
    }

    /// Index of the parameter used as a write destination, if any.
    pub fn write_param(&self) -> Option<usize> {
        match self {
            Self::Add | Self::Multiply | Self::LessThan | Self::Equals => Some(2),
            Self::Input => Some(0),
            _ => None,
        }
    }

    /// Nome da instrução
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Multiply => "multiply",
            Self::Input => "input",
            Self::Output => "output",
            Self::JumpIfTrue => "jump-if-true",
            Self::JumpIfFalse => "jump-if-false",
            Self::LessThan => "less-than",
            Self::Equals => "equals",
            Self::AdjustRelativeBase => "adjust-relative-base",
            Self::Halt => "halt",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}
