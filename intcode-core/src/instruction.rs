//! Instruções da máquina
//!
//! Decodificação da palavra de instrução em opcode + modos de endereçamento,
//! e resolução de parâmetros.

use serde::{Deserialize, Serialize};

use crate::error::{IntcodeError, IntcodeResult};
use crate::memory::Memory;
use crate::opcode::Opcode;

/// Número máximo de parâmetros de uma instrução
pub const MAX_PARAMS: usize = 3;

/// Modo de endereçamento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Mode {
    /// Operando é um endereço
    Position = 0,
    /// Operando é o próprio valor
    Immediate = 1,
    /// Operando + base relativa é o endereço
    Relative = 2,
}

impl Mode {
    /// Converte dígito de modo
    pub fn from_digit(digit: i64) -> Option<Self> {
        match digit {
            0 => Some(Self::Position),
            1 => Some(Self::Immediate),
            2 => Some(Self::Relative),
            _ => None,
        }
    }
}

/// Instrução decodificada (sem operandos)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Palavra de instrução como lida da memória
    pub word: i64,
    /// Opcode
    pub opcode: Opcode,
}

impl Instruction {
    /// Decodifica a palavra lida em `ip`
    ///
    /// Decoding never touches memory, so decoding the same word again always
    /// yields the same opcode, modes and arity.
    pub fn decode(word: i64, ip: usize) -> IntcodeResult<Self> {
        let code = word.rem_euclid(100);
        let opcode = Opcode::from_code(code).ok_or(IntcodeError::InvalidOpCode { code, ip })?;
        Ok(Self { word, opcode })
    }

    /// Dígito de modo bruto do parâmetro `index` (0 = primeiro)
    pub fn mode_digit(&self, index: usize) -> i64 {
        let mut digits = self.word.div_euclid(100);
        for _ in 0..index {
            digits = digits.div_euclid(10);
        }
        digits.rem_euclid(10)
    }

    /// Modo validado do parâmetro `index`
    pub fn mode(&self, index: usize, operand: i64) -> IntcodeResult<Mode> {
        let digit = self.mode_digit(index);
        let mode = Mode::from_digit(digit).ok_or(IntcodeError::InvalidMemoryMode {
            mode: digit,
            instruction: self.word,
            operand,
        })?;

        if mode == Mode::Immediate && self.opcode.write_param() == Some(index) {
            return Err(IntcodeError::InvalidMemoryMode {
                mode: digit,
                instruction: self.word,
                operand,
            });
        }

        Ok(mode)
    }

    /// Número de parâmetros
    pub fn arity(&self) -> usize {
        self.opcode.arity()
    }

    /// Palavras ocupadas (instrução + parâmetros)
    pub fn width(&self) -> usize {
        1 + self.arity()
    }
}

/// Parâmetro com modo resolvido
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub mode: Mode,
    pub raw: i64,
}

impl Param {
    /// Endereço efetivo (modos posição e relativo)
    fn address(&self, relative_base: i64) -> IntcodeResult<i64> {
        match self.mode {
            Mode::Position => Ok(self.raw),
            Mode::Relative => self
                .raw
                .checked_add(relative_base)
                .ok_or_else(|| IntcodeError::overflow("relative address", self.raw, relative_base)),
            Mode::Immediate => Ok(self.raw),
        }
    }

    /// Valor lido pelo parâmetro
    pub fn read(&self, memory: &Memory, relative_base: i64) -> IntcodeResult<i64> {
        match self.mode {
            Mode::Immediate => Ok(self.raw),
            _ => memory.read(self.address(relative_base)?),
        }
    }

    /// Endereço de destino para escrita
    ///
    /// Immediate destinations never get this far: [`Instruction::mode`]
    /// rejects them while decoding.
    pub fn write_address(&self, relative_base: i64) -> IntcodeResult<i64> {
        self.address(relative_base)
    }
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mode {
            Mode::Position => write!(f, "[{}]", self.raw),
            Mode::Immediate => write!(f, "{}", self.raw),
            Mode::Relative => write!(f, "[rb{:+}]", self.raw),
        }
    }
}

/// Instrução com operandos buscados da memória
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// Endereço da instrução
    pub ip: usize,
    pub instruction: Instruction,
    params: [Param; MAX_PARAMS],
}

impl Decoded {
    /// Busca e decodifica a instrução em `ip`
    pub fn fetch(memory: &Memory, ip: usize) -> IntcodeResult<Self> {
        let instruction = Instruction::decode(memory.fetch(ip)?, ip)?;

        let mut params = [Param {
            mode: Mode::Position,
            raw: 0,
        }; MAX_PARAMS];
        for (index, param) in params.iter_mut().enumerate().take(instruction.arity()) {
            let raw = memory.fetch(ip + 1 + index)?;
            *param = Param {
                mode: instruction.mode(index, raw)?,
                raw,
            };
        }

        Ok(Self {
            ip,
            instruction,
            params,
        })
    }

    pub fn opcode(&self) -> Opcode {
        self.instruction.opcode
    }

    /// Parâmetros efetivos (tamanho = aridade)
    pub fn params(&self) -> &[Param] {
        &self.params[..self.instruction.arity()]
    }

    pub fn param(&self, index: usize) -> Param {
        self.params[index]
    }

    /// Endereço da próxima instrução em sequência
    pub fn next_ip(&self) -> usize {
        self.ip + self.instruction.width()
    }
}

impl std::fmt::Display for Decoded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.opcode().mnemonic())?;
        for (index, param) in self.params().iter().enumerate() {
            let sep = if index == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, param)?;
        }
        Ok(())
    }
}
