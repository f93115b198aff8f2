//! Memória da máquina
//!
//! Vetor de inteiros com capacidade fixa, zerado na criação. O programa
//! ocupa um prefixo a partir do endereço 0.

use crate::error::{AddressFault, IntcodeError, IntcodeResult};

/// Memória da máquina Intcode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    /// Células
    cells: Vec<i64>,
    /// Tamanho do programa carregado
    program_len: usize,
}

impl Memory {
    /// Cria memória zerada
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![0; capacity],
            program_len: 0,
        }
    }

    /// Carrega programa no prefixo da memória
    ///
    /// Fails instead of truncating when the program does not fit.
    pub fn load(&mut self, program: &[i64]) -> IntcodeResult<()> {
        if program.len() > self.cells.len() {
            return Err(IntcodeError::ProgramTooLarge {
                len: program.len(),
                capacity: self.cells.len(),
            });
        }

        self.cells[..program.len()].copy_from_slice(program);
        self.cells[program.len()..].fill(0);
        self.program_len = program.len();
        Ok(())
    }

    /// Valida um endereço e converte para índice
    #[inline]
    pub fn resolve(&self, addr: i64) -> IntcodeResult<usize> {
        if addr < 0 {
            return Err(IntcodeError::InvalidAddress {
                reason: AddressFault::Negative,
                address: addr,
            });
        }

        match usize::try_from(addr) {
            Ok(index) if index < self.cells.len() => Ok(index),
            _ => Err(IntcodeError::InvalidAddress {
                reason: AddressFault::OutOfRange,
                address: addr,
            }),
        }
    }

    /// Lê célula
    #[inline]
    pub fn read(&self, addr: i64) -> IntcodeResult<i64> {
        let index = self.resolve(addr)?;
        Ok(self.cells[index])
    }

    /// Escreve célula
    #[inline]
    pub fn write(&mut self, addr: i64, value: i64) -> IntcodeResult<()> {
        let index = self.resolve(addr)?;
        self.cells[index] = value;
        Ok(())
    }

    /// Lê célula por índice já validado (ip)
    #[inline]
    pub(crate) fn fetch(&self, index: usize) -> IntcodeResult<i64> {
        self.cells.get(index).copied().ok_or_else(|| IntcodeError::InvalidAddress {
            reason: AddressFault::OutOfRange,
            address: i64::try_from(index).unwrap_or(i64::MAX),
        })
    }

    /// Capacidade em células
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// Tamanho do programa carregado
    pub fn program_len(&self) -> usize {
        self.program_len
    }

    /// Todas as células
    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }

    /// Células do programa carregado (prefixo)
    pub fn program(&self) -> &[i64] {
        &self.cells[..self.program_len]
    }
}
