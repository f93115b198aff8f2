//! Portas de I/O da máquina
//!
//! The execution core only talks to these two traits. The synchronous
//! adapter plugs caller callbacks into them; the concurrent adapter plugs
//! channels.

use std::collections::VecDeque;

use crate::error::{IntcodeError, IntcodeResult};

/// Fonte de valores para a instrução input
pub trait InputPort {
    /// Próximo valor. Chamado exatamente uma vez por instrução input.
    fn read(&mut self) -> IntcodeResult<i64>;
}

/// Destino dos valores da instrução output
pub trait OutputPort {
    /// Consome um valor. Chamado exatamente uma vez por valor emitido.
    fn write(&mut self, value: i64) -> IntcodeResult<()>;
}

impl<F> InputPort for F
where
    F: FnMut() -> IntcodeResult<i64>,
{
    fn read(&mut self) -> IntcodeResult<i64> {
        self()
    }
}

impl<F> OutputPort for F
where
    F: FnMut(i64),
{
    fn write(&mut self, value: i64) -> IntcodeResult<()> {
        self(value);
        Ok(())
    }
}

impl InputPort for VecDeque<i64> {
    fn read(&mut self) -> IntcodeResult<i64> {
        self.pop_front().ok_or(IntcodeError::InputExhausted)
    }
}

impl InputPort for &mut VecDeque<i64> {
    fn read(&mut self) -> IntcodeResult<i64> {
        (**self).read()
    }
}

impl OutputPort for Vec<i64> {
    fn write(&mut self, value: i64) -> IntcodeResult<()> {
        self.push(value);
        Ok(())
    }
}

impl OutputPort for &mut Vec<i64> {
    fn write(&mut self, value: i64) -> IntcodeResult<()> {
        self.push(value);
        Ok(())
    }
}

/// Input que falha sempre (programas sem instrução input)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputPort for NoInput {
    fn read(&mut self) -> IntcodeResult<i64> {
        Err(IntcodeError::InputExhausted)
    }
}

/// Output padrão: loga cada valor
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOutput;

impl OutputPort for LogOutput {
    fn write(&mut self, value: i64) -> IntcodeResult<()> {
        tracing::info!(value, "output");
        Ok(())
    }
}
