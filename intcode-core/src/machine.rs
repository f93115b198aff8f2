//! Núcleo de execução
//!
//! Decode-and-dispatch loop over a private [`Memory`], plus the synchronous
//! adapter (`run*`) that drives it with caller-supplied ports.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::MachineConfig;
use crate::error::{AddressFault, IntcodeError, IntcodeResult};
use crate::instruction::{Decoded, Param};
use crate::io::{InputPort, LogOutput, OutputPort};
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::program::Program;
use crate::state::{MachineStatus, Registers, RunSummary, Step};

/// Máquina Intcode
#[derive(Debug, Clone)]
pub struct Machine {
    /// Memória
    memory: Memory,
    /// Registradores
    registers: Registers,
    /// Configuração
    config: MachineConfig,
    /// Instruções executadas
    steps: u64,
    /// Ciclo de vida
    status: MachineStatus,
}

impl Machine {
    /// Cria máquina com memória vazia
    pub fn new(config: MachineConfig) -> Self {
        Self {
            memory: Memory::new(config.memory_size),
            registers: Registers::default(),
            config,
            steps: 0,
            status: MachineStatus::Ready,
        }
    }

    /// Cria máquina (configuração padrão) com programa carregado
    pub fn from_program(program: &Program) -> IntcodeResult<Self> {
        Self::with_program(program, MachineConfig::default())
    }

    /// Cria máquina com programa carregado
    pub fn with_program(program: &Program, config: MachineConfig) -> IntcodeResult<Self> {
        let mut machine = Self::new(config);
        machine.load(program)?;
        Ok(machine)
    }

    /// Parseia texto e cria máquina
    pub fn parse(text: &str) -> IntcodeResult<Self> {
        Self::from_program(&Program::parse(text)?)
    }

    /// Carrega programa
    ///
    /// Only a machine that has not run yet accepts a program.
    pub fn load(&mut self, program: &Program) -> IntcodeResult<()> {
        self.ensure_ready()?;
        self.memory.load(program.cells())?;
        self.registers = Registers::default();
        self.steps = 0;
        Ok(())
    }

    /// Altera uma célula de memória
    pub fn poke(&mut self, address: i64, value: i64) -> IntcodeResult<()> {
        self.memory.write(address, value)
    }

    /// Lê uma célula de memória
    pub fn peek(&self, address: i64) -> IntcodeResult<i64> {
        self.memory.read(address)
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn registers(&self) -> Registers {
        self.registers
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Instruções executadas até agora
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn status(&self) -> &MachineStatus {
        &self.status
    }

    /// Decodifica a instrução em `ip` sem executá-la
    pub fn decode_at(&self, ip: usize) -> IntcodeResult<Decoded> {
        Decoded::fetch(&self.memory, ip)
    }

    pub(crate) fn ensure_ready(&self) -> IntcodeResult<()> {
        if self.status.is_terminal() {
            return Err(IntcodeError::MachineFinished);
        }
        Ok(())
    }

    /// Executa uma instrução
    ///
    /// A fault leaves memory and registers exactly as they were before the
    /// faulting instruction, and the machine refuses further steps.
    pub fn step<I, O>(&mut self, input: &mut I, output: &mut O) -> IntcodeResult<Step>
    where
        I: InputPort + ?Sized,
        O: OutputPort + ?Sized,
    {
        self.ensure_ready()?;

        let outcome = self
            .decode_at(self.registers.ip)
            .and_then(|decoded| self.execute(&decoded, input, output));

        match outcome {
            Ok(Step::Continue) => {
                self.steps += 1;
                Ok(Step::Continue)
            }
            Ok(Step::Halted) => {
                self.steps += 1;
                self.status = MachineStatus::Halted;
                tracing::debug!(steps = self.steps, ip = self.registers.ip, "halted");
                Ok(Step::Halted)
            }
            Err(IntcodeError::Cancelled) => {
                self.status = MachineStatus::Cancelled;
                Err(IntcodeError::Cancelled)
            }
            Err(err) => {
                tracing::warn!(ip = self.registers.ip, error = %err, "fault");
                self.status = MachineStatus::Faulted(err.clone());
                Err(err)
            }
        }
    }

    fn execute<I, O>(&mut self, decoded: &Decoded, input: &mut I, output: &mut O) -> IntcodeResult<Step>
    where
        I: InputPort + ?Sized,
        O: OutputPort + ?Sized,
    {
        let base = self.registers.relative_base;
        let opcode = decoded.opcode();

        if self.config.trace {
            tracing::trace!(ip = decoded.ip, %opcode, params = ?decoded.params(), "step");
        }

        match opcode {
            Opcode::Add => {
                let (a, b) = self.read_pair(decoded)?;
                let value = a.checked_add(b).ok_or_else(|| IntcodeError::overflow("add", a, b))?;
                self.store(decoded.param(2), value)?;
            }

            Opcode::Multiply => {
                let (a, b) = self.read_pair(decoded)?;
                let value = a
                    .checked_mul(b)
                    .ok_or_else(|| IntcodeError::overflow("multiply", a, b))?;
                self.store(decoded.param(2), value)?;
            }

            Opcode::Input => {
                // Destino validado antes de consumir o input
                let dest = decoded.param(0).write_address(base)?;
                self.memory.resolve(dest)?;
                let value = input.read()?;
                self.memory.write(dest, value)?;
            }

            Opcode::Output => {
                let value = decoded.param(0).read(&self.memory, base)?;
                output.write(value)?;
            }

            Opcode::JumpIfTrue | Opcode::JumpIfFalse => {
                let condition = decoded.param(0).read(&self.memory, base)?;
                let taken = match opcode {
                    Opcode::JumpIfTrue => condition != 0,
                    _ => condition == 0,
                };
                if taken {
                    let target = decoded.param(1).read(&self.memory, base)?;
                    self.jump(target)?;
                    return Ok(Step::Continue);
                }
            }

            Opcode::LessThan => {
                let (a, b) = self.read_pair(decoded)?;
                self.store(decoded.param(2), i64::from(a < b))?;
            }

            Opcode::Equals => {
                let (a, b) = self.read_pair(decoded)?;
                self.store(decoded.param(2), i64::from(a == b))?;
            }

            Opcode::AdjustRelativeBase => {
                let delta = decoded.param(0).read(&self.memory, base)?;
                let new_base = base
                    .checked_add(delta)
                    .ok_or_else(|| IntcodeError::overflow("relative base", base, delta))?;
                if new_base < 0 {
                    return Err(IntcodeError::RelativeBaseUnderflow(new_base));
                }
                self.registers.relative_base = new_base;
            }

            Opcode::Halt => return Ok(Step::Halted),
        }

        self.registers.ip = decoded.next_ip();
        Ok(Step::Continue)
    }

    #[inline]
    fn read_pair(&self, decoded: &Decoded) -> IntcodeResult<(i64, i64)> {
        let base = self.registers.relative_base;
        Ok((
            decoded.param(0).read(&self.memory, base)?,
            decoded.param(1).read(&self.memory, base)?,
        ))
    }

    #[inline]
    fn store(&mut self, param: Param, value: i64) -> IntcodeResult<()> {
        let dest = param.write_address(self.registers.relative_base)?;
        self.memory.write(dest, value)
    }

    fn jump(&mut self, target: i64) -> IntcodeResult<()> {
        let ip = usize::try_from(target).map_err(|_| IntcodeError::InvalidAddress {
            reason: AddressFault::Negative,
            address: target,
        })?;
        self.registers.ip = ip;
        Ok(())
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            steps: self.steps,
            registers: self.registers,
        }
    }

    // ═════════════════════════════════════════════════════════════════
    // ADAPTADOR SÍNCRONO
    // ═════════════════════════════════════════════════════════════════

    /// Executa até halt ou falha na thread atual
    pub fn run<I, O>(&mut self, mut input: I, mut output: O) -> IntcodeResult<RunSummary>
    where
        I: InputPort,
        O: OutputPort,
    {
        while self.step(&mut input, &mut output)? == Step::Continue {}
        Ok(self.summary())
    }

    /// Executa logando cada output
    pub fn run_with_input<I: InputPort>(&mut self, input: I) -> IntcodeResult<RunSummary> {
        self.run(input, LogOutput)
    }

    /// Executa com inputs fixos e coleta os outputs
    pub fn run_collect(&mut self, inputs: impl IntoIterator<Item = i64>) -> IntcodeResult<Vec<i64>> {
        let mut queue: VecDeque<i64> = inputs.into_iter().collect();
        let mut outputs = Vec::new();
        self.run(&mut queue, &mut outputs)?;
        Ok(outputs)
    }

    /// Executa até halt, falha ou cancelamento
    ///
    /// `cancel` is checked before every instruction.
    pub fn run_cancellable<I, O>(
        &mut self,
        input: &mut I,
        output: &mut O,
        cancel: &AtomicBool,
    ) -> IntcodeResult<RunSummary>
    where
        I: InputPort + ?Sized,
        O: OutputPort + ?Sized,
    {
        loop {
            if cancel.load(Ordering::Acquire) {
                self.ensure_ready()?;
                self.status = MachineStatus::Cancelled;
                return Err(IntcodeError::Cancelled);
            }
            if self.step(input, output)? == Step::Halted {
                return Ok(self.summary());
            }
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(MachineConfig::default())
    }
}
