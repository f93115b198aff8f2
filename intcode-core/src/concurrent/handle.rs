//! Handle de uma máquina ligada a canais

use std::time::Duration;

use crossbeam_channel::select;

use super::runner::MachineRunner;
use crate::channel::{Channel, Wait};
use crate::error::{IntcodeError, IntcodeResult};
use crate::machine::Machine;
use crate::state::MachineStatus;

/// Máquina em background com canais de entrada e saída
#[derive(Debug)]
pub struct MachineHandle {
    runner: MachineRunner,
    inbound: Channel,
    outbound: Channel,
}

impl MachineHandle {
    pub(crate) fn new(runner: MachineRunner, inbound: Channel, outbound: Channel) -> Self {
        Self {
            runner,
            inbound,
            outbound,
        }
    }

    /// Envia um valor para o input da máquina
    pub fn send(&self, value: i64) -> IntcodeResult<()> {
        self.inbound.send(value)
    }

    pub fn send_with(&self, value: i64, wait: Wait) -> IntcodeResult<()> {
        self.inbound.send_with(value, wait)
    }

    /// Envia uma linha ASCII (cada byte, depois `\n`)
    pub fn send_line(&self, line: &str) -> IntcodeResult<()> {
        for byte in line.bytes() {
            self.send(i64::from(byte))?;
        }
        self.send(i64::from(b'\n'))
    }

    /// Recebe o próximo output, bloqueando
    ///
    /// Returns `MachineStopped` once the machine has stopped and every value
    /// it produced has been taken.
    pub fn receive(&self) -> IntcodeResult<i64> {
        select! {
            recv(self.outbound.receiver()) -> value => value.map_err(|_| IntcodeError::OutputClosed),
            recv(self.runner.done()) -> _ => self.outbound.try_recv().ok_or(IntcodeError::MachineStopped),
        }
    }

    /// Recebe com política de espera
    pub fn receive_with(&self, wait: Wait) -> IntcodeResult<i64> {
        match wait {
            Wait::Forever => self.receive(),
            other => self.outbound.recv_with(other),
        }
    }

    /// Todos os outputs pendentes
    pub fn drain(&self) -> Vec<i64> {
        self.outbound.drain()
    }

    /// Canal de entrada (compartilhado)
    pub fn inbound(&self) -> &Channel {
        &self.inbound
    }

    /// Canal de saída (compartilhado)
    pub fn outbound(&self) -> &Channel {
        &self.outbound
    }

    pub fn name(&self) -> &str {
        self.runner.name()
    }

    /// Halt executado
    pub fn is_complete(&self) -> bool {
        self.runner.is_complete()
    }

    /// Loop terminou (halt, falha ou cancelamento)
    pub fn is_finished(&self) -> bool {
        self.runner.is_finished()
    }

    pub fn status(&self) -> MachineStatus {
        self.runner.status()
    }

    pub fn wait(&self) -> IntcodeResult<()> {
        self.runner.wait()
    }

    pub fn wait_timeout(&self, timeout: Duration) -> IntcodeResult<bool> {
        self.runner.wait_timeout(timeout)
    }

    pub fn cancel(&self) {
        self.runner.cancel()
    }

    /// Aguarda a thread e devolve a máquina (apenas após halt)
    pub fn join(self) -> IntcodeResult<Machine> {
        self.runner.join()
    }

    /// Aguarda a thread e devolve a máquina em qualquer status terminal
    pub fn join_any(self) -> IntcodeResult<Machine> {
        self.runner.join_any()
    }
}
