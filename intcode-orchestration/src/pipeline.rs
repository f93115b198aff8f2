//! Composição de máquinas em cadeia ou anel
//!
//! Instance `i` reads channel `i` and writes channel `i + 1`. In a ring the
//! last instance writes back into channel 0; in a chain an extra channel
//! collects the final output.

use std::time::Duration;

use intcode_core::{Channel, Machine, MachineConfig, MachineHandle, MachineStatus, Program};
use serde::{Deserialize, Serialize};

use crate::error::{OrchestrationError, OrchestrationResult};

/// Espera por instância em cada volta de `wait_all`
const WAIT_SLICE: Duration = Duration::from_millis(2);

/// Topologia da composição
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// Saída da última instância é a saída do pipeline
    Chain,
    /// Saída da última instância volta para a primeira
    Ring,
}

/// Pipeline de máquinas
#[derive(Debug)]
pub struct Pipeline {
    program: Program,
    config: MachineConfig,
    topology: Topology,
    size: usize,
    /// Chain: size + 1 canais; ring: size canais
    channels: Vec<Channel>,
    handles: Vec<MachineHandle>,
}

impl Pipeline {
    /// Cria pipeline de `size` instâncias do mesmo programa
    pub fn new(program: Program, size: usize, topology: Topology) -> OrchestrationResult<Self> {
        if size == 0 {
            return Err(OrchestrationError::InvalidPipeline(
                "pipeline needs at least one instance".to_string(),
            ));
        }

        let channel_count = match topology {
            Topology::Chain => size + 1,
            Topology::Ring => size,
        };

        Ok(Self {
            program,
            config: MachineConfig::from_env(),
            topology,
            size,
            channels: (0..channel_count).map(|_| Channel::new()).collect(),
            handles: Vec::with_capacity(size),
        })
    }

    /// Define a configuração usada por cada instância
    pub fn with_config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn is_started(&self) -> bool {
        !self.handles.is_empty()
    }

    /// Pré-carrega o canal de entrada de uma instância
    pub fn seed(&self, index: usize, values: impl IntoIterator<Item = i64>) -> OrchestrationResult<()> {
        let channel = self.inbound(index)?;
        for value in values {
            channel.send(value)?;
        }
        Ok(())
    }

    /// Canal de entrada da instância `index`
    pub fn inbound(&self, index: usize) -> OrchestrationResult<&Channel> {
        if index >= self.size {
            return Err(OrchestrationError::InvalidPipeline(format!(
                "instance {} out of range (size {})",
                index, self.size
            )));
        }
        Ok(&self.channels[index])
    }

    /// Entrada aberta do pipeline
    pub fn input(&self) -> &Channel {
        &self.channels[0]
    }

    /// Saída do pipeline
    ///
    /// In a ring this is the same channel as [`Pipeline::input`].
    pub fn output(&self) -> &Channel {
        match self.topology {
            Topology::Chain => &self.channels[self.size],
            Topology::Ring => &self.channels[0],
        }
    }

    /// Inicia todas as instâncias
    pub fn start(&mut self) -> OrchestrationResult<()> {
        if self.is_started() {
            return Err(OrchestrationError::InvalidPipeline("already started".to_string()));
        }

        for index in 0..self.size {
            let inbound = self.channels[index].clone();
            let outbound = self.channels[(index + 1) % self.channels.len()].clone();
            let config = self
                .config
                .clone()
                .with_thread_name(format!("{}-{}", self.config.thread_name, index));

            let handle = Machine::with_program(&self.program, config)?.spawn_wired(inbound, outbound)?;
            self.handles.push(handle);
        }

        tracing::debug!(size = self.size, topology = ?self.topology, "pipeline started");
        Ok(())
    }

    /// Aguarda todas as instâncias
    ///
    /// Polls every instance until all are terminal. The first fault cancels
    /// the remaining instances and is the error returned.
    pub fn wait_all(&self) -> OrchestrationResult<()> {
        if !self.is_started() {
            return Err(OrchestrationError::InvalidPipeline("not started".to_string()));
        }

        let mut first_fault = None;
        let mut pending: Vec<usize> = (0..self.handles.len()).collect();
        while !pending.is_empty() {
            pending.retain(|&index| match self.handles[index].wait_timeout(WAIT_SLICE) {
                Ok(finished) => !finished,
                Err(err) => {
                    tracing::warn!(instance = index, error = %err, "pipeline instance failed");
                    if first_fault.is_none() {
                        first_fault = Some(err);
                        self.cancel_all();
                    }
                    false
                }
            });
        }

        match first_fault {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Cancela todas as instâncias
    pub fn cancel_all(&self) {
        for handle in &self.handles {
            handle.cancel();
        }
    }

    /// Status de cada instância (vazio antes de `start`)
    pub fn statuses(&self) -> Vec<MachineStatus> {
        self.handles.iter().map(MachineHandle::status).collect()
    }

    /// Executa com fases e sinal inicial; devolve o último valor de saída
    ///
    /// Instance `i` receives `phases[i]` as its first input and instance 0
    /// receives `signal` right after its phase.
    pub fn run_phases(
        program: Program,
        phases: &[i64],
        topology: Topology,
        signal: i64,
    ) -> OrchestrationResult<i64> {
        let mut pipeline = Self::new(program, phases.len(), topology)?;
        for (index, &phase) in phases.iter().enumerate() {
            pipeline.seed(index, [phase])?;
        }
        pipeline.input().send(signal)?;

        pipeline.start()?;
        pipeline.wait_all()?;

        pipeline
            .output()
            .drain()
            .last()
            .copied()
            .ok_or_else(|| OrchestrationError::InvalidPipeline("pipeline produced no output".to_string()))
    }
}
