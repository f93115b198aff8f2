//! Rede de pacotes entre máquinas
//!
//! Every NIC is a machine whose first input is its own address. Afterwards
//! input polls the NIC's packet queue (`-1` when empty) and every three
//! outputs form one outbound packet `(dest, x, y)`.
//!
//! ```text
//!   NIC 0 ──┐                        ┌──▶ NIC 0 inbox
//!   NIC 1 ──┼──▶ fabric ──▶ route ───┼──▶ NIC 1 inbox
//!   NIC n ──┘                        └──▶ External (NAT 255, ...)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use crossbeam_utils::Backoff;
use intcode_core::config::idle_polls;
use intcode_core::{
    InputPort, IntcodeError, IntcodeResult, Machine, MachineConfig, MachineRunner, MachineStatus,
    OutputPort, Program,
};
use serde::{Deserialize, Serialize};

use crate::error::{OrchestrationError, OrchestrationResult};

/// Endereço do NAT
pub const NAT_ADDRESS: i64 = 255;

/// Espera de um NIC ocioso por pacote
const IDLE_WAIT: Duration = Duration::from_millis(1);

/// Pacote da rede
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub dest: i64,
    pub src: i64,
    pub x: i64,
    pub y: i64,
}

impl Packet {
    pub fn new(dest: i64, src: i64, x: i64, y: i64) -> Self {
        Self { dest, src, x, y }
    }
}

/// Atividade de um NIC (compartilhada entre input, output e rede)
#[derive(Debug, Default)]
struct NicActivity {
    idle: AtomicBool,
    empty_polls: AtomicUsize,
}

impl NicActivity {
    fn touch(&self) {
        self.empty_polls.store(0, Ordering::Release);
        self.idle.store(false, Ordering::Release);
    }

    fn is_idle(&self) -> bool {
        self.idle.load(Ordering::Acquire)
    }
}

/// Input de um NIC
pub struct NicInput {
    address: i64,
    booted: bool,
    pending_y: Option<i64>,
    packets: Receiver<Packet>,
    activity: Arc<NicActivity>,
    idle_threshold: usize,
    backoff: Backoff,
}

impl InputPort for NicInput {
    fn read(&mut self) -> IntcodeResult<i64> {
        if !self.booted {
            self.booted = true;
            return Ok(self.address);
        }
        if let Some(y) = self.pending_y.take() {
            return Ok(y);
        }

        let packet = if self.activity.is_idle() {
            match self.packets.recv_timeout(IDLE_WAIT) {
                Ok(packet) => Some(packet),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => return Err(IntcodeError::InputExhausted),
            }
        } else {
            self.packets.try_recv().ok()
        };

        match packet {
            Some(packet) => {
                self.activity.touch();
                self.backoff.reset();
                self.pending_y = Some(packet.y);
                Ok(packet.x)
            }
            None => {
                let polls = self.activity.empty_polls.fetch_add(1, Ordering::AcqRel) + 1;
                if polls >= self.idle_threshold && self.packets.is_empty() {
                    self.activity.idle.store(true, Ordering::Release);
                } else {
                    self.backoff.snooze();
                }
                Ok(-1)
            }
        }
    }
}

/// Output de um NIC: agrupa triplas em pacotes
pub struct NicOutput {
    src: i64,
    buffer: Vec<i64>,
    fabric: Sender<Packet>,
    activity: Arc<NicActivity>,
}

impl OutputPort for NicOutput {
    fn write(&mut self, value: i64) -> IntcodeResult<()> {
        self.activity.touch();
        self.buffer.push(value);
        if let &[dest, x, y] = self.buffer.as_slice() {
            self.buffer.clear();
            self.fabric
                .send(Packet::new(dest, self.src, x, y))
                .map_err(|_| IntcodeError::OutputClosed)?;
        }
        Ok(())
    }
}

/// Um NIC em execução
struct Nic {
    runner: MachineRunner,
    inbox: Sender<Packet>,
    activity: Arc<NicActivity>,
}

/// Resultado de um roteamento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
    /// Entregue a um NIC
    Delivered(Packet),
    /// Endereço fora da faixa de NICs
    External(Packet),
}

/// Rede de NICs
pub struct Network {
    nics: Vec<Nic>,
    fabric: Receiver<Packet>,
}

impl Network {
    /// Inicia `size` NICs rodando o mesmo programa
    pub fn new(program: &Program, size: usize) -> OrchestrationResult<Self> {
        Self::with_options(program, size, MachineConfig::from_env(), idle_polls())
    }

    /// Inicia com configuração e limiar de ociosidade explícitos
    pub fn with_options(
        program: &Program,
        size: usize,
        config: MachineConfig,
        idle_threshold: usize,
    ) -> OrchestrationResult<Self> {
        if size == 0 {
            return Err(OrchestrationError::InvalidPipeline(
                "network needs at least one NIC".to_string(),
            ));
        }

        let (fabric_tx, fabric) = unbounded();
        let mut nics = Vec::with_capacity(size);

        for address in (0i64..).take(size) {
            let (inbox, packets) = unbounded();
            let activity = Arc::new(NicActivity::default());

            let input = NicInput {
                address,
                booted: false,
                pending_y: None,
                packets,
                activity: Arc::clone(&activity),
                idle_threshold,
                backoff: Backoff::new(),
            };
            let output = NicOutput {
                src: address,
                buffer: Vec::with_capacity(3),
                fabric: fabric_tx.clone(),
                activity: Arc::clone(&activity),
            };

            let config = config
                .clone()
                .with_thread_name(format!("nic-{}", address));
            let runner = Machine::with_program(program, config)?.spawn_with_ports(input, output)?;

            nics.push(Nic {
                runner,
                inbox,
                activity,
            });
        }

        tracing::debug!(size, idle_threshold, "network started");
        Ok(Self { nics, fabric })
    }

    /// Número de NICs
    pub fn size(&self) -> usize {
        self.nics.len()
    }

    fn nic(&self, address: i64) -> Option<&Nic> {
        usize::try_from(address).ok().and_then(|index| self.nics.get(index))
    }

    /// Entrega um pacote diretamente a um NIC
    pub fn inject(&self, packet: Packet) -> OrchestrationResult<()> {
        let nic = self
            .nic(packet.dest)
            .ok_or(OrchestrationError::UnknownAddress(packet.dest))?;
        nic.activity.touch();
        nic.inbox
            .send(packet)
            .map_err(|_| OrchestrationError::Machine(IntcodeError::OutputClosed))
    }

    /// Roteia o próximo pacote da fabric
    ///
    /// `Ok(None)` when nothing arrived within `timeout`.
    pub fn route_next(&self, timeout: Duration) -> OrchestrationResult<Option<NetworkEvent>> {
        let packet = match self.fabric.recv_timeout(timeout) {
            Ok(packet) => packet,
            Err(_) => return Ok(None),
        };

        if self.nic(packet.dest).is_some() {
            tracing::trace!(src = packet.src, dest = packet.dest, "route");
            self.inject(packet)?;
            Ok(Some(NetworkEvent::Delivered(packet)))
        } else {
            Ok(Some(NetworkEvent::External(packet)))
        }
    }

    /// Todos os NICs ociosos e nenhum pacote em trânsito
    pub fn is_idle(&self) -> bool {
        self.fabric.is_empty()
            && self
                .nics
                .iter()
                .all(|nic| nic.activity.is_idle() && nic.inbox.is_empty())
    }

    /// Status de cada NIC
    pub fn statuses(&self) -> Vec<MachineStatus> {
        self.nics.iter().map(|nic| nic.runner.status()).collect()
    }

    /// Cancela e aguarda todos os NICs
    pub fn shutdown(self) -> OrchestrationResult<()> {
        for nic in &self.nics {
            nic.runner.cancel();
        }

        let mut first_error = None;
        for nic in self.nics {
            if let Err(err) = nic.runner.join_any() {
                first_error.get_or_insert(err);
            }
        }

        tracing::debug!("network stopped");
        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("size", &self.size())
            .field("in_flight", &self.fabric.len())
            .finish()
    }
}

/// NAT: reativa a rede ociosa com o último pacote recebido
#[derive(Debug, Clone, Default)]
pub struct NatMonitor {
    first: Option<Packet>,
    last: Option<Packet>,
    last_sent_y: Option<i64>,
}

impl NatMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primeiro pacote recebido pelo NAT
    pub fn first(&self) -> Option<Packet> {
        self.first
    }

    /// Último pacote recebido pelo NAT
    pub fn last(&self) -> Option<Packet> {
        self.last
    }

    /// Registra um pacote externo
    pub fn observe(&mut self, packet: Packet) -> OrchestrationResult<()> {
        if packet.dest != NAT_ADDRESS {
            return Err(OrchestrationError::UnknownAddress(packet.dest));
        }
        self.first.get_or_insert(packet);
        self.last = Some(packet);
        Ok(())
    }

    /// Reenvia o último pacote ao NIC 0
    ///
    /// Returns the `y` when it equals the previous `y` sent by the NAT.
    pub fn wake(&mut self, network: &Network) -> OrchestrationResult<Option<i64>> {
        let Some(packet) = self.last else {
            return Ok(None);
        };

        network.inject(Packet::new(0, NAT_ADDRESS, packet.x, packet.y))?;
        let repeated = self.last_sent_y == Some(packet.y);
        self.last_sent_y = Some(packet.y);
        tracing::debug!(x = packet.x, y = packet.y, repeated, "nat wake");

        Ok(repeated.then_some(packet.y))
    }

    /// Roteia até o NAT entregar o mesmo `y` duas vezes seguidas
    pub fn run(&mut self, network: &Network, timeout: Duration) -> OrchestrationResult<i64> {
        let deadline = Instant::now() + timeout;
        let poll = IDLE_WAIT * 5;

        while Instant::now() < deadline {
            match network.route_next(poll)? {
                Some(NetworkEvent::External(packet)) => self.observe(packet)?,
                Some(NetworkEvent::Delivered(_)) => continue,
                None => {}
            }

            if network.is_idle() {
                if let Some(y) = self.wake(network)? {
                    return Ok(y);
                }
            }
        }

        Err(OrchestrationError::Timeout(format!(
            "network did not settle within {:?}",
            timeout
        )))
    }
}
