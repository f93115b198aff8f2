//! # intcode-orchestration: Composição de máquinas
//!
//! Liga instâncias concorrentes de [`intcode_core::Machine`] compartilhando
//! canais: cadeias, anéis e redes de pacotes com NAT.
//!
//! ## Arquitetura
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Pipeline (Chain)                                           │
//! │    input ─▶ [M0] ─▶ [M1] ─▶ ... ─▶ [Mn-1] ─▶ output         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Pipeline (Ring)                                            │
//! │    ┌─▶ [M0] ─▶ [M1] ─▶ ... ─▶ [Mn-1] ─┐                     │
//! │    └──────────────────────────────────┘                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Network                                                    │
//! │    NIC* ─▶ fabric ─▶ route ─▶ NIC inbox | NatMonitor (255)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exemplo
//!
//! ```
//! use intcode_core::Program;
//! use intcode_orchestration::{Pipeline, Topology};
//!
//! let program = Program::parse("3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0")?;
//! let signal = Pipeline::run_phases(program, &[4, 3, 2, 1, 0], Topology::Chain, 0)?;
//! assert_eq!(signal, 43210);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod network;
pub mod pipeline;

pub use error::{OrchestrationError, OrchestrationResult};
pub use network::{NatMonitor, Network, NetworkEvent, NicInput, NicOutput, Packet, NAT_ADDRESS};
pub use pipeline::{Pipeline, Topology};
