//! # intcode-core: Máquina Intcode
//!
//! Memória endereçável, decodificador de instruções, núcleo de execução e
//! dois adaptadores de I/O: síncrono (callbacks na thread atual) e
//! concorrente (thread própria, canais de entrada e saída).
//!
//! ## Arquitetura
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Machine                             │
//! │  ┌──────────────┐   ┌──────────────┐   ┌────────────────┐   │
//! │  │    Memory    │◀──│  Decoded     │──▶│   Registers    │   │
//! │  │  [i64; cap]  │   │  op + modes  │   │  ip, rel_base  │   │
//! │  └──────────────┘   └──────────────┘   └────────────────┘   │
//! │            step(input: InputPort, output: OutputPort)       │
//! └─────────────────────────────────────────────────────────────┘
//!          │ sync: run / run_collect      │ concurrent: spawn
//!          ▼                              ▼
//!   closures, VecDeque, Vec        Channel ─▶ thread ─▶ Channel
//! ```
//!
//! ## Exemplo
//!
//! ```
//! use intcode_core::prelude::*;
//!
//! let mut machine = Machine::parse("3,0,4,0,99")?;
//! assert_eq!(machine.run_collect([7])?, vec![7]);
//! # Ok::<(), IntcodeError>(())
//! ```

pub mod channel;
pub mod concurrent;
pub mod config;
pub mod error;
pub mod instruction;
pub mod io;
pub mod machine;
pub mod memory;
pub mod opcode;
pub mod program;
pub mod state;

pub use channel::{Channel, Wait};
pub use concurrent::{ChannelInput, ChannelOutput, MachineHandle, MachineRunner};
pub use config::MachineConfig;
pub use error::{AddressFault, IntcodeError, IntcodeResult};
pub use instruction::{Decoded, Instruction, Mode, Param};
pub use io::{InputPort, LogOutput, NoInput, OutputPort};
pub use machine::Machine;
pub use memory::Memory;
pub use opcode::Opcode;
pub use program::Program;
pub use state::{MachineStatus, Registers, RunSummary, Step};

/// Prelude com os tipos de uso comum
pub mod prelude {
    pub use crate::channel::{Channel, Wait};
    pub use crate::concurrent::{MachineHandle, MachineRunner};
    pub use crate::config::MachineConfig;
    pub use crate::error::{IntcodeError, IntcodeResult};
    pub use crate::io::{InputPort, OutputPort};
    pub use crate::machine::Machine;
    pub use crate::program::Program;
    pub use crate::state::{MachineStatus, Step};
}
