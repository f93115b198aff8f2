//! # Adaptador concorrente
//!
//! Runs a [`Machine`] on its own named thread. Input blocks on an inbound
//! [`Channel`], output enqueues on an outbound one. Wiring machines together
//! is just handing the same channel to two of them.
//!
//! ```text
//!   send ──▶ [inbound] ──▶ Machine thread ──▶ [outbound] ──▶ receive
//!                              │
//!                              └──▶ Completion (status, halted, cancel)
//! ```

mod completion;
mod handle;
mod ports;
mod runner;

pub use handle::MachineHandle;
pub use ports::{ChannelInput, ChannelOutput};
pub use runner::MachineRunner;

use crate::channel::Channel;
use crate::error::IntcodeResult;
use crate::io::{InputPort, OutputPort};
use crate::machine::Machine;

impl Machine {
    /// Executa em background com canais novos
    pub fn spawn(self) -> IntcodeResult<MachineHandle> {
        self.spawn_wired(Channel::new(), Channel::new())
    }

    /// Executa em background lendo de `inbound` e escrevendo em `outbound`
    pub fn spawn_wired(self, inbound: Channel, outbound: Channel) -> IntcodeResult<MachineHandle> {
        let input_channel = inbound.clone();
        let output = ChannelOutput::new(outbound.clone());
        let runner = MachineRunner::launch(
            self,
            move |cancel| ChannelInput::new(input_channel, cancel),
            output,
        )?;
        Ok(MachineHandle::new(runner, inbound, outbound))
    }

    /// Executa em background com portas arbitrárias
    ///
    /// Cancellation is only observed between instructions, so a port that
    /// blocks forever keeps the thread alive.
    pub fn spawn_with_ports<I, O>(self, input: I, output: O) -> IntcodeResult<MachineRunner>
    where
        I: InputPort + Send + 'static,
        O: OutputPort + Send + 'static,
    {
        MachineRunner::launch(self, move |_| input, output)
    }
}
