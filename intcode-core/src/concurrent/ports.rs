//! Portas ligadas a canais

use crossbeam_channel::{select, Receiver};

use crate::channel::Channel;
use crate::error::{IntcodeError, IntcodeResult};
use crate::io::{InputPort, OutputPort};

/// Input que bloqueia no canal de entrada
///
/// The cancel receiver never carries a value: its sender is dropped on
/// cancellation, which makes the select below return at once.
pub struct ChannelInput {
    channel: Channel,
    cancel: Receiver<()>,
}

impl ChannelInput {
    pub(crate) fn new(channel: Channel, cancel: Receiver<()>) -> Self {
        Self { channel, cancel }
    }
}

impl InputPort for ChannelInput {
    fn read(&mut self) -> IntcodeResult<i64> {
        select! {
            recv(self.channel.receiver()) -> value => value.map_err(|_| IntcodeError::InputExhausted),
            recv(self.cancel) -> _ => Err(IntcodeError::Cancelled),
        }
    }
}

/// Output que enfileira no canal de saída
pub struct ChannelOutput {
    channel: Channel,
}

impl ChannelOutput {
    pub(crate) fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

impl OutputPort for ChannelOutput {
    fn write(&mut self, value: i64) -> IntcodeResult<()> {
        self.channel.send_with(value, crate::channel::Wait::NonBlocking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_input_reads_queue() {
        let channel = Channel::new();
        let (_cancel_tx, cancel_rx) = bounded::<()>(0);
        channel.send(5).unwrap();

        let mut input = ChannelInput::new(channel, cancel_rx);
        assert_eq!(input.read().unwrap(), 5);
    }

    #[test]
    fn test_input_cancel_wakes() {
        let (cancel_tx, cancel_rx) = bounded::<()>(0);
        let mut input = ChannelInput::new(Channel::new(), cancel_rx);
        drop(cancel_tx);
        assert_eq!(input.read().unwrap_err(), IntcodeError::Cancelled);
    }

    #[test]
    fn test_output_enqueues() {
        let channel = Channel::new();
        let mut output = ChannelOutput::new(channel.clone());
        output.write(1).unwrap();
        output.write(2).unwrap();
        assert_eq!(channel.drain(), vec![1, 2]);
    }
}
