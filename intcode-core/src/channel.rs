//! Canais entre máquinas
//!
//! Unbounded FIFO queue of integers on top of crossbeam MPMC channels.
//! A `Channel` keeps both ends, so cloning it hands out another endpoint of
//! the same queue: that is all the wiring a pipeline needs.

use std::time::Duration;

use crossbeam_channel::{
    unbounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender, TryRecvError, TrySendError,
};

use crate::error::{IntcodeError, IntcodeResult};

/// Política de espera para send/receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wait {
    /// Bloqueia até concluir
    #[default]
    Forever,
    /// Falha imediatamente se não puder concluir
    NonBlocking,
    /// Bloqueia no máximo pelo tempo dado
    Timeout(Duration),
}

/// Canal ilimitado de inteiros
#[derive(Clone)]
pub struct Channel {
    sender: Sender<i64>,
    receiver: Receiver<i64>,
}

impl Channel {
    /// Create an empty unbounded channel
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Enqueue one value (never blocks: the queue is unbounded)
    pub fn send(&self, value: i64) -> IntcodeResult<()> {
        self.sender.send(value).map_err(|_| IntcodeError::OutputClosed)
    }

    /// Enqueue with an explicit wait policy
    ///
    /// Kept for symmetry with [`Channel::recv_with`]; with an unbounded queue
    /// every policy succeeds at once.
    pub fn send_with(&self, value: i64, wait: Wait) -> IntcodeResult<()> {
        match wait {
            Wait::Forever => self.send(value),
            Wait::NonBlocking => self.sender.try_send(value).map_err(|err| match err {
                TrySendError::Full(_) => IntcodeError::ChannelFull,
                TrySendError::Disconnected(_) => IntcodeError::OutputClosed,
            }),
            Wait::Timeout(timeout) => {
                self.sender
                    .send_timeout(value, timeout)
                    .map_err(|err| match err {
                        SendTimeoutError::Timeout(_) => IntcodeError::ChannelFull,
                        SendTimeoutError::Disconnected(_) => IntcodeError::OutputClosed,
                    })
            }
        }
    }

    /// Dequeue one value, blocking until one arrives
    pub fn recv(&self) -> IntcodeResult<i64> {
        self.receiver.recv().map_err(|_| IntcodeError::OutputClosed)
    }

    /// Dequeue with an explicit wait policy
    ///
    /// An empty non-blocking or timed-out receive is `NoDataAvailable`.
    pub fn recv_with(&self, wait: Wait) -> IntcodeResult<i64> {
        match wait {
            Wait::Forever => self.recv(),
            Wait::NonBlocking => self.receiver.try_recv().map_err(|err| match err {
                TryRecvError::Empty => IntcodeError::NoDataAvailable,
                TryRecvError::Disconnected => IntcodeError::OutputClosed,
            }),
            Wait::Timeout(timeout) => {
                self.receiver
                    .recv_timeout(timeout)
                    .map_err(|err| match err {
                        RecvTimeoutError::Timeout => IntcodeError::NoDataAvailable,
                        RecvTimeoutError::Disconnected => IntcodeError::OutputClosed,
                    })
            }
        }
    }

    /// Non-blocking receive
    pub fn try_recv(&self) -> Option<i64> {
        self.receiver.try_recv().ok()
    }

    /// Take every value currently queued
    pub fn drain(&self) -> Vec<i64> {
        self.receiver.try_iter().collect()
    }

    /// Number of pending values
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Check if there are pending values
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub(crate) fn receiver(&self) -> &Receiver<i64> {
        &self.receiver
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let channel = Channel::new();
        for v in [3, 1, 4, 1, 5] {
            channel.send(v).unwrap();
        }
        assert_eq!(channel.len(), 5);
        assert_eq!(channel.drain(), vec![3, 1, 4, 1, 5]);
        assert!(channel.is_empty());
    }

    #[test]
    fn test_clone_shares_queue() {
        let a = Channel::new();
        let b = a.clone();
        a.send(9).unwrap();
        assert_eq!(b.recv().unwrap(), 9);
    }

    #[test]
    fn test_non_blocking_empty() {
        let channel = Channel::new();
        assert_eq!(
            channel.recv_with(Wait::NonBlocking).unwrap_err(),
            IntcodeError::NoDataAvailable
        );
        assert_eq!(channel.try_recv(), None);
    }

    #[test]
    fn test_timeout_empty() {
        let channel = Channel::new();
        let err = channel
            .recv_with(Wait::Timeout(Duration::from_millis(10)))
            .unwrap_err();
        assert_eq!(err, IntcodeError::NoDataAvailable);
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_send_variants_never_block() {
        let channel = Channel::new();
        channel.send_with(1, Wait::Forever).unwrap();
        channel.send_with(2, Wait::NonBlocking).unwrap();
        channel
            .send_with(3, Wait::Timeout(Duration::from_millis(1)))
            .unwrap();
        assert_eq!(channel.drain(), vec![1, 2, 3]);
    }

    #[test]
    fn test_blocking_recv_across_threads() {
        let channel = Channel::new();
        let producer = channel.clone();

        let handle = thread::spawn(move || {
            for v in 0..100 {
                producer.send(v).unwrap();
            }
        });

        let received: Vec<i64> = (0..100).map(|_| channel.recv().unwrap()).collect();
        handle.join().unwrap();
        assert_eq!(received, (0..100).collect::<Vec<_>>());
    }
}
