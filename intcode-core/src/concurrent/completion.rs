//! Sinal de conclusão compartilhado entre a thread da máquina e o handle

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::{IntcodeError, IntcodeResult};
use crate::state::MachineStatus;

/// Estado publicado pela thread de execução
#[derive(Debug)]
pub(crate) struct Completion {
    /// Halt executado (setado uma vez, nunca resetado)
    halted: AtomicBool,
    /// Cancelamento solicitado
    pub(crate) cancelled: AtomicBool,
    status: Mutex<MachineStatus>,
    changed: Condvar,
}

impl Completion {
    pub(crate) fn new() -> Self {
        Self {
            halted: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            status: Mutex::new(MachineStatus::Ready),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MachineStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publica novo status e acorda quem espera
    ///
    /// A terminal status is never overwritten.
    pub(crate) fn publish(&self, status: MachineStatus) {
        let mut current = self.lock();
        if current.is_terminal() {
            return;
        }
        if status == MachineStatus::Halted {
            self.halted.store(true, Ordering::Release);
        }
        *current = status;
        self.changed.notify_all();
    }

    pub(crate) fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub(crate) fn request_cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub(crate) fn status(&self) -> MachineStatus {
        self.lock().clone()
    }

    /// Bloqueia até um status terminal
    pub(crate) fn wait(&self) -> MachineStatus {
        let guard = self
            .changed
            .wait_while(self.lock(), |status| !status.is_terminal())
            .unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    /// Bloqueia até um status terminal ou até o timeout
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> Option<MachineStatus> {
        let (guard, _) = self
            .changed
            .wait_timeout_while(self.lock(), timeout, |status| !status.is_terminal())
            .unwrap_or_else(PoisonError::into_inner);
        guard.is_terminal().then(|| guard.clone())
    }
}

/// Converte status terminal em resultado
pub(crate) fn outcome(status: &MachineStatus) -> IntcodeResult<()> {
    match status {
        MachineStatus::Faulted(err) => Err(err.clone()),
        MachineStatus::Cancelled => Err(IntcodeError::Cancelled),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_terminal_status_is_sticky() {
        let completion = Completion::new();
        completion.publish(MachineStatus::Running);
        completion.publish(MachineStatus::Halted);
        completion.publish(MachineStatus::Cancelled);
        assert_eq!(completion.status(), MachineStatus::Halted);
        assert!(completion.is_halted());
    }

    #[test]
    fn test_fault_does_not_mark_halted() {
        let completion = Completion::new();
        completion.publish(MachineStatus::Faulted(IntcodeError::InputExhausted));
        assert!(!completion.is_halted());
        assert_eq!(outcome(&completion.wait()), Err(IntcodeError::InputExhausted));
    }

    #[test]
    fn test_wait_timeout_running() {
        let completion = Completion::new();
        completion.publish(MachineStatus::Running);
        assert_eq!(completion.wait_timeout(Duration::from_millis(10)), None);
    }

    #[test]
    fn test_wait_wakes_on_publish() {
        let completion = Arc::new(Completion::new());
        let publisher = Arc::clone(&completion);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            publisher.publish(MachineStatus::Halted);
        });

        assert_eq!(completion.wait(), MachineStatus::Halted);
        handle.join().unwrap();
    }
}
