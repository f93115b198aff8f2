//! Thread de execução de uma máquina

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};

use super::completion::{outcome, Completion};
use crate::error::{IntcodeError, IntcodeResult};
use crate::io::{InputPort, OutputPort};
use crate::machine::Machine;
use crate::state::MachineStatus;

/// Máquina executando em background
///
/// Owns the execution thread. Dropping a runner cancels its machine without
/// joining the thread.
pub struct MachineRunner {
    name: String,
    completion: Arc<Completion>,
    /// Dropado no cancelamento para acordar input bloqueado
    cancel_tx: Mutex<Option<Sender<()>>>,
    /// Desconecta quando a thread termina
    done: Receiver<()>,
    thread: Option<JoinHandle<Machine>>,
}

/// Publica pânico da thread como falha
struct PanicGuard {
    completion: Arc<Completion>,
}

impl Drop for PanicGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            self.completion.publish(MachineStatus::Faulted(IntcodeError::ThreadPanicked(
                "panic in execution thread".to_string(),
            )));
        }
    }
}

impl MachineRunner {
    /// Inicia a thread de execução
    ///
    /// `make_input` receives the cancellation receiver so blocking ports can
    /// select on it.
    pub(crate) fn launch<I, O, F>(mut machine: Machine, make_input: F, mut output: O) -> IntcodeResult<Self>
    where
        F: FnOnce(Receiver<()>) -> I,
        I: InputPort + Send + 'static,
        O: OutputPort + Send + 'static,
    {
        machine.ensure_ready()?;

        let name = machine.config().thread_name.clone();
        let completion = Arc::new(Completion::new());
        let (cancel_tx, cancel_rx) = bounded::<()>(0);
        let (done_tx, done) = bounded::<()>(0);
        let mut input = make_input(cancel_rx);

        completion.publish(MachineStatus::Running);
        let shared = Arc::clone(&completion);
        let thread_name = name.clone();

        let thread = thread::Builder::new().name(name.clone()).spawn(move || {
            let _done = done_tx;
            let _guard = PanicGuard {
                completion: Arc::clone(&shared),
            };

            tracing::debug!(machine = %thread_name, "started");
            let result = machine.run_cancellable(&mut input, &mut output, &shared.cancelled);
            match &result {
                Ok(summary) => {
                    tracing::debug!(machine = %thread_name, steps = summary.steps, "finished")
                }
                Err(err) => tracing::debug!(machine = %thread_name, error = %err, "stopped"),
            }

            shared.publish(machine.status().clone());
            machine
        })?;

        Ok(Self {
            name,
            completion,
            cancel_tx: Mutex::new(Some(cancel_tx)),
            done,
            thread: Some(thread),
        })
    }

    /// Nome da thread
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Halt executado
    pub fn is_complete(&self) -> bool {
        self.completion.is_halted()
    }

    /// Loop terminou (halt, falha ou cancelamento)
    pub fn is_finished(&self) -> bool {
        self.completion.status().is_terminal()
    }

    pub fn status(&self) -> MachineStatus {
        self.completion.status()
    }

    /// Bloqueia até o loop terminar
    pub fn wait(&self) -> IntcodeResult<()> {
        outcome(&self.completion.wait())
    }

    /// Bloqueia até o loop terminar ou até o timeout
    ///
    /// `Ok(false)` means the machine is still running.
    pub fn wait_timeout(&self, timeout: Duration) -> IntcodeResult<bool> {
        match self.completion.wait_timeout(timeout) {
            Some(status) => outcome(&status).map(|()| true),
            None => Ok(false),
        }
    }

    /// Solicita cancelamento
    ///
    /// Takes effect before the next instruction, or immediately when the
    /// machine is blocked waiting for input on its channel.
    pub fn cancel(&self) {
        if self.is_finished() {
            return;
        }
        self.completion.request_cancel();
        self.cancel_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        tracing::debug!(machine = %self.name, "cancel requested");
    }

    /// Aguarda a thread e devolve a máquina
    ///
    /// Returns the machine only when it halted; a fault or cancellation is
    /// returned as the error.
    pub fn join(mut self) -> IntcodeResult<Machine> {
        let machine = self.join_thread()?;
        outcome(machine.status())?;
        Ok(machine)
    }

    /// Aguarda a thread e devolve a máquina em qualquer status terminal
    pub fn join_any(mut self) -> IntcodeResult<Machine> {
        self.join_thread()
    }

    fn join_thread(&mut self) -> IntcodeResult<Machine> {
        let thread = self.thread.take().ok_or(IntcodeError::MachineFinished)?;
        thread.join().map_err(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            IntcodeError::ThreadPanicked(message)
        })
    }

    pub(crate) fn done(&self) -> &Receiver<()> {
        &self.done
    }
}

impl Drop for MachineRunner {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.cancel();
        }
    }
}

impl std::fmt::Debug for MachineRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineRunner")
            .field("name", &self.name)
            .field("status", &self.status())
            .finish()
    }
}
