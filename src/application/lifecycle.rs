//! Lifecycle runner: owns the dispatch task and decides the exit code
//!
//! The runner is the only component that writes the exit code. It runs the
//! dispatcher once on a background task, classifies how that task ended, and
//! asks the host to shut down on every path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::application::dispatcher::CommandDispatcher;
use crate::application::DispatchError;
use crate::domain::{CancellationSignal, ExecutionOutcome, ExitCodeCell};
use crate::exitcode;
use crate::infrastructure::host::{HostLifetime, HostedService};
use crate::infrastructure::InfraResult;

pub struct LifecycleRunner {
    inner: Arc<RunnerInner>,
}

struct RunnerInner {
    dispatcher: Arc<CommandDispatcher>,
    args: Vec<String>,
    lifetime: HostLifetime,
    cancellation: CancellationSignal,
    outcome: OnceLock<ExecutionOutcome>,
    exit_code: ExitCodeCell,
    task: Mutex<Option<JoinHandle<()>>>,
    disposed: AtomicBool,
}

/// Requests host shutdown when dropped, whichever way the dispatch task ends.
struct ShutdownOnDrop(HostLifetime);

impl Drop for ShutdownOnDrop {
    fn drop(&mut self) {
        self.0.stop_application();
    }
}

impl LifecycleRunner {
    pub fn new(
        dispatcher: Arc<CommandDispatcher>,
        args: Vec<String>,
        lifetime: HostLifetime,
    ) -> Self {
        info!(
            "{} {} starting with {:?}",
            dispatcher.app().name,
            dispatcher.app().version,
            args
        );
        Self {
            inner: Arc::new(RunnerInner {
                dispatcher,
                args,
                lifetime,
                cancellation: CancellationSignal::new(),
                outcome: OnceLock::new(),
                exit_code: ExitCodeCell::new(),
                task: Mutex::new(None),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Handle to the signal that cancels the running command.
    pub fn cancellation(&self) -> CancellationSignal {
        self.inner.cancellation.clone()
    }

    /// How the dispatch task ended, once it has.
    pub fn outcome(&self) -> Option<ExecutionOutcome> {
        self.inner.outcome.get().cloned()
    }

    /// Exit code slot, written by [`HostedService::stop`].
    pub fn exit_code(&self) -> ExitCodeCell {
        self.inner.exit_code.clone()
    }

    /// Abort an unfinished dispatch task and trigger the cancellation signal.
    ///
    /// Returns `false` when already disposed.
    pub fn dispose(&self) -> bool {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return false;
        }
        let task = match self.inner.task.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(task) = task {
            if !task.is_finished() {
                debug!("aborting dispatch task");
                task.abort();
            }
        }
        self.inner.cancellation.cancel();
        true
    }
}

impl Drop for LifecycleRunner {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[async_trait]
impl HostedService for LifecycleRunner {
    async fn start(&self) -> InfraResult<()> {
        let inner = self.inner.clone();
        self.inner.lifetime.on_started(move || {
            debug!("host started, launching dispatch task");
            let task = tokio::spawn(RunnerInner::dispatch(inner.clone()));
            match inner.task.lock() {
                Ok(mut guard) => *guard = Some(task),
                Err(poisoned) => *poisoned.into_inner() = Some(task),
            }
        });
        self.inner.lifetime.on_stopping(|| debug!("host stopping"));
        let exit_code = self.inner.exit_code.clone();
        self.inner
            .lifetime
            .on_stopped(move || info!("host stopped, exit code {}", exit_code.get()));
        info!("registration of lifecycle hooks done");
        Ok(())
    }

    async fn stop(&self) {
        self.inner.cancellation.cancel();
        let code = self
            .inner
            .outcome
            .get()
            .and_then(ExecutionOutcome::exit_code)
            .unwrap_or(exitcode::ERROR);
        if !self.inner.exit_code.set(code) {
            debug!("exit code already written, keeping {}", self.inner.exit_code.get());
        }
    }
}

impl RunnerInner {
    async fn dispatch(self: Arc<Self>) {
        let _shutdown = ShutdownOnDrop(self.lifetime.clone());

        let result = tokio::select! {
            biased;
            result = self.dispatcher.run(&self.args, &self.cancellation) => result,
            _ = self.cancellation.cancelled() => Err(DispatchError::Cancelled),
        };

        let outcome = self.classify(result);
        debug!("dispatch finished: {}", outcome);
        if self.outcome.set(outcome).is_err() {
            warn!("execution outcome already recorded");
        }
    }

    fn classify(&self, result: Result<i32, DispatchError>) -> ExecutionOutcome {
        match result {
            Ok(_) if self.cancellation.is_cancelled() => self.cancelled(),
            Ok(code) => ExecutionOutcome::Success(code),
            Err(DispatchError::Cancelled) => self.cancelled(),
            Err(DispatchError::Parse(e)) => {
                error!("{}", e);
                ExecutionOutcome::ParseFailure(e.to_string())
            }
            Err(DispatchError::Batch(members)) => self.classify_batch(members),
            Err(other) => fault(other),
        }
    }

    /// Cancelled beats ParseFailure beats Fault. Only the first fault is kept.
    fn classify_batch(&self, members: Vec<DispatchError>) -> ExecutionOutcome {
        let leaves: Vec<DispatchError> = members
            .into_iter()
            .flat_map(DispatchError::flatten)
            .collect();
        debug!("classifying {} batched failures", leaves.len());

        if leaves.iter().any(|e| matches!(e, DispatchError::Cancelled)) {
            return self.cancelled();
        }

        let mut faults = Vec::new();
        let mut parse_failure = None;
        for leaf in leaves {
            match leaf {
                DispatchError::Parse(e) => {
                    parse_failure.get_or_insert(e);
                }
                other => faults.push(other),
            }
        }

        if let Some(e) = parse_failure {
            self.cancellation.cancel();
            error!("{}", e);
            return ExecutionOutcome::ParseFailure(e.to_string());
        }

        let mut faults = faults.into_iter();
        match faults.next() {
            Some(first) => {
                let dropped = faults.count();
                if dropped > 0 {
                    warn!("{} further faults in batch not escalated", dropped);
                }
                fault(first)
            }
            None => fault(DispatchError::Fault(anyhow::anyhow!("empty failure batch"))),
        }
    }

    fn cancelled(&self) -> ExecutionOutcome {
        self.cancellation.cancel();
        warn!("operation was cancelled");
        ExecutionOutcome::Cancelled
    }
}

fn fault(err: DispatchError) -> ExecutionOutcome {
    let err = err.into_anyhow();
    error!("unhandled fault: {:#}", err);
    ExecutionOutcome::Fault(Arc::new(err))
}
