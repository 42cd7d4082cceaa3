//! Generic application host
//!
//! Drives hosted services through start → started → (shutdown request) →
//! stopping → stop → stopped. The host owns the sequencing; services only
//! react to the lifetime notifications and ask for shutdown.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::domain::CancellationSignal;
use crate::infrastructure::InfraResult;

type Hook = Box<dyn FnOnce() + Send>;

/// Cloneable handle to the host's lifetime notifications.
#[derive(Clone, Default)]
pub struct HostLifetime {
    inner: Arc<LifetimeInner>,
}

#[derive(Default)]
struct LifetimeInner {
    started: Mutex<Vec<Hook>>,
    stopping: Mutex<Vec<Hook>>,
    stopped: Mutex<Vec<Hook>>,
    shutdown: Notify,
    shutdown_requested: AtomicBool,
    shutdown_requests: AtomicUsize,
}

impl HostLifetime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` once the host has started all services.
    pub fn on_started(&self, hook: impl FnOnce() + Send + 'static) {
        push_hook(&self.inner.started, Box::new(hook));
    }

    /// Run `hook` when shutdown begins, before services are stopped.
    pub fn on_stopping(&self, hook: impl FnOnce() + Send + 'static) {
        push_hook(&self.inner.stopping, Box::new(hook));
    }

    /// Run `hook` after all services have stopped.
    pub fn on_stopped(&self, hook: impl FnOnce() + Send + 'static) {
        push_hook(&self.inner.stopped, Box::new(hook));
    }

    /// Ask the host to shut down. Safe to call any number of times.
    pub fn stop_application(&self) {
        self.inner.shutdown_requests.fetch_add(1, Ordering::SeqCst);
        if !self.inner.shutdown_requested.swap(true, Ordering::SeqCst) {
            debug!("shutdown requested");
            // notify_one keeps a permit if nobody is waiting yet
            self.inner.shutdown.notify_one();
        }
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.inner.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Number of `stop_application` calls so far.
    pub fn shutdown_request_count(&self) -> usize {
        self.inner.shutdown_requests.load(Ordering::SeqCst)
    }

    /// Completes once shutdown has been requested.
    pub async fn shutdown_requested(&self) {
        if self.is_shutdown_requested() {
            return;
        }
        self.inner.shutdown.notified().await;
    }

    fn notify_started(&self) {
        fire(&self.inner.started);
    }

    fn notify_stopping(&self) {
        fire(&self.inner.stopping);
    }

    fn notify_stopped(&self) {
        fire(&self.inner.stopped);
    }
}

fn push_hook(hooks: &Mutex<Vec<Hook>>, hook: Hook) {
    match hooks.lock() {
        Ok(mut guard) => guard.push(hook),
        Err(poisoned) => poisoned.into_inner().push(hook),
    }
}

fn fire(hooks: &Mutex<Vec<Hook>>) {
    let drained: Vec<Hook> = match hooks.lock() {
        Ok(mut guard) => guard.drain(..).collect(),
        Err(poisoned) => poisoned.into_inner().drain(..).collect(),
    };
    for hook in drained {
        hook();
    }
}

/// A long-lived component started and stopped by the [`Host`].
#[async_trait]
pub trait HostedService: Send + Sync {
    async fn start(&self) -> InfraResult<()>;
    async fn stop(&self);
}

/// Runs hosted services until one of them (or an interrupt) requests shutdown.
pub struct Host {
    lifetime: HostLifetime,
    interrupt: Option<CancellationSignal>,
    listen_for_interrupt: bool,
}

impl Host {
    pub fn new(lifetime: HostLifetime) -> Self {
        Self {
            lifetime,
            interrupt: None,
            listen_for_interrupt: true,
        }
    }

    /// Signal triggered by the first Ctrl-C. A second Ctrl-C forces shutdown.
    pub fn with_cancellation(mut self, signal: CancellationSignal) -> Self {
        self.interrupt = Some(signal);
        self
    }

    /// Disable Ctrl-C handling (tests, embedding).
    pub fn without_interrupt_handler(mut self) -> Self {
        self.listen_for_interrupt = false;
        self
    }

    pub fn lifetime(&self) -> &HostLifetime {
        &self.lifetime
    }

    pub async fn run(&self, services: &[Arc<dyn HostedService>]) -> InfraResult<()> {
        for service in services {
            service.start().await?;
        }
        self.lifetime.notify_started();

        self.wait_for_shutdown().await;

        self.lifetime.notify_stopping();
        for service in services.iter().rev() {
            service.stop().await;
        }
        self.lifetime.notify_stopped();
        Ok(())
    }

    async fn wait_for_shutdown(&self) {
        if !self.listen_for_interrupt {
            self.lifetime.shutdown_requested().await;
            return;
        }

        let mut interrupts = 0usize;
        loop {
            tokio::select! {
                _ = self.lifetime.shutdown_requested() => return,
                res = tokio::signal::ctrl_c() => {
                    if let Err(e) = res {
                        warn!("cannot listen for interrupt: {}", e);
                        self.lifetime.shutdown_requested().await;
                        return;
                    }
                    interrupts += 1;
                    match (&self.interrupt, interrupts) {
                        (Some(signal), 1) => {
                            warn!("interrupt received, cancelling");
                            signal.cancel();
                        }
                        _ => {
                            warn!("interrupt received, forcing shutdown");
                            self.lifetime.stop_application();
                        }
                    }
                }
            }
        }
    }
}
