//! Background drain loop

use super::{
    client::Client,
    dispatcher::Dispatcher,
    error::{LoggerError, Result},
    lifecycle::{WorkerEvent, WorkerState},
};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default pause between two drain cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Default shutdown timeout used when a worker is dropped while running
///
/// For custom timeout control, use [`Worker::shutdown`] instead.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_WORKER_NAME: &str = "log-dispatch-worker";

/// Stop flag plus a wake-up channel so `stop` cuts the inter-cycle wait short.
struct StopSignal {
    requested: AtomicBool,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl StopSignal {
    fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(1);
        Self {
            requested: AtomicBool::new(false),
            wake_tx,
            wake_rx,
        }
    }

    fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
        let _ = self.wake_tx.try_send(());
    }

    fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    fn wait(&self, timeout: Duration) {
        let _ = self.wake_rx.recv_timeout(timeout);
    }
}

/// Everything the loop thread needs, moved into it at start.
struct LoopContext {
    name: String,
    dispatcher: Arc<Dispatcher>,
    client: Arc<Client>,
    poll_interval: Duration,
    debug: bool,
    state: Arc<Mutex<WorkerState>>,
    signal: Arc<StopSignal>,
}

impl LoopContext {
    fn run(self) {
        while !self.signal.is_requested() {
            if let Err(e) = self.dispatcher.drain_once() {
                eprintln!("[LOGGER ERROR] {}: drain cycle aborted: {}", self.name, e);
            }
            self.signal.wait(self.poll_interval);
        }

        if self.debug {
            announce(&self.client, &self.name, "Stop.");
        }
        self.final_flush();

        let mut state = self.state.lock();
        match state.on(WorkerEvent::LoopExited) {
            Ok(next) => *state = next,
            Err(e) => eprintln!("[LOGGER ERROR] {}: {}", self.name, e),
        }
    }

    /// Drain until the queue is observed empty. Every failed attempt has
    /// consumed at least the item whose sink failed, so this terminates once
    /// producers are quiet.
    fn final_flush(&self) {
        loop {
            match self.dispatcher.drain_once() {
                Ok(_) => break,
                Err(e) => eprintln!("[LOGGER ERROR] {}: final flush step failed: {}", self.name, e),
            }
        }
    }
}

fn announce(client: &Client, name: &str, text: &str) {
    if let Err(e) = client.debug(format!("[{}] {}", name, text)) {
        eprintln!("[LOGGER WARNING] {}: lifecycle message not queued: {}", name, e);
    }
}

/// Single background thread that drains a [`Dispatcher`] at a fixed
/// interval and flushes once more after being stopped.
///
/// Items pushed before [`stop`](Worker::stop) is called are dispatched by the
/// time [`join`](Worker::join) returns. Items pushed after the final flush
/// has started may be lost, so stop producers first.
///
/// # Example
///
/// ```
/// use log_dispatch::prelude::*;
/// use std::sync::Arc;
///
/// let memory = MemorySink::new();
/// let dispatcher = Arc::new(Dispatcher::builder().sink(Severity::Info, memory.clone()).build());
/// let client = Arc::new(Client::new(Some("app")));
///
/// let mut worker = Worker::builder()
///     .dispatcher(Arc::clone(&dispatcher))
///     .client(Arc::clone(&client))
///     .build();
/// worker.start().unwrap();
///
/// client.info("started").unwrap();
/// worker.stop();
/// worker.join().unwrap();
///
/// assert_eq!(memory.lines(), vec!["[app] started"]);
/// ```
pub struct Worker {
    name: String,
    dispatcher: Option<Arc<Dispatcher>>,
    client: Option<Arc<Client>>,
    poll_interval: Duration,
    debug: bool,
    state: Arc<Mutex<WorkerState>>,
    signal: Arc<StopSignal>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Worker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: DEFAULT_WORKER_NAME.to_string(),
            dispatcher: None,
            client: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            debug: false,
            state: Arc::new(Mutex::new(WorkerState::Idle)),
            signal: Arc::new(StopSignal::new()),
            handle: None,
        }
    }

    #[must_use]
    pub fn builder() -> WorkerBuilder {
        WorkerBuilder::new()
    }

    /// Attach the dispatcher; an attached client is rebound to its queue.
    pub fn set_dispatcher(&mut self, dispatcher: Arc<Dispatcher>) {
        if let Some(client) = &self.client {
            client.bind(dispatcher.queue());
        }
        self.dispatcher = Some(dispatcher);
    }

    /// Attach the client; it is bound to the dispatcher's queue only if it
    /// has no queue of its own yet.
    pub fn set_client(&mut self, client: Arc<Client>) {
        if let Some(dispatcher) = &self.dispatcher {
            if !client.is_bound() {
                client.bind(dispatcher.queue());
            }
        }
        self.client = Some(client);
    }

    pub fn dispatcher(&self) -> Option<&Arc<Dispatcher>> {
        self.dispatcher.as_ref()
    }

    pub fn client(&self) -> Option<&Arc<Client>> {
        self.client.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock()
    }

    /// Spawn the loop thread.
    ///
    /// # Errors
    ///
    /// `MissingDependency` without both a dispatcher and a client,
    /// `InvalidState` when the worker was already started or stopped.
    pub fn start(&mut self) -> Result<()> {
        let dispatcher = self
            .dispatcher
            .clone()
            .ok_or_else(|| LoggerError::missing_dependency("dispatcher"))?;
        let client = self
            .client
            .clone()
            .ok_or_else(|| LoggerError::missing_dependency("client"))?;

        let mut state = self.state.lock();
        let next = state.on(WorkerEvent::Start)?;
        if self.debug {
            announce(&client, &self.name, "Start.");
        }

        let context = LoopContext {
            name: self.name.clone(),
            dispatcher,
            client,
            poll_interval: self.poll_interval,
            debug: self.debug,
            state: Arc::clone(&self.state),
            signal: Arc::clone(&self.signal),
        };
        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || context.run())
            .map_err(|e| {
                LoggerError::io_operation("starting dispatch worker", "cannot spawn thread", e)
            })?;

        *state = next;
        self.handle = Some(handle);
        Ok(())
    }

    /// Request the loop to stop after its current cycle.
    ///
    /// Does not wait; call [`join`](Worker::join) to be sure the final flush
    /// has happened.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if self.debug && *state == WorkerState::Running {
            if let Some(client) = &self.client {
                announce(client, &self.name, "stopping...");
            }
        }
        match state.on(WorkerEvent::Stop) {
            Ok(next) => *state = next,
            Err(e) => eprintln!("[LOGGER WARNING] {}: {}", self.name, e),
        }
        drop(state);
        self.signal.request();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Wait for the loop thread to exit. Blocks until [`stop`](Worker::stop)
    /// has been called from somewhere.
    pub fn join(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| LoggerError::WorkerPanicked)?;
        }
        Ok(())
    }

    /// Stop the worker and wait up to `timeout` for its final flush.
    ///
    /// Returns `true` if the loop exited within the timeout.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        self.stop();

        let start = Instant::now();
        while !self.is_finished() {
            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] {} did not finish within {:?}. Some logs may be lost.",
                    self.name, timeout
                );
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }

        match self.join() {
            Ok(()) => true,
            Err(e) => {
                eprintln!("[LOGGER ERROR] {}: {}", self.name, e);
                false
            }
        }
    }
}

impl Default for Worker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
        }
    }
}

/// Builder for constructing a [`Worker`] with a fluent API
pub struct WorkerBuilder {
    name: String,
    dispatcher: Option<Arc<Dispatcher>>,
    client: Option<Arc<Client>>,
    poll_interval: Duration,
    debug: bool,
}

impl WorkerBuilder {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_WORKER_NAME.to_string(),
            dispatcher: None,
            client: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            debug: false,
        }
    }

    /// Thread name, also used as the prefix of lifecycle messages
    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn dispatcher(mut self, dispatcher: Arc<Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn client(mut self, client: Arc<Client>) -> Self {
        self.client = Some(client);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Enqueue `Start.`, `stopping...` and `Stop.` at DEBUG through the client
    #[must_use = "builder methods return a new value"]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn build(self) -> Worker {
        let mut worker = Worker::new();
        worker.name = self.name;
        worker.poll_interval = self.poll_interval;
        worker.debug = self.debug;
        if let Some(dispatcher) = self.dispatcher {
            worker.set_dispatcher(dispatcher);
        }
        if let Some(client) = self.client {
            worker.set_client(client);
        }
        worker
    }
}

impl Default for WorkerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
