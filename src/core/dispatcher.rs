//! Severity-routed fan-out from the queue to sinks

use super::{
    error::Result,
    message::Message,
    metrics::DispatchMetrics,
    queue::{LogQueue, QueueItem},
    severity::{IntoSeverity, Severity},
    sink::Sink,
};
use crate::sinks::{StderrSink, StdoutSink};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::BTreeMap;
use std::sync::Arc;

/// How custom registrations interact with the built-in default table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    /// Once any custom route exists, only the custom table is consulted.
    /// Levels without a custom entry then reach no sink.
    #[default]
    Exclusive,
    /// Custom entries replace the default list per level; other levels keep
    /// their default sinks.
    Merge,
}

struct RegisteredSink {
    kind: TypeId,
    sink: Box<dyn Sink>,
}

impl RegisteredSink {
    fn new<S: Sink + 'static>(sink: S) -> Self {
        Self {
            kind: TypeId::of::<S>(),
            sink: Box::new(sink),
        }
    }
}

type RoutingTable = BTreeMap<Severity, Vec<RegisteredSink>>;

#[derive(Default)]
struct Routes {
    defaults: RoutingTable,
    custom: RoutingTable,
}

impl Routes {
    fn uses_custom(&self, mode: RoutingMode, level: Severity) -> bool {
        match mode {
            RoutingMode::Exclusive => !self.custom.is_empty(),
            RoutingMode::Merge => self.custom.get(&level).is_some_and(|s| !s.is_empty()),
        }
    }

    /// Sink list for `level` under `mode`, or `None` when nothing is routed
    fn resolve_mut(
        &mut self,
        mode: RoutingMode,
        level: Severity,
    ) -> Option<&mut Vec<RegisteredSink>> {
        if self.uses_custom(mode, level) {
            self.custom.get_mut(&level)
        } else {
            self.defaults.get_mut(&level)
        }
    }

    fn resolve(&self, mode: RoutingMode, level: Severity) -> Option<&Vec<RegisteredSink>> {
        if self.uses_custom(mode, level) {
            self.custom.get(&level)
        } else {
            self.defaults.get(&level)
        }
    }

    fn register(&mut self, level: Severity, entry: RegisteredSink) {
        let sinks = self.custom.entry(level).or_default();
        match sinks.iter_mut().find(|s| s.kind == entry.kind) {
            Some(existing) => *existing = entry,
            None => sinks.push(entry),
        }
    }

    fn all_mut(&mut self) -> impl Iterator<Item = &mut RegisteredSink> {
        self.defaults
            .values_mut()
            .chain(self.custom.values_mut())
            .flat_map(|sinks| sinks.iter_mut())
    }
}

/// Owns the queue and the routing tables, and drains one into the other.
///
/// Routing tables are guarded by a read-write lock taken once per item, so
/// `add_sink` may be called while a worker is draining: the registration
/// lands between two items and the table is never observed half-updated.
/// A sink error aborts the drain in progress and is returned to the caller;
/// items still queued stay queued for the next cycle.
pub struct Dispatcher {
    queue: Arc<LogQueue>,
    routes: RwLock<Routes>,
    mode: RoutingMode,
    metrics: Arc<DispatchMetrics>,
}

impl Dispatcher {
    /// Dispatcher with the stdout/stderr default table and exclusive routing
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Register `sink` for `level` in the custom table.
    ///
    /// A sink of the same concrete type already registered for the level is
    /// replaced at its position; otherwise the sink is appended.
    pub fn add_sink<S: Sink + 'static>(&self, level: impl IntoSeverity, sink: S) -> Result<()> {
        let level = level.into_severity()?;
        self.routes.write().register(level, RegisteredSink::new(sink));
        Ok(())
    }

    /// Pop until the queue is observed empty, sending every item to its
    /// resolved sinks in registration order. Returns the number of items
    /// dispatched.
    pub fn drain_once(&self) -> Result<usize> {
        self.metrics.record_drain_cycle();
        let mut count = 0;
        while let Some(item) = self.queue.pop() {
            self.dispatch_item(&item)?;
            count += 1;
        }
        if count > 0 {
            self.flush()?;
        }
        Ok(count)
    }

    /// Send every line of `message` to the sinks resolved for its severity,
    /// bypassing the queue.
    pub fn dispatch(&self, message: &Message) -> Result<()> {
        for line in message.lines() {
            self.send_line(message.severity(), line)?;
        }
        self.flush()
    }

    fn dispatch_item(&self, item: &QueueItem) -> Result<()> {
        self.metrics.record_dispatched();
        self.send_line(item.severity, &item.text)
    }

    fn send_line(&self, level: Severity, text: &str) -> Result<()> {
        let mut routes = self.routes.write();
        let sinks = match routes.resolve_mut(self.mode, level) {
            Some(sinks) if !sinks.is_empty() => sinks,
            _ => {
                self.metrics.record_unrouted();
                return Ok(());
            }
        };
        for entry in sinks.iter_mut() {
            if let Err(e) = entry.sink.send(text) {
                self.metrics.record_sink_failure();
                return Err(e);
            }
            self.metrics.record_sink_write();
        }
        Ok(())
    }

    /// Flush every registered sink, default and custom.
    pub fn flush(&self) -> Result<()> {
        let mut routes = self.routes.write();
        for entry in routes.all_mut() {
            if let Err(e) = entry.sink.flush() {
                self.metrics.record_sink_failure();
                return Err(e);
            }
        }
        Ok(())
    }

    /// Names of the sinks an item at `level` would reach, in send order
    pub fn resolved_sink_names(&self, level: Severity) -> Vec<String> {
        let routes = self.routes.read();
        routes
            .resolve(self.mode, level)
            .map(|sinks| sinks.iter().map(|e| e.sink.name().to_string()).collect())
            .unwrap_or_default()
    }

    /// True once any custom route has been registered
    pub fn has_custom_routes(&self) -> bool {
        !self.routes.read().custom.is_empty()
    }

    pub fn routing_mode(&self) -> RoutingMode {
        self.mode
    }

    pub fn queue(&self) -> Arc<LogQueue> {
        Arc::clone(&self.queue)
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

type SinkFactory = Box<dyn Fn() -> RegisteredSink>;

/// Builder for constructing a [`Dispatcher`]
///
/// # Example
/// ```
/// use log_dispatch::prelude::*;
///
/// let memory = MemorySink::new();
/// let dispatcher = Dispatcher::builder()
///     .routing_mode(RoutingMode::Merge)
///     .sink(Severity::Error, memory.clone())
///     .build();
///
/// assert_eq!(dispatcher.resolved_sink_names(Severity::Error), vec!["memory"]);
/// assert_eq!(dispatcher.resolved_sink_names(Severity::Info), vec!["stdout"]);
/// ```
pub struct DispatcherBuilder {
    mode: RoutingMode,
    queue: Option<Arc<LogQueue>>,
    primary: SinkFactory,
    secondary: SinkFactory,
    custom: Vec<(Severity, RegisteredSink)>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            mode: RoutingMode::default(),
            queue: None,
            primary: Box::new(|| RegisteredSink::new(StdoutSink::new())),
            secondary: Box::new(|| RegisteredSink::new(StderrSink::new())),
            custom: Vec::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn routing_mode(mut self, mode: RoutingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Drain an existing queue instead of creating a fresh one
    #[must_use = "builder methods return a new value"]
    pub fn queue(mut self, queue: Arc<LogQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Replace the sink kinds used by the default table.
    ///
    /// `primary` stands in for stdout and `secondary` for stderr; each
    /// factory is called once per default route so no two levels share a
    /// sink instance.
    #[must_use = "builder methods return a new value"]
    pub fn default_sinks<P, S>(
        mut self,
        primary: impl Fn() -> P + 'static,
        secondary: impl Fn() -> S + 'static,
    ) -> Self
    where
        P: Sink + 'static,
        S: Sink + 'static,
    {
        self.primary = Box::new(move || RegisteredSink::new(primary()));
        self.secondary = Box::new(move || RegisteredSink::new(secondary()));
        self
    }

    /// Register a custom route, with the same semantics as
    /// [`Dispatcher::add_sink`]
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, level: Severity, sink: S) -> Self {
        self.custom.push((level, RegisteredSink::new(sink)));
        self
    }

    pub fn build(self) -> Dispatcher {
        let mut routes = Routes::default();
        for level in [Severity::Info, Severity::Warning, Severity::Notice] {
            routes.defaults.insert(level, vec![(self.primary)()]);
        }
        routes.defaults.insert(Severity::Debug, vec![(self.secondary)()]);
        for level in [
            Severity::Error,
            Severity::Critical,
            Severity::Alert,
            Severity::Emergency,
        ] {
            routes
                .defaults
                .insert(level, vec![(self.primary)(), (self.secondary)()]);
        }
        for (level, entry) in self.custom {
            routes.register(level, entry);
        }

        Dispatcher {
            queue: self.queue.unwrap_or_else(|| Arc::new(LogQueue::new())),
            routes: RwLock::new(routes),
            mode: self.mode,
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LoggerError;
    use crate::sinks::MemorySink;

    struct FailingSink;

    impl Sink for FailingSink {
        fn send(&mut self, _text: &str) -> Result<()> {
            Err(LoggerError::writer("sink offline"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// Default table backed by two memory sinks: (dispatcher, primary, secondary)
    fn observed_defaults(mode: RoutingMode) -> (Dispatcher, MemorySink, MemorySink) {
        let primary = MemorySink::named("primary");
        let secondary = MemorySink::named("secondary");
        let (p, s) = (primary.clone(), secondary.clone());
        let dispatcher = Dispatcher::builder()
            .routing_mode(mode)
            .default_sinks(move || p.clone(), move || s.clone())
            .build();
        (dispatcher, primary, secondary)
    }

    #[test]
    fn test_default_table_layout() {
        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.resolved_sink_names(Severity::Info), vec!["stdout"]);
        assert_eq!(dispatcher.resolved_sink_names(Severity::Warning), vec!["stdout"]);
        assert_eq!(dispatcher.resolved_sink_names(Severity::Notice), vec!["stdout"]);
        assert_eq!(dispatcher.resolved_sink_names(Severity::Debug), vec!["stderr"]);
        for level in [Severity::Error, Severity::Critical, Severity::Alert, Severity::Emergency] {
            assert_eq!(dispatcher.resolved_sink_names(level), vec!["stdout", "stderr"]);
        }
        assert!(!dispatcher.has_custom_routes());
    }

    #[test]
    fn test_default_routing_delivers() {
        let (dispatcher, primary, secondary) = observed_defaults(RoutingMode::Exclusive);
        let queue = dispatcher.queue();
        queue.push(Severity::Info, "[db] ready").unwrap();
        queue.push(Severity::Error, "boom").unwrap();

        assert_eq!(dispatcher.drain_once().unwrap(), 2);
        assert_eq!(primary.lines(), vec!["[db] ready", "boom"]);
        assert_eq!(secondary.lines(), vec!["boom"]);
    }

    #[test]
    fn test_custom_route_is_exclusive() {
        let (dispatcher, primary, secondary) = observed_defaults(RoutingMode::Exclusive);
        let custom = MemorySink::new();
        dispatcher.add_sink(Severity::Error, custom.clone()).unwrap();

        let queue = dispatcher.queue();
        queue.push(Severity::Debug, "dropped").unwrap();
        queue.push(Severity::Error, "kept").unwrap();
        dispatcher.drain_once().unwrap();

        assert_eq!(custom.lines(), vec!["kept"]);
        assert!(primary.is_empty());
        assert!(secondary.is_empty());
        assert_eq!(dispatcher.metrics().unrouted(), 1);
        assert!(dispatcher.resolved_sink_names(Severity::Debug).is_empty());
    }

    #[test]
    fn test_merge_mode_falls_back_to_defaults() {
        let (dispatcher, primary, secondary) = observed_defaults(RoutingMode::Merge);
        let custom = MemorySink::new();
        dispatcher.add_sink("ERROR", custom.clone()).unwrap();

        let queue = dispatcher.queue();
        queue.push(Severity::Debug, "to stderr").unwrap();
        queue.push(Severity::Error, "to custom").unwrap();
        dispatcher.drain_once().unwrap();

        assert_eq!(custom.lines(), vec!["to custom"]);
        assert!(primary.is_empty());
        assert_eq!(secondary.lines(), vec!["to stderr"]);
    }

    #[test]
    fn test_same_kind_replaced_in_place() {
        let dispatcher = Dispatcher::new();
        let first = MemorySink::named("first");
        let second = MemorySink::named("second");

        dispatcher.add_sink(Severity::Info, first.clone()).unwrap();
        dispatcher.add_sink(Severity::Info, StdoutSink::new()).unwrap();
        dispatcher.add_sink(Severity::Info, second.clone()).unwrap();

        assert_eq!(
            dispatcher.resolved_sink_names(Severity::Info),
            vec!["second", "stdout"]
        );

        dispatcher.queue().push(Severity::Info, "x").unwrap();
        dispatcher.drain_once().unwrap();
        assert!(first.is_empty());
        assert_eq!(second.lines(), vec!["x"]);
    }

    #[test]
    fn test_add_sink_rejects_invalid_level() {
        let dispatcher = Dispatcher::new();
        let err = dispatcher.add_sink("VERBOSE", MemorySink::new()).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidSeverity { .. }));
        assert!(!dispatcher.has_custom_routes());
    }

    #[test]
    fn test_sink_error_aborts_cycle_and_keeps_rest_queued() {
        let dispatcher = Dispatcher::new();
        let memory = MemorySink::new();
        dispatcher.add_sink(Severity::Warning, FailingSink).unwrap();
        dispatcher.add_sink(Severity::Info, memory.clone()).unwrap();

        let queue = dispatcher.queue();
        queue.push(Severity::Warning, "fails").unwrap();
        queue.push(Severity::Info, "waits").unwrap();

        assert!(dispatcher.drain_once().is_err());
        assert_eq!(queue.len(), 1);
        assert_eq!(dispatcher.metrics().sink_failures(), 1);

        assert_eq!(dispatcher.drain_once().unwrap(), 1);
        assert_eq!(memory.lines(), vec!["waits"]);
    }

    #[test]
    fn test_dispatch_message_directly() {
        let dispatcher = Dispatcher::new();
        let memory = MemorySink::new();
        dispatcher.add_sink(Severity::Notice, memory.clone()).unwrap();

        let message = Message::new(Severity::Notice, ["a", "b"]).unwrap();
        dispatcher.dispatch(&message).unwrap();
        dispatcher
            .dispatch(&Message::new(Severity::Notice, None::<String>).unwrap())
            .unwrap();

        assert_eq!(memory.lines(), vec!["a", "b"]);
        assert!(dispatcher.queue().is_empty());
    }

    #[test]
    fn test_builder_routes_and_shared_queue() {
        let queue = Arc::new(LogQueue::new());
        let memory = MemorySink::new();
        let dispatcher = Dispatcher::builder()
            .queue(Arc::clone(&queue))
            .sink(Severity::Alert, memory.clone())
            .build();

        queue.push(Severity::Alert, "shared").unwrap();
        dispatcher.drain_once().unwrap();

        assert!(dispatcher.has_custom_routes());
        assert_eq!(memory.lines(), vec!["shared"]);
    }
}
