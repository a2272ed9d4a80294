use crate::config::{EventBusConfig, FailurePolicy};
use crate::error::{EventBusError, Result};
use crate::key::EventKey;
use crate::listener::{IntoListener, Listener};
use crate::payload::Payload;
use crate::subscriber::{Subscriber, Subscription};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

type Registry = FxHashMap<EventKey, Vec<Listener>>;

/// A thread-safe, synchronous event bus.
///
/// Listeners are indexed by [`EventKey`] and invoked in registration order on
/// the dispatching thread. Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    listeners: Arc<RwLock<Registry>>,
    config: Arc<EventBusConfig>,
}

impl EventBus {
    /// Creates a new, empty `EventBus` with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty `EventBus`.
    ///
    /// # Examples
    /// ```rust
    /// use herald::{EventBus, EventBusConfig, EventBusError};
    ///
    /// let bus = EventBus::with_config(EventBusConfig::isolated());
    /// bus.listen("job", |_: &u8| -> Result<(), &'static str> { Err("boom") }).unwrap();
    /// bus.listen("job", |_: &u8| {}).unwrap();
    ///
    /// let err = bus.dispatch("job", 1_u8).unwrap_err();
    /// assert!(matches!(err, EventBusError::ListenersFailed { .. }));
    /// ```
    #[must_use]
    pub fn with_config(config: EventBusConfig) -> Self {
        Self { listeners: Arc::default(), config: Arc::new(config) }
    }

    #[must_use]
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    /// Registers a listener under a name or type key.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidEventName`] if `key` is an empty name.
    ///
    /// # Examples
    /// ```rust
    /// use herald::EventBus;
    ///
    /// # fn main() -> herald::Result<()> {
    /// let bus = EventBus::new();
    /// bus.listen("user.created", |id: &u64, event: &str| {
    ///     assert_eq!((*id, event), (7, "user.created"));
    /// })?;
    /// assert_eq!(bus.dispatch("user.created", 7_u64)?, 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn listen<M>(&self, key: impl Into<EventKey>, listener: impl IntoListener<M>) -> Result<()> {
        self.insert(key.into(), listener.into_listener())
    }

    /// Registers a listener under the type key of the payload it accepts.
    ///
    /// # Errors
    /// Type keys are always valid; the signature mirrors [`EventBus::listen`].
    ///
    /// # Examples
    /// ```rust
    /// use herald::EventBus;
    ///
    /// struct OrderPlaced { id: u64 }
    ///
    /// # fn main() -> herald::Result<()> {
    /// let bus = EventBus::new();
    /// bus.listen_type(|order: &OrderPlaced, event: &str| {
    ///     assert_eq!(order.id, 9);
    ///     assert!(event.ends_with("OrderPlaced"));
    /// })?;
    /// assert_eq!(bus.dispatch_value(OrderPlaced { id: 9 })?, 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn listen_type<M, L>(&self, listener: L) -> Result<()>
    where
        L: IntoListener<M>,
        L::Event: Sized + Any,
    {
        self.insert(EventKey::of::<L::Event>(), listener.into_listener())
    }

    /// Registers a type-erased listener, resolving its shape at runtime.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidListener`] if `listener` is not one of
    /// the shapes accepted by [`Listener::from_any`], or
    /// [`EventBusError::InvalidEventName`] if `key` is an empty name.
    pub fn listen_any(
        &self,
        key: impl Into<EventKey>,
        listener: Box<dyn Any + Send + Sync>,
    ) -> Result<()> {
        let key = key.into();
        let listener = Listener::from_any(listener).map_err(|err| match err {
            EventBusError::InvalidListener { message, .. } => EventBusError::InvalidListener {
                message,
                context: Some(format!("event `{key}`").into()),
            },
            other => other,
        })?;
        self.insert(key, listener)
    }

    /// Dispatches `payload` to every listener matching `key`.
    ///
    /// A name ending in `.*` reaches every name key below that namespace, in
    /// ascending key order. Returns the number of listeners invoked.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidEventName`] for an empty name. Listener
    /// failures are reported according to the bus's [`FailurePolicy`].
    ///
    /// # Examples
    /// ```rust
    /// use herald::EventBus;
    ///
    /// # fn main() -> herald::Result<()> {
    /// let bus = EventBus::new();
    /// bus.listen("many.a", |_: &()| {})?;
    /// bus.listen("many.b", |_: &()| {})?;
    /// bus.listen("manyx", |_: &()| {})?;
    /// assert_eq!(bus.dispatch("many.*", ())?, 2);
    /// assert_eq!(bus.dispatch("nobody", ())?, 0);
    /// # Ok(())
    /// # }
    /// ```
    pub fn dispatch<P: Any + Send + Sync>(&self, key: impl Into<EventKey>, payload: P) -> Result<usize> {
        self.dispatch_dyn(&key.into(), &payload)
    }

    /// Dispatches `value` under its own type key; the value is the payload.
    ///
    /// # Errors
    /// See [`EventBus::dispatch`].
    pub fn dispatch_value<T: Any + Send + Sync>(&self, value: T) -> Result<usize> {
        self.dispatch_dyn(&EventKey::of::<T>(), &value)
    }

    /// Dispatches an already type-erased payload.
    ///
    /// # Errors
    /// See [`EventBus::dispatch`].
    pub fn dispatch_dyn(&self, key: &EventKey, payload: &Payload) -> Result<usize> {
        key.validate()?;

        let targets = self.resolve(key);
        if targets.is_empty() {
            trace!(event = %key, "Event dropped: no listeners");
            return Ok(0);
        }

        match self.config.failure_policy {
            FailurePolicy::Propagate => {
                for (name, listener) in &targets {
                    listener.invoke(payload, name.as_str())?;
                }
            },
            FailurePolicy::Isolate => invoke_isolated(key, &targets, payload)?,
        }

        trace!(event = %key, count = targets.len(), "Event dispatched");
        Ok(targets.len())
    }

    /// Registers a subscriber's listeners; see [`Subscriber`].
    ///
    /// # Errors
    /// Returns [`EventBusError::NotSubscriber`] if the subscriber has neither a
    /// manual hook nor any method named like a handler, or whatever its manual
    /// hook returns. Handler methods with an unsupported signature are skipped.
    pub fn subscribe<S: Subscriber>(&self, subscriber: S) -> Result<()> {
        self.subscribe_shared(Arc::new(subscriber))
    }

    /// Like [`EventBus::subscribe`], keeping a handle on the subscriber.
    ///
    /// # Errors
    /// See [`EventBus::subscribe`].
    pub fn subscribe_shared<S: Subscriber>(&self, subscriber: Arc<S>) -> Result<()> {
        let subscriber_name = std::any::type_name::<S>();

        let (prefix, handlers) = match S::subscription() {
            Subscription::Manual(hook) => {
                debug!(subscriber = subscriber_name, "Delegating to manual subscription");
                return hook(&subscriber, self);
            },
            Subscription::Discover { marked: false, .. } => {
                return Err(EventBusError::NotSubscriber {
                    message: "no handler methods and no `subscribe` hook".into(),
                    context: Some(subscriber_name.into()),
                });
            },
            Subscription::Discover { prefix, handlers, .. } => (prefix, handlers),
        };

        if handlers.is_empty() {
            debug!(subscriber = subscriber_name, "No handler method has a supported signature");
            return Ok(());
        }

        let prefix = prefix.map(|prefix| prefix(&subscriber)).unwrap_or_default();
        let entries = handlers
            .iter()
            .map(|method| {
                let key = EventKey::named(format!("{prefix}{}", method.event()));
                key.validate()?;
                Ok((key, method.bind(Arc::clone(&subscriber))))
            })
            .collect::<Result<Vec<_>>>()?;

        {
            let mut listeners = self.listeners.write();
            for (key, listener) in entries {
                trace!(event = %key, shape = ?listener.shape(), subscriber = subscriber_name, "Listener registered");
                listeners.entry(key).or_default().push(listener);
            }
        }

        debug!(subscriber = subscriber_name, %prefix, handlers = handlers.len(), "Subscriber registered");
        Ok(())
    }

    /// Whether any listener is registered under exactly `key`.
    #[must_use]
    pub fn has_listeners(&self, key: impl Into<EventKey>) -> bool {
        self.listener_count(key) > 0
    }

    /// Number of listeners registered under exactly `key`.
    #[must_use]
    pub fn listener_count(&self, key: impl Into<EventKey>) -> usize {
        self.listeners.read().get(&key.into()).map_or(0, Vec::len)
    }

    /// Snapshot of every key with at least one listener.
    #[must_use]
    pub fn keys(&self) -> Vec<EventKey> {
        self.listeners.read().keys().cloned().collect()
    }

    /// Removes every listener registered under exactly `key`.
    ///
    /// Returns the number of listeners removed.
    pub fn forget(&self, key: impl Into<EventKey>) -> usize {
        let key = key.into();
        let removed = self.listeners.write().remove(&key).map_or(0, |listeners| listeners.len());
        trace!(event = %key, removed, "Listeners forgotten");
        removed
    }

    /// Drops every listener.
    ///
    /// Returns the number of keys that were cleared.
    pub fn clear(&self) -> usize {
        let count = {
            let mut listeners = self.listeners.write();
            let count = listeners.len();
            listeners.clear();
            count
        };
        debug!(keys = count, "Event bus cleared");
        count
    }

    fn insert(&self, key: EventKey, listener: Listener) -> Result<()> {
        key.validate()?;
        trace!(event = %key, shape = ?listener.shape(), listener = listener.target(), "Listener registered");
        self.listeners.write().entry(key).or_default().push(listener);
        Ok(())
    }

    /// Snapshots the listeners matching `key`, each paired with its own key.
    /// The lock is released before any listener runs.
    fn resolve(&self, key: &EventKey) -> Vec<(EventKey, Listener)> {
        let listeners = self.listeners.read();

        if self.config.wildcards
            && let Some(namespace) = key.wildcard_namespace()
        {
            let mut matched: Vec<_> = listeners.iter().filter(|(k, _)| k.is_under(namespace)).collect();
            matched.sort_unstable_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
            return matched
                .into_iter()
                .flat_map(|(k, entries)| entries.iter().map(move |l| (k.clone(), l.clone())))
                .collect();
        }

        listeners
            .get(key)
            .map(|entries| entries.iter().map(|l| (key.clone(), l.clone())).collect())
            .unwrap_or_default()
    }
}

fn invoke_isolated(key: &EventKey, targets: &[(EventKey, Listener)], payload: &Payload) -> Result<()> {
    let mut failures = 0_usize;

    for (name, listener) in targets {
        match panic::catch_unwind(AssertUnwindSafe(|| listener.invoke(payload, name.as_str()))) {
            Ok(Ok(())) => {},
            Ok(Err(err @ EventBusError::PayloadMismatch { .. })) => {
                failures += 1;
                warn!(event = %name, listener = listener.target(), error = %err, "Listener skipped");
            },
            Ok(Err(err)) => {
                failures += 1;
                error!(event = %name, listener = listener.target(), error = %err, "Listener failed");
            },
            Err(panic) => {
                failures += 1;
                error!(
                    event = %name,
                    listener = listener.target(),
                    panic = panic_message(panic.as_ref()),
                    "Listener panicked"
                );
            },
        }
    }

    if failures == 0 {
        return Ok(());
    }
    Err(EventBusError::ListenersFailed {
        message: format!("{failures} of {} listeners failed", targets.len()).into(),
        context: Some(format!("event `{key}`").into()),
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
