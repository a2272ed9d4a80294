//! Process-wide default bus.
//!
//! Every function here forwards to one lazily created [`EventBus`] with the
//! default configuration. Libraries should prefer passing an explicit bus
//! around; the facade exists for application glue code.

use crate::bus::EventBus;
use crate::error::Result;
use crate::key::EventKey;
use crate::listener::IntoListener;
use crate::subscriber::Subscriber;
use std::any::Any;
use std::sync::{Arc, LazyLock};

static GLOBAL_BUS: LazyLock<EventBus> = LazyLock::new(EventBus::new);

/// The process-wide bus.
#[must_use]
pub fn global() -> &'static EventBus {
    &GLOBAL_BUS
}

/// Creates a bus that shares nothing with the global one.
#[must_use]
pub fn new_events() -> EventBus {
    EventBus::new()
}

/// [`EventBus::listen`] on the global bus.
///
/// # Errors
/// See [`EventBus::listen`].
pub fn listen<M>(key: impl Into<EventKey>, listener: impl IntoListener<M>) -> Result<()> {
    GLOBAL_BUS.listen(key, listener)
}

/// [`EventBus::listen_type`] on the global bus.
///
/// # Errors
/// See [`EventBus::listen_type`].
pub fn listen_type<M, L>(listener: L) -> Result<()>
where
    L: IntoListener<M>,
    L::Event: Sized + Any,
{
    GLOBAL_BUS.listen_type(listener)
}

/// [`EventBus::listen_any`] on the global bus.
///
/// # Errors
/// See [`EventBus::listen_any`].
pub fn listen_any(key: impl Into<EventKey>, listener: Box<dyn Any + Send + Sync>) -> Result<()> {
    GLOBAL_BUS.listen_any(key, listener)
}

/// [`EventBus::dispatch`] on the global bus.
///
/// # Errors
/// See [`EventBus::dispatch`].
pub fn dispatch<P: Any + Send + Sync>(key: impl Into<EventKey>, payload: P) -> Result<usize> {
    GLOBAL_BUS.dispatch(key, payload)
}

/// [`EventBus::dispatch_value`] on the global bus.
///
/// # Errors
/// See [`EventBus::dispatch`].
pub fn dispatch_value<T: Any + Send + Sync>(value: T) -> Result<usize> {
    GLOBAL_BUS.dispatch_value(value)
}

/// [`EventBus::subscribe`] on the global bus.
///
/// # Errors
/// See [`EventBus::subscribe`].
pub fn subscribe<S: Subscriber>(subscriber: S) -> Result<()> {
    GLOBAL_BUS.subscribe(subscriber)
}

/// [`EventBus::subscribe_shared`] on the global bus.
///
/// # Errors
/// See [`EventBus::subscribe`].
pub fn subscribe_shared<S: Subscriber>(subscriber: Arc<S>) -> Result<()> {
    GLOBAL_BUS.subscribe_shared(subscriber)
}
