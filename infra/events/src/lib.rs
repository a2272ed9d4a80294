//! # Herald
//!
//! An in-process, synchronous publish/subscribe event bus.
//!
//! ## Overview
//!
//! Listeners are registered under an [`EventKey`] (a string name or the
//! concrete type of a payload) and invoked in registration order, on the
//! dispatching thread, whenever a matching event is dispatched.
//!
//! ## Features
//!
//! * **Named events**: exact names plus `namespace.*` wildcard broadcasts.
//! * **Typed events**: keyed by the payload's Rust type.
//! * **Three listener shapes**: `Fn(&T)`, `Fn(&T, &str)` and [`Handle`] objects.
//! * **Subscribers**: `#[subscriber]` discovers `on_*` handler methods at compile time.
//! * **Failure policy**: propagate the first error, or isolate every listener.
//! * **Global facade**: a process-wide bus behind free functions.
//!
//! # Example
//!
//! ```rust
//! use herald::{EventBus, EventBusError, subscriber};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! #[derive(Debug)]
//! struct UserCreated { id: u64 }
//!
//! #[derive(Default)]
//! struct Stats { last: AtomicU64 }
//!
//! #[subscriber]
//! impl Stats {
//!     fn on_user_created(&self, user: &UserCreated) {
//!         self.last.store(user.id, Ordering::SeqCst);
//!     }
//! }
//!
//! fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     let stats = std::sync::Arc::new(Stats::default());
//!     bus.subscribe_shared(stats.clone())?;
//!
//!     bus.listen("audit.users", |user: &UserCreated, event: &str| {
//!         println!("{event}: {user:?}");
//!     })?;
//!
//!     bus.dispatch("UserCreated", UserCreated { id: 42 })?;
//!     assert_eq!(stats.last.load(Ordering::SeqCst), 42);
//!
//!     assert_eq!(bus.dispatch("audit.*", UserCreated { id: 7 })?, 1);
//!     Ok(())
//! }
//! ```

mod bus;
mod config;
mod error;
pub mod global;
mod key;
mod listener;
mod payload;
mod subscriber;

pub use bus::EventBus;
pub use config::{EventBusConfig, FailurePolicy};
pub use error::{BoxError, EventBusError, EventBusErrorExt, Result};
pub use global::{
    dispatch, dispatch_value, global, listen, listen_any, listen_type, new_events, subscribe,
    subscribe_shared,
};
pub use herald_derive::subscriber;
pub use key::{EventKey, TypeKey, WILDCARD_SUFFIX};
pub use listener::{
    DynHandler, Handle, HandlerMarker, IntoListener, IntoListenerResult, Listener, ListenerShape,
    NamedFn, PlainFn,
};
pub use payload::{FromPayload, Payload};
pub use subscriber::{HandlerMethod, IntoSubscribeResult, Subscriber, Subscription};
