use crate::bus::EventBus;
use crate::error::EventBusError;
use crate::listener::{IntoListenerResult, Listener, ListenerShape, failed};
use crate::payload::{FromPayload, Payload, downcast};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

type MethodInvoker<S> = dyn Fn(&S, &Payload, &str) -> crate::Result<()> + Send + Sync;

/// An object that registers its own listeners when handed to
/// [`EventBus::subscribe`].
///
/// Usually generated by [`#[herald::subscriber]`](macro@crate::subscriber) on an
/// inherent `impl` block, but it can be implemented by hand.
///
/// # Examples
/// ```rust
/// use herald::{EventBus, subscriber};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct Audit {
///     seen: AtomicUsize,
/// }
///
/// #[subscriber]
/// impl Audit {
///     fn event_prefix(&self) -> &'static str {
///         "audit."
///     }
///
///     fn on_login(&self, user: &String) {
///         assert_eq!(user, "root");
///         self.seen.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// # fn main() -> herald::Result<()> {
/// let bus = EventBus::new();
/// bus.subscribe(Audit::default())?;
/// assert_eq!(bus.dispatch("audit.Login", "root".to_owned())?, 1);
/// # Ok(())
/// # }
/// ```
pub trait Subscriber: Send + Sync + Sized + 'static {
    fn subscription() -> Subscription<Self>;
}

/// How a [`Subscriber`] wants to be registered.
pub enum Subscription<S> {
    /// The subscriber performs its own registration calls on the bus.
    /// No method discovery takes place.
    Manual(fn(&Arc<S>, &EventBus) -> crate::Result<()>),
    /// Register every handler method, each name prefixed by `prefix(&subscriber)`.
    ///
    /// `marked` records whether any method carried a handler name, including
    /// ones skipped for an unsupported signature.
    Discover { prefix: Option<fn(&S) -> String>, marked: bool, handlers: Vec<HandlerMethod<S>> },
}

impl<S> fmt::Debug for Subscription<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual(_) => f.write_str("Manual"),
            Self::Discover { prefix, marked, handlers } => f
                .debug_struct("Discover")
                .field("prefixed", &prefix.is_some())
                .field("marked", marked)
                .field("handlers", handlers)
                .finish(),
        }
    }
}

/// A handler method discovered on a subscriber, not yet bound to an instance.
pub struct HandlerMethod<S> {
    event: Cow<'static, str>,
    shape: ListenerShape,
    invoke: Arc<MethodInvoker<S>>,
}

impl<S: Send + Sync + 'static> HandlerMethod<S> {
    /// Method taking `(&self, &T)`.
    pub fn plain<T, R>(event: impl Into<Cow<'static, str>>, method: fn(&S, &T) -> R) -> Self
    where
        T: FromPayload + ?Sized + 'static,
        R: IntoListenerResult + 'static,
    {
        Self {
            event: event.into(),
            shape: ListenerShape::Plain,
            invoke: Arc::new(move |this: &S, payload: &Payload, event: &str| {
                method(this, downcast::<T>(payload, event)?)
                    .into_listener_result()
                    .map_err(|source| failed(source, event))
            }),
        }
    }

    /// Method taking `(&self, &T, &str)`; the last argument is the dispatched name.
    pub fn named<T, R>(event: impl Into<Cow<'static, str>>, method: fn(&S, &T, &str) -> R) -> Self
    where
        T: FromPayload + ?Sized + 'static,
        R: IntoListenerResult + 'static,
    {
        Self {
            event: event.into(),
            shape: ListenerShape::Named,
            invoke: Arc::new(move |this: &S, payload: &Payload, event: &str| {
                method(this, downcast::<T>(payload, event)?, event)
                    .into_listener_result()
                    .map_err(|source| failed(source, event))
            }),
        }
    }

    /// Bare event name, before any prefix is applied.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    #[must_use]
    pub const fn shape(&self) -> ListenerShape {
        self.shape
    }

    /// Binds the method to a shared subscriber instance.
    #[must_use]
    pub fn bind(&self, subscriber: Arc<S>) -> Listener {
        let invoke = Arc::clone(&self.invoke);
        Listener::from_parts(self.shape, std::any::type_name::<S>(), move |payload, event| {
            invoke(&subscriber, payload, event)
        })
    }
}

impl<S> fmt::Debug for HandlerMethod<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerMethod").field("event", &self.event).field("shape", &self.shape).finish()
    }
}

/// Return values accepted from a manual `subscribe` hook.
pub trait IntoSubscribeResult {
    /// # Errors
    /// Returns the hook's own error.
    fn into_subscribe_result(self) -> crate::Result<()>;
}

impl IntoSubscribeResult for () {
    #[inline]
    fn into_subscribe_result(self) -> crate::Result<()> {
        Ok(())
    }
}

impl<E: Into<EventBusError>> IntoSubscribeResult for Result<(), E> {
    #[inline]
    fn into_subscribe_result(self) -> crate::Result<()> {
        self.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Journal {
        lines: Mutex<Vec<String>>,
    }

    impl Journal {
        fn record(&self, line: &String) {
            self.lines.lock().push(line.clone());
        }

        fn record_named(&self, line: &String, event: &str) -> Result<(), &'static str> {
            if line.is_empty() {
                return Err("empty line");
            }
            self.lines.lock().push(format!("{event}:{line}"));
            Ok(())
        }
    }

    #[test]
    fn bound_methods_reach_the_shared_instance() {
        let journal = Arc::new(Journal::default());
        let plain = HandlerMethod::plain("Record", Journal::record).bind(Arc::clone(&journal));
        let named = HandlerMethod::named("Named", Journal::record_named).bind(Arc::clone(&journal));

        plain.invoke(&"one".to_owned(), "Record").unwrap();
        named.invoke(&"two".to_owned(), "Named").unwrap();

        assert_eq!(*journal.lines.lock(), ["one", "Named:two"]);
        assert_eq!(named.shape(), ListenerShape::Named);
        assert!(plain.target().ends_with("Journal"));
    }

    #[test]
    fn method_errors_are_wrapped() {
        let journal = Arc::new(Journal::default());
        let named = HandlerMethod::named("Named", Journal::record_named).bind(journal);

        let err = named.invoke(&String::new(), "Named").unwrap_err();

        assert!(matches!(err, EventBusError::ListenerFailed { .. }));
    }

    #[test]
    fn hook_results_convert() {
        assert!(().into_subscribe_result().is_ok());

        let failed: Result<(), EventBusError> =
            Err(EventBusError::NotSubscriber { message: "nope".into(), context: None });
        assert!(matches!(failed.into_subscribe_result(), Err(EventBusError::NotSubscriber { .. })));
    }
}
