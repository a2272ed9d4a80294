use crate::error::{BoxError, EventBusError};
use crate::payload::{FromPayload, Payload, downcast};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Plain listener as a bare function pointer, accepted by [`Listener::from_any`].
pub type PlainFn = fn(&Payload);
/// Named listener as a bare function pointer, accepted by [`Listener::from_any`].
pub type NamedFn = fn(&Payload, &str);
/// Object handler over raw payloads, accepted by [`Listener::from_any`].
pub type DynHandler = Arc<dyn Handle<Event = Payload>>;

type Invoker = dyn Fn(&Payload, &str) -> crate::Result<()> + Send + Sync;

/// Calling convention a listener was registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerShape {
    /// `(payload)`
    Plain,
    /// `(payload, event name)`
    Named,
    /// An object implementing [`Handle`].
    Handler,
}

/// Object handler: the invocation target is its `handle` method.
///
/// # Examples
/// ```rust
/// use herald::{EventBus, Handle};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl Handle for Counter {
///     type Event = u32;
///
///     fn handle(&self, event: &u32) {
///         self.0.fetch_add(*event as usize, Ordering::SeqCst);
///     }
/// }
///
/// # fn main() -> herald::Result<()> {
/// let bus = EventBus::new();
/// bus.listen("tick", Counter::default())?;
/// assert_eq!(bus.dispatch("tick", 3_u32)?, 1);
/// # Ok(())
/// # }
/// ```
pub trait Handle: Send + Sync + 'static {
    /// Payload type; use [`Payload`] to receive it untyped.
    type Event: FromPayload + ?Sized;

    fn handle(&self, event: &Self::Event);
}

/// Return values a listener may produce: `()` or `Result<(), E>`.
pub trait IntoListenerResult {
    /// # Errors
    /// Returns the listener's own error, boxed.
    fn into_listener_result(self) -> Result<(), BoxError>;
}

impl IntoListenerResult for () {
    #[inline]
    fn into_listener_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E: Into<BoxError>> IntoListenerResult for Result<(), E> {
    #[inline]
    fn into_listener_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// A registered callable, with its shape resolved at construction time.
#[derive(Clone)]
pub struct Listener {
    shape: ListenerShape,
    target: &'static str,
    invoke: Arc<Invoker>,
}

impl Listener {
    /// Listener receiving only the payload.
    ///
    /// `T` is inferred from the closure argument; use [`Payload`] for the raw value.
    pub fn plain<T, R, F>(listener: F) -> Self
    where
        T: FromPayload + ?Sized + 'static,
        R: IntoListenerResult + 'static,
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        Self::from_parts(ListenerShape::Plain, std::any::type_name::<F>(), move |payload, event| {
            listener(downcast::<T>(payload, event)?)
                .into_listener_result()
                .map_err(|source| failed(source, event))
        })
    }

    /// Listener receiving the payload and the dispatched event name.
    pub fn named<T, R, F>(listener: F) -> Self
    where
        T: FromPayload + ?Sized + 'static,
        R: IntoListenerResult + 'static,
        F: Fn(&T, &str) -> R + Send + Sync + 'static,
    {
        Self::from_parts(ListenerShape::Named, std::any::type_name::<F>(), move |payload, event| {
            listener(downcast::<T>(payload, event)?, event)
                .into_listener_result()
                .map_err(|source| failed(source, event))
        })
    }

    /// Listener delegating to [`Handle::handle`].
    pub fn handler<H: Handle>(handler: H) -> Self {
        Self::shared_handler(Arc::new(handler))
    }

    /// Like [`Listener::handler`], for a handler that is shared elsewhere.
    pub fn shared_handler<H: Handle + ?Sized>(handler: Arc<H>) -> Self {
        Self::from_parts(ListenerShape::Handler, std::any::type_name::<H>(), move |payload, event| {
            handler.handle(downcast::<H::Event>(payload, event)?);
            Ok(())
        })
    }

    /// Resolves a type-erased value into a listener.
    ///
    /// Accepted values are a [`Listener`], a [`PlainFn`], a [`NamedFn`] or a
    /// [`DynHandler`].
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidListener`] for anything else.
    pub fn from_any(value: Box<dyn Any + Send + Sync>) -> crate::Result<Self> {
        let value = match value.downcast::<Self>() {
            Ok(listener) => return Ok(*listener),
            Err(value) => value,
        };
        let value = match value.downcast::<PlainFn>() {
            Ok(function) => return Ok(Self::plain(*function)),
            Err(value) => value,
        };
        let value = match value.downcast::<NamedFn>() {
            Ok(function) => return Ok(Self::named(*function)),
            Err(value) => value,
        };
        match value.downcast::<DynHandler>() {
            Ok(handler) => Ok(Self::shared_handler(*handler)),
            Err(_) => Err(EventBusError::InvalidListener {
                message: "value is not a Listener, PlainFn, NamedFn or DynHandler".into(),
                context: None,
            }),
        }
    }

    pub(crate) fn from_parts<F>(shape: ListenerShape, target: &'static str, invoke: F) -> Self
    where
        F: Fn(&Payload, &str) -> crate::Result<()> + Send + Sync + 'static,
    {
        Self { shape, target, invoke: Arc::new(invoke) }
    }

    #[must_use]
    pub const fn shape(&self) -> ListenerShape {
        self.shape
    }

    /// Type name of the underlying closure, function or handler.
    #[must_use]
    pub const fn target(&self) -> &'static str {
        self.target
    }

    /// Calls the listener directly, outside of any bus.
    ///
    /// # Errors
    /// Returns [`EventBusError::PayloadMismatch`] when the payload has the wrong
    /// type and [`EventBusError::ListenerFailed`] when the listener fails.
    pub fn invoke(&self, payload: &Payload, event: &str) -> crate::Result<()> {
        (self.invoke)(payload, event)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("shape", &self.shape).field("target", &self.target).finish()
    }
}

/// Marker selecting the [`Handle`] conversion of [`IntoListener`].
#[derive(Debug)]
pub enum HandlerMarker {}

/// Values accepted wherever a listener is registered.
///
/// `Marker` only disambiguates the blanket impls and is always inferred:
/// closures taking `(&T)` or `(&T, &str)`, [`Handle`] implementors and
/// ready-made [`Listener`]s all qualify. Closure arguments must be annotated
/// (`|order: &Order| ...`) so the payload type is known.
pub trait IntoListener<Marker> {
    /// Payload type the listener downcasts to.
    type Event: ?Sized;

    fn into_listener(self) -> Listener;
}

impl IntoListener<Listener> for Listener {
    type Event = Payload;

    fn into_listener(self) -> Listener {
        self
    }
}

impl<T, R, F> IntoListener<fn(&T) -> R> for F
where
    T: FromPayload + ?Sized + 'static,
    R: IntoListenerResult + 'static,
    F: Fn(&T) -> R + Send + Sync + 'static,
{
    type Event = T;

    fn into_listener(self) -> Listener {
        Listener::plain(self)
    }
}

impl<T, R, F> IntoListener<fn(&T, &str) -> R> for F
where
    T: FromPayload + ?Sized + 'static,
    R: IntoListenerResult + 'static,
    F: Fn(&T, &str) -> R + Send + Sync + 'static,
{
    type Event = T;

    fn into_listener(self) -> Listener {
        Listener::named(self)
    }
}

impl<H: Handle> IntoListener<HandlerMarker> for H {
    type Event = H::Event;

    fn into_listener(self) -> Listener {
        Listener::handler(self)
    }
}

pub(crate) fn failed(source: BoxError, event: &str) -> EventBusError {
    EventBusError::ListenerFailed { source, context: Some(format!("event `{event}`").into()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Handle for Recorder {
        type Event = String;

        fn handle(&self, event: &String) {
            self.0.lock().push(event.clone());
        }
    }

    #[test]
    fn plain_listener_receives_typed_payload() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let listener = Listener::plain(move |data: &String| *sink.lock() = Some(data.clone()));

        listener.invoke(&"hello".to_owned(), "greet").unwrap();

        assert_eq!(listener.shape(), ListenerShape::Plain);
        assert_eq!(seen.lock().as_deref(), Some("hello"));
    }

    #[test]
    fn named_listener_receives_event_name() {
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&seen);
        let listener = Listener::named(move |_: &Payload, name: &str| *sink.lock() = name.to_owned());

        listener.invoke(&(), "orders.created").unwrap();

        assert_eq!(listener.shape(), ListenerShape::Named);
        assert_eq!(*seen.lock(), "orders.created");
    }

    #[test]
    fn handler_objects_become_listeners() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let listener = Recorder(Arc::clone(&seen)).into_listener();

        listener.invoke(&"a".to_owned(), "k").unwrap();
        listener.invoke(&"b".to_owned(), "k").unwrap();

        assert_eq!(listener.shape(), ListenerShape::Handler);
        assert!(listener.target().ends_with("Recorder"));
        assert_eq!(*seen.lock(), ["a", "b"]);
    }

    #[test]
    fn closures_pick_their_shape_from_the_signature() {
        let plain = (|_: &u32| {}).into_listener();
        let named = (|_: &u32, _: &str| Ok::<(), std::io::Error>(())).into_listener();
        let ready = Listener::plain(|_: &Payload| {}).into_listener();

        assert_eq!(plain.shape(), ListenerShape::Plain);
        assert_eq!(named.shape(), ListenerShape::Named);
        assert_eq!(ready.shape(), ListenerShape::Plain);
    }

    #[test]
    fn listener_errors_are_wrapped_with_the_event() {
        let listener = Listener::plain(|_: &Payload| Err::<(), _>("disk full"));

        let err = listener.invoke(&(), "backup").unwrap_err();

        assert!(matches!(err, EventBusError::ListenerFailed { .. }));
        assert_eq!(err.context(), Some("event `backup`"));
        assert!(err.to_string().ends_with("disk full"));
    }

    #[test]
    fn wrong_payload_type_is_reported() {
        let listener = Listener::plain(|_: &u64| {});
        let err = listener.invoke(&"text".to_owned(), "numbers").unwrap_err();
        assert!(matches!(err, EventBusError::PayloadMismatch { .. }));
    }

    #[test]
    fn from_any_accepts_known_shapes() {
        fn plain(_: &Payload) {}
        fn named(_: &Payload, _: &str) {}

        let plain: PlainFn = plain;
        let named: NamedFn = named;
        let handler: DynHandler = Arc::new(RawHandler);

        let shapes = [
            Listener::from_any(Box::new(plain)).unwrap().shape(),
            Listener::from_any(Box::new(named)).unwrap().shape(),
            Listener::from_any(Box::new(handler)).unwrap().shape(),
            Listener::from_any(Box::new(Listener::plain(|_: &Payload| {}))).unwrap().shape(),
        ];

        assert_eq!(
            shapes,
            [
                ListenerShape::Plain,
                ListenerShape::Named,
                ListenerShape::Handler,
                ListenerShape::Plain
            ]
        );
    }

    #[test]
    fn from_any_rejects_everything_else() {
        let err = Listener::from_any(Box::new("not a listener")).unwrap_err();
        assert!(matches!(err, EventBusError::InvalidListener { .. }));

        let closure = |_: &Payload| {};
        let err = Listener::from_any(Box::new(closure)).unwrap_err();
        assert!(matches!(err, EventBusError::InvalidListener { .. }));
    }

    struct RawHandler;

    impl Handle for RawHandler {
        type Event = Payload;

        fn handle(&self, _event: &Payload) {}
    }
}
