use std::borrow::Cow;

/// Error returned by fallible listeners, boxed so any error type can propagate.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during event bus operations.
#[herald_derive::herald_error]
pub enum EventBusError {
    /// A type-erased value matched none of the accepted listener shapes.
    #[error("Invalid listener{}: {message}", format_context(.context))]
    InvalidListener { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The subscriber exposes neither handler methods nor a manual subscription.
    #[error("Not a subscriber{}: {message}", format_context(.context))]
    NotSubscriber { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Name keys must not be empty.
    #[error("Invalid event name{}: {message}", format_context(.context))]
    InvalidEventName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A listener expected a different payload type than the one dispatched.
    #[error("Payload mismatch{}: {message}", format_context(.context))]
    PayloadMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A listener returned an error; dispatch stopped at that listener.
    #[error("Listener failed{}: {source}", format_context(.context))]
    ListenerFailed {
        #[source]
        source: BoxError,
        context: Option<Cow<'static, str>>,
    },

    /// One or more isolated listeners failed; every listener still ran.
    #[error("Listeners failed{}: {message}", format_context(.context))]
    ListenersFailed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
