use crate::error::{EventBusError, Result};
use std::any::Any;

/// Type-erased event payload handed to every listener.
pub type Payload = dyn Any + Send + Sync;

/// Views a [`Payload`] as the type a listener asked for.
///
/// Implemented for every sized `'static` type (by downcast) and for
/// [`Payload`] itself (identity), so listeners can opt out of typing.
pub trait FromPayload {
    fn from_payload(payload: &Payload) -> Option<&Self>;
}

impl FromPayload for Payload {
    #[inline]
    fn from_payload(payload: &Payload) -> Option<&Self> {
        Some(payload)
    }
}

impl<T: Any> FromPayload for T {
    #[inline]
    fn from_payload(payload: &Payload) -> Option<&Self> {
        payload.downcast_ref::<T>()
    }
}

pub(crate) fn downcast<'p, T: FromPayload + ?Sized>(payload: &'p Payload, event: &str) -> Result<&'p T> {
    T::from_payload(payload).ok_or_else(|| EventBusError::PayloadMismatch {
        message: format!("listener expects `{}`", std::any::type_name::<T>()).into(),
        context: Some(format!("event `{event}`").into()),
    })
}
