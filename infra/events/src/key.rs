use crate::error::{EventBusError, Result};
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Suffix that turns a name key into a namespace pattern (`orders.*`).
pub const WILDCARD_SUFFIX: &str = ".*";

/// Identity of a concrete payload type.
///
/// Equality and hashing use the [`TypeId`] only; the path-qualified name is
/// carried along for logging and for named listeners.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    #[must_use]
    pub fn of<T: Any + ?Sized>() -> Self {
        Self { id: TypeId::of::<T>(), name: std::any::type_name::<T>() }
    }

    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Key under which listeners are registered and events are dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    /// A string identifier, matched literally (or by namespace via `.*`).
    Name(Cow<'static, str>),
    /// The concrete type of the payload.
    Type(TypeKey),
}

impl EventKey {
    /// Creates a name key.
    #[must_use]
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Name(name.into())
    }

    /// Creates a type key for `T`.
    ///
    /// # Examples
    /// ```rust
    /// use herald::EventKey;
    ///
    /// struct OrderPlaced { id: u64 }
    ///
    /// let key = EventKey::of::<OrderPlaced>();
    /// assert!(key.is_type());
    /// assert!(key.as_str().ends_with("OrderPlaced"));
    /// ```
    #[must_use]
    pub fn of<T: Any + ?Sized>() -> Self {
        Self::Type(TypeKey::of::<T>())
    }

    /// Creates a type key from a representative value; its data is ignored.
    #[must_use]
    pub fn of_val<T: Any>(_value: &T) -> Self {
        Self::of::<T>()
    }

    /// The name passed to named listeners: the key itself, or the type path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Name(name) => name.as_ref(),
            Self::Type(ty) => ty.name(),
        }
    }

    #[must_use]
    pub const fn is_type(&self) -> bool {
        matches!(self, Self::Type(_))
    }

    /// Namespace (including the trailing dot) of a `prefix.*` pattern.
    #[must_use]
    pub fn wildcard_namespace(&self) -> Option<&str> {
        let Self::Name(name) = self else {
            return None;
        };
        let name: &str = name;
        name.ends_with(WILDCARD_SUFFIX).then(|| &name[..name.len() - 1])
    }

    /// Whether this is a name key strictly below `namespace` (`orders.` + non-empty rest).
    #[must_use]
    pub fn is_under(&self, namespace: &str) -> bool {
        matches!(self, Self::Name(name) if name.len() > namespace.len() && name.starts_with(namespace))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::Name(name) if name.is_empty() => Err(EventBusError::InvalidEventName {
                message: "event name must not be empty".into(),
                context: None,
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&'static str> for EventKey {
    fn from(name: &'static str) -> Self {
        Self::named(name)
    }
}

impl From<String> for EventKey {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

impl From<Cow<'static, str>> for EventKey {
    fn from(name: Cow<'static, str>) -> Self {
        Self::Name(name)
    }
}

impl From<TypeKey> for EventKey {
    fn from(key: TypeKey) -> Self {
        Self::Type(key)
    }
}

impl From<&EventKey> for EventKey {
    fn from(key: &EventKey) -> Self {
        key.clone()
    }
}
