#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the event bus.
//! This crate provides attribute macros that replace runtime reflection with
//! compile-time tables: subscriber method discovery and error enum wiring.
//!
//! ## Usage
//! The macros are re-exported by `herald`; depend on that crate instead of this one:
//! ```toml
//! [dependencies]
//! herald = { path = "../infra/events" }
//! ```
//!
//! See each macro’s docstring for examples; they are `ignore`d to avoid compiling in this crate,
//! but are exercised by the integration tests of `herald`.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemImpl, parse_macro_input};

/// Attribute macro that turns an inherent `impl` block into a `herald::Subscriber`.
///
/// The block is scanned once at compile time and a discovery table is generated
/// from the methods it contains.
///
/// # Discovery rules
///
/// * **Handler methods**: `OnTestEvent` registers under `TestEvent` verbatim,
///   `on_test_event` registers under the `UpperCamelCase` name `TestEvent`.
///   `#[event("orders.created")]` on any method registers under the literal name.
/// * **Signatures**: `(&self, &T)` is a plain listener, `(&self, &T, &str)` a named
///   listener receiving the dispatched event name. Other signatures are skipped,
///   unless the method carries `#[event]`, in which case compilation fails.
/// * **Prefix**: a method `event_prefix(&self)` (or `EventPrefix`) returning
///   something `Into<String>` is prepended to every discovered event name.
/// * **Manual subscription**: a method `subscribe(&self, bus: &EventBus)` (or
///   `Subscribe`, with `&self` or `self: &Arc<Self>`) takes over registration
///   entirely; no method is scanned.
/// * **Empty tables**: a block with handler-named methods that were all skipped
///   still subscribes, registering nothing. A block with no hook and no
///   handler-named method is rejected at runtime with `NotSubscriber`.
///
/// # Errors
/// Emits a compile-time error when applied to anything other than an inherent
/// `impl` block, for an `#[event]` method with an unsupported signature, and when
/// both spellings of the same hook are present.
///
/// # Example
///
/// ```rust,ignore
/// use herald::{EventBus, Payload, subscriber};
///
/// struct Audit;
///
/// #[subscriber]
/// impl Audit {
///     fn event_prefix(&self) -> &'static str {
///         "audit."
///     }
///
///     fn on_user_created(&self, user: &String) {
///         println!("created {user}");
///     }
///
///     #[event("Deleted")]
///     fn deleted(&self, payload: &Payload, name: &str) {
///         println!("{name}: {payload:?}");
///     }
/// }
///
/// let bus = EventBus::new();
/// bus.subscribe(Audit)?;
/// bus.dispatch("audit.UserCreated", "alice".to_owned())?;
/// ```
#[proc_macro_attribute]
pub fn subscriber(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemImpl);
    macros::subscriber::expand_subscriber(args.into(), input).into()
}

/// Turns an enum into the crate's error type.
///
/// Every variant uses named fields. A `context: Option<Cow<'static, str>>` field
/// opts the variant into context attachment, and a `source` field (or one
/// marked `#[source]`/`#[from]`) makes it wrap an upstream error. Such a
/// variant must also carry `context`.
///
/// Expands to:
///
/// * `#[derive(Debug, thiserror::Error)]`, unless already derived.
/// * `type Result<T, E = Name>` next to the enum.
/// * `Name::context(&self) -> Option<&str>`.
/// * `NameExt::context(..)` on `Result<T, Name>` and on `Result<T, Source>` for
///   each wrapped source type, plus the matching `From<Source>` impls.
/// * `From<&'static str>` and `From<String>` when a variant is named `Internal`.
///
/// Tuple and unit variants are a compile error.
///
/// # Example
///
/// ```rust,ignore
/// use herald_derive::herald_error;
/// use std::borrow::Cow;
///
/// #[herald_error]
/// pub enum JournalError {
///     #[error("Journal I/O{}: {source}", format_context(.context))]
///     Io {
///         #[source]
///         source: std::io::Error,
///         context: Option<Cow<'static, str>>,
///     },
///
///     #[error("Journal corrupted{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load(path: &str) -> Result<String> {
///     std::fs::read_to_string(path).context("Loading event journal")
/// }
/// ```
#[proc_macro_attribute]
pub fn herald_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
