use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, Type};

/// Marker prefix for `PascalCase` handler methods (`OnTestEvent`).
const PASCAL_MARKER: &str = "On";
/// Marker prefix for snake-case handler methods (`on_test_event`).
const SNAKE_MARKER: &str = "on_";
/// Accepted names of the manual subscription hook.
const MANUAL_HOOKS: [&str; 2] = ["subscribe", "Subscribe"];
/// Accepted names of the prefix capability.
const PREFIX_HOOKS: [&str; 2] = ["event_prefix", "EventPrefix"];
/// Helper attribute that pins an explicit event name on a method.
const EVENT_ATTR: &str = "event";

/// Call shape of a discovered handler method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Plain,
    Named,
}

/// Expands `#[herald::subscriber]` on an inherent `impl` block.
#[must_use]
pub fn expand_subscriber(args: TokenStream, mut input: ItemImpl) -> TokenStream {
    if !args.is_empty() {
        return Error::new_spanned(args, "#[subscriber] does not take arguments").to_compile_error();
    }
    if let Some((_, path, _)) = &input.trait_ {
        return Error::new_spanned(
            path,
            "#[subscriber] must be applied to an inherent impl block, not a trait impl",
        )
        .to_compile_error();
    }

    let mut manual: Option<Ident> = None;
    let mut prefix: Option<Ident> = None;
    let mut marked = false;
    let mut handlers = Vec::new();

    for item in &mut input.items {
        let ImplItem::Fn(method) = item else { continue };

        let explicit = match take_event_attr(method) {
            Ok(explicit) => explicit,
            Err(err) => return err.to_compile_error(),
        };
        let ident = method.sig.ident.to_string();

        if explicit.is_none() {
            let hook = if MANUAL_HOOKS.contains(&ident.as_str()) && is_hook(method, 1) {
                Some(&mut manual)
            } else if PREFIX_HOOKS.contains(&ident.as_str()) && is_hook(method, 0) {
                Some(&mut prefix)
            } else {
                None
            };
            if let Some(slot) = hook {
                let Some(first) = slot.replace(method.sig.ident.clone()) else { continue };
                return Error::new_spanned(
                    &method.sig.ident,
                    format!("`{ident}` duplicates the `{first}` hook"),
                )
                .to_compile_error();
            }
        }

        let is_explicit = explicit.is_some();
        let Some(event) = explicit.map(|lit| lit.value()).or_else(|| event_name(&ident)) else {
            continue;
        };
        marked = true;
        let shape = match classify(method) {
            Some(shape) => shape,
            None if is_explicit => {
                return Error::new_spanned(
                    &method.sig,
                    "#[event] handlers must take `(&self, &T)` or `(&self, &T, &str)`",
                )
                .to_compile_error();
            },
            None => continue,
        };

        let method_ident = &method.sig.ident;
        handlers.push(match shape {
            Shape::Plain => quote! { ::herald::HandlerMethod::plain(#event, Self::#method_ident) },
            Shape::Named => quote! { ::herald::HandlerMethod::named(#event, Self::#method_ident) },
        });
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    let body = if let Some(hook) = manual {
        quote! {
            ::herald::Subscription::Manual(
                |this: &::std::sync::Arc<Self>, bus: &::herald::EventBus| {
                    ::herald::IntoSubscribeResult::into_subscribe_result(this.#hook(bus))
                },
            )
        }
    } else {
        let prefix = match prefix {
            Some(hook) => quote! {
                ::std::option::Option::Some(|this: &Self| -> ::std::string::String {
                    ::std::convert::Into::into(this.#hook())
                })
            },
            None => quote! { ::std::option::Option::None },
        };
        quote! {
            ::herald::Subscription::Discover {
                prefix: #prefix,
                marked: #marked,
                handlers: ::std::vec![#(#handlers),*],
            }
        }
    };

    quote! {
        #input

        #[automatically_derived]
        impl #impl_generics ::herald::Subscriber for #self_ty #where_clause {
            fn subscription() -> ::herald::Subscription<Self> {
                #body
            }
        }
    }
}

/// Removes `#[event("...")]` from the method and returns its literal.
fn take_event_attr(method: &mut ImplItemFn) -> syn::Result<Option<LitStr>> {
    let mut explicit = None;
    let mut error = None;
    method.attrs.retain(|attr| {
        if !attr.path().is_ident(EVENT_ATTR) {
            return true;
        }
        match attr.parse_args::<LitStr>() {
            Ok(lit) if lit.value().is_empty() => {
                error = Some(Error::new_spanned(&lit, "event name must not be empty"));
            },
            Ok(lit) if explicit.is_some() => {
                error = Some(Error::new_spanned(&lit, "duplicate #[event] attribute"));
            },
            Ok(lit) => explicit = Some(lit),
            Err(err) => error = Some(err),
        }
        false
    });
    error.map_or(Ok(explicit), Err)
}

/// Derives the bare event name from a handler method identifier.
fn event_name(ident: &str) -> Option<String> {
    let ident = ident.strip_prefix("r#").unwrap_or(ident);

    if let Some(rest) = ident.strip_prefix(PASCAL_MARKER)
        && rest.starts_with(|c: char| c.is_ascii_uppercase())
    {
        return Some(rest.to_owned());
    }

    ident.strip_prefix(SNAKE_MARKER).map(upper_camel).filter(|name| !name.is_empty())
}

fn upper_camel(snake: &str) -> String {
    snake
        .split('_')
        .filter(|part| !part.is_empty())
        .flat_map(|part| {
            let mut chars = part.chars();
            chars.next().map(|first| first.to_ascii_uppercase()).into_iter().chain(chars)
        })
        .collect()
}

/// `&self` followed by exactly `extra` typed arguments, sync and non-generic.
fn is_hook(method: &ImplItemFn, extra: usize) -> bool {
    method.sig.asyncness.is_none()
        && method.sig.inputs.first().is_some_and(|arg| matches!(arg, FnArg::Receiver(_)))
        && method.sig.inputs.len() == extra + 1
}

fn classify(method: &ImplItemFn) -> Option<Shape> {
    let sig = &method.sig;
    if sig.asyncness.is_some() || !sig.generics.params.is_empty() {
        return None;
    }

    let mut inputs = sig.inputs.iter();
    let Some(FnArg::Receiver(receiver)) = inputs.next() else {
        return None;
    };
    if receiver.reference.is_none() || receiver.mutability.is_some() || receiver.colon_token.is_some()
    {
        return None;
    }

    let typed: Vec<&Type> = inputs
        .map(|arg| match arg {
            FnArg::Typed(pat) => Some(&*pat.ty),
            FnArg::Receiver(_) => None,
        })
        .collect::<Option<_>>()?;

    match typed.as_slice() {
        [payload] if is_shared_ref(payload) => Some(Shape::Plain),
        [payload, name] if is_shared_ref(payload) && is_str_ref(name) => Some(Shape::Named),
        _ => None,
    }
}

fn is_shared_ref(ty: &Type) -> bool {
    matches!(ty, Type::Reference(r) if r.mutability.is_none())
}

fn is_str_ref(ty: &Type) -> bool {
    let Type::Reference(r) = ty else {
        return false;
    };
    r.mutability.is_none()
        && matches!(&*r.elem, Type::Path(p) if p.qself.is_none() && p.path.is_ident("str"))
}
