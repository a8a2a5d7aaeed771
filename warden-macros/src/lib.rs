//! Procedural macros for Warden.
//!
//! - `#[derive(Event)]` - implements `warden::Event` for structs with named fields

use proc_macro::TokenStream;

mod event;

/// Derive macro for implementing the `Event` trait.
///
/// Every named field becomes an accessor returning
/// `field.clone().into()`, so each field type must be `Clone` and
/// `Into<warden::Value>`. Generic fields only need that bound.
///
/// # Attributes
///
/// - `#[event(skip)]` on a field hides it from guards.
/// - `#[event(rename = "chat?")]` on a field exposes it under another name.
/// - `#[event(kind = "message")]` on the struct declares a named capability.
///   May be repeated.
///
/// # Example
///
/// ```rust,ignore
/// use warden::Event;
///
/// #[derive(Event)]
/// #[event(kind = "message")]
/// struct Message {
///     body: String,
///     #[event(rename = "chat?")]
///     chat: bool,
///     #[event(skip)]
///     raw: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    event::derive_event_impl(input)
}
