//! `#[derive(Event)]`.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Field, Fields, Ident, LitStr, Token,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// One `key` or `key = "value"` item inside `#[event(...)]`.
struct EventArg {
    key: Ident,
    value: Option<LitStr>,
}

/// The items of one `#[event(...)]` attribute.
pub(crate) struct EventArgs {
    args: Vec<EventArg>,
}

impl Parse for EventArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = Vec::new();

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            let value = if input.peek(Token![=]) {
                input.parse::<Token![=]>()?;
                Some(input.parse::<LitStr>()?)
            } else {
                None
            };
            args.push(EventArg { key, value });

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(EventArgs { args })
    }
}

fn event_args(attrs: &[Attribute]) -> syn::Result<Vec<EventArg>> {
    let mut args = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("event")) {
        args.extend(attr.parse_args::<EventArgs>()?.args);
    }
    Ok(args)
}

fn require_value(arg: EventArg) -> syn::Result<LitStr> {
    let key = arg.key;
    arg.value.ok_or_else(|| {
        syn::Error::new(key.span(), format!("`{key}` expects a string: {key} = \"...\""))
    })
}

/// Container-level attributes.
fn container_kinds(attrs: &[Attribute]) -> syn::Result<Vec<LitStr>> {
    let mut kinds = Vec::new();
    for arg in event_args(attrs)? {
        match arg.key.to_string().as_str() {
            "kind" => kinds.push(require_value(arg)?),
            other => {
                return Err(syn::Error::new(
                    arg.key.span(),
                    format!("unknown container attribute: {other}"),
                ));
            }
        }
    }
    Ok(kinds)
}

/// Field-level attributes. `None` means the field is skipped.
fn accessor_name(field: &Ident, attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut name = LitStr::new(&field.to_string(), field.span());
    for arg in event_args(attrs)? {
        match arg.key.to_string().as_str() {
            "skip" => return Ok(None),
            "rename" => name = require_value(arg)?,
            other => {
                return Err(syn::Error::new(
                    arg.key.span(),
                    format!("unknown field attribute: {other}"),
                ));
            }
        }
    }
    if name.value().is_empty() {
        return Err(syn::Error::new(name.span(), "accessor name must not be empty"));
    }
    Ok(Some(name))
}

/// Implementation of `#[derive(Event)]`.
pub fn derive_event_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields: Vec<&Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(fields) => {
                return Err(syn::Error::new_spanned(
                    fields,
                    "derive(Event) requires named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                Span::call_site(),
                "derive(Event) can only be used on structs",
            ));
        }
    };

    let mut idents = Vec::new();
    let mut names: Vec<LitStr> = Vec::new();
    for field in fields {
        let Some(ident) = &field.ident else { continue };
        let Some(accessor) = accessor_name(ident, &field.attrs)? else {
            continue;
        };
        if names.iter().any(|n| n.value() == accessor.value()) {
            return Err(syn::Error::new(
                accessor.span(),
                format!("duplicate accessor name `{}`", accessor.value()),
            ));
        }
        idents.push(ident);
        names.push(accessor);
    }

    let body = if idents.is_empty() {
        quote! {
            let _ = args;
            ::core::result::Result::Err(::warden::AccessorError::missing(name))
        }
    } else {
        quote! {
            let value = match name {
                #(
                    #names => ::core::convert::Into::<::warden::Value>::into(
                        ::core::clone::Clone::clone(&self.#idents),
                    ),
                )*
                _ => return ::core::result::Result::Err(::warden::AccessorError::missing(name)),
            };
            if !args.is_empty() {
                return ::core::result::Result::Err(::warden::AccessorError::arguments(
                    name,
                    "field accessors take no arguments",
                ));
            }
            ::core::result::Result::Ok(value)
        }
    };

    let kinds = container_kinds(&input.attrs)?;
    let kinds_impl = (!kinds.is_empty()).then(|| {
        quote! {
            fn kinds(&self) -> &[&'static str] {
                &[#(#kinds),*]
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::warden::Event for #name #ty_generics #where_clause {
            fn field(
                &self,
                name: &str,
                args: &[::warden::Value],
            ) -> ::core::result::Result<::warden::Value, ::warden::AccessorError> {
                #body
            }

            #kinds_impl
        }
    })
}
