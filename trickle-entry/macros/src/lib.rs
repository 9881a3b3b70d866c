use anyhow::{Result, anyhow, bail};
use proc_macro::TokenStream;
use proc_macro_crate::{Error, FoundCrate, crate_name};
use proc_macro2::Span;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, ExprLit, Ident, ItemFn, Lit, MetaNameValue, ReturnType, Token, Type};

fn find_optional_crate(name: &str) -> Result<Option<FoundCrate>> {
    match crate_name(name) {
        Ok(found) => Ok(Some(found)),
        Err(Error::CrateNotFound { .. }) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Path of the entry crate as seen by the caller.
///
/// Programs depend either on the entry crate itself
/// or on the facade, which exposes it as `entry`.
fn entry_crate() -> Result<proc_macro2::TokenStream> {
    if let Some(found) = find_optional_crate("trickle-entry")? {
        return Ok(match found {
            FoundCrate::Itself => quote!(crate),
            FoundCrate::Name(name) => {
                let ident = Ident::new(&name, Span::call_site());
                quote!(::#ident)
            }
        });
    }
    if let Some(found) = find_optional_crate("trickle")? {
        return Ok(match found {
            FoundCrate::Itself => quote!(crate::entry),
            FoundCrate::Name(name) => {
                let ident = Ident::new(&name, Span::call_site());
                quote!(::#ident::entry)
            }
        });
    }
    Err(anyhow!("Neither `trickle` nor `trickle-entry` crate is found."))
}

/// Scheduler settings given as attribute arguments,
/// e.g. `#[trickle::main(event_interval = 31)]`.
fn config_overrides(
    args: Punctuated<MetaNameValue, Token![,]>,
) -> Result<Vec<proc_macro2::TokenStream>> {
    let mut overrides = Vec::new();
    for arg in args {
        let Some(key) = arg.path.get_ident() else {
            bail!("Expected a setting name.");
        };
        let Expr::Lit(ExprLit { lit, .. }) = &arg.value else {
            bail!("The value of `{key}` must be a literal.");
        };
        let setting = match (key.to_string().as_str(), lit) {
            ("event_interval" | "global_queue_interval", Lit::Int(value)) => {
                let value = value.base10_parse::<u32>()?;
                quote!(cfg.#key = ::core::option::Option::Some(#value);)
            }
            ("thread_name", Lit::Str(value)) => {
                quote!(cfg.#key = ::core::option::Option::Some(::std::string::String::from(#value));)
            }
            ("event_interval" | "global_queue_interval" | "thread_name", _) => {
                bail!("Unexpected type of value for `{key}`.");
            }
            _ => bail!("Unknown setting `{key}`."),
        };
        overrides.push(setting);
    }
    Ok(overrides)
}

fn main_result(
    args: Punctuated<MetaNameValue, Token![,]>,
    mut item_fn: ItemFn,
) -> Result<TokenStream> {
    let entry_crate = entry_crate()?;
    let overrides = config_overrides(args)?;

    if item_fn.sig.ident != "main" {
        bail!("Must only decorate the main function.");
    }
    if item_fn.sig.asyncness.is_none() {
        bail!("The main function must be async.");
    }

    // A main function returning nothing or `()` is
    // wrapped into `Ok`, anything else is expected
    // to be a result convertible into ours.
    let return_unit = match &item_fn.sig.output {
        ReturnType::Default => true,
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Tuple(tpl) => tpl.elems.is_empty(),
            Type::Never(_) => {
                bail!("The main function must return, so that the scheduler shuts down.");
            }
            _ => false,
        },
    };

    let inner_ident = Ident::new("__trickle_main", item_fn.sig.ident.span());
    item_fn.sig.ident = inner_ident.clone();
    let future_block = if return_unit {
        quote!(async move { Ok(#inner_ident().await) })
    } else {
        quote!(async move { Ok(#inner_ident().await?) })
    };
    Ok(TokenStream::from(quote! {
        fn main() -> #entry_crate::Result<()> {
            #item_fn
            #[allow(unused_mut)]
            let mut cfg = #entry_crate::Config::default();
            #(#overrides)*
            #entry_crate::entrypoint_with(cfg, #future_block)
        }
    }))
}

/// Generate the main function of a trickle program.
///
/// In order to use this macro, the user must
/// depend on either `trickle-entry` or `trickle`.
///
/// This procedural macro should wrap an **async**
/// main function. That is, an async function
/// with identifier `main` and optional return
/// type extending [`Result`]. The scheduler may be
/// tuned with `event_interval`,
/// `global_queue_interval` and `thread_name`
/// arguments.
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let parser = Punctuated::<MetaNameValue, Token![,]>::parse_terminated;
    let args = match syn::parse::Parser::parse(parser, attr) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };
    let item_fn = match syn::parse::<ItemFn>(item) {
        Ok(item_fn) => item_fn,
        Err(err) => return err.to_compile_error().into(),
    };
    let span = item_fn.span();
    match main_result(args, item_fn) {
        Ok(result) => result,
        Err(err) => syn::Error::new(span, err).to_compile_error().into(),
    }
}
