use crate::macros::error::derived_names;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::Parser;
use syn::{Attribute, Expr, ExprLit, ItemFn, ItemStruct, Lit, LitStr, Meta, MetaNameValue};

const DEFAULT_RENAME: &str = "snake_case";

/// Expands `#[api_model]`: common derives, `ToSchema`, and the serde policy.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    let (rename_all, deny_unknown) = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(err) => return err.to_compile_error(),
    };
    let serde = match existing_serde(&input.attrs) {
        Ok(serde) => serde,
        Err(err) => return err.to_compile_error(),
    };

    let derived = derived_names(&input.attrs);
    let mut derives = Vec::new();
    for (name, tokens) in [
        ("Debug", quote! { Debug }),
        ("Serialize", quote! { ::serde::Serialize }),
        ("Deserialize", quote! { ::serde::Deserialize }),
        ("ToSchema", quote! { ::utoipa::ToSchema }),
    ] {
        if !derived.contains(name) {
            derives.push(tokens);
        }
    }
    let derive_attr =
        if derives.is_empty() { quote! {} } else { quote! { #[derive(#(#derives),*)] } };

    let rename = rename_all.unwrap_or_else(|| LitStr::new(DEFAULT_RENAME, Span::call_site()));
    let rename_attr = match &serde.rename_all {
        Some(existing) if existing.value() != rename.value() => {
            return syn::Error::new_spanned(
                existing,
                "conflicting serde rename_all; set it through api_model(rename_all = \"...\")",
            )
            .to_compile_error();
        },
        Some(_) => quote! {},
        None => quote! { #[serde(rename_all = #rename)] },
    };

    let deny_attr = if deny_unknown.unwrap_or(true) && !serde.deny_unknown_fields {
        quote! { #[serde(deny_unknown_fields)] }
    } else {
        quote! {}
    };

    quote! {
        #derive_attr
        #rename_attr
        #deny_attr
        #input
    }
}

/// Expands `#[api_handler]`: registers the handler with `utoipa::path`.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[::utoipa::path(#args)]
        #vis #sig #block
    }
}

fn parse_args(args: TokenStream) -> syn::Result<(Option<LitStr>, Option<bool>)> {
    let metas = syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated.parse2(args)?;

    let mut rename_all = None;
    let mut deny_unknown = None;

    for meta in metas {
        let Meta::NameValue(nv) = meta else {
            return Err(syn::Error::new_spanned(meta, "expected `name = value` arguments"));
        };
        if nv.path.is_ident("rename_all") {
            if rename_all.replace(string_lit(&nv)?).is_some() {
                return Err(syn::Error::new_spanned(nv, "duplicate rename_all"));
            }
        } else if nv.path.is_ident("deny_unknown_fields") {
            if deny_unknown.replace(bool_lit(&nv)?).is_some() {
                return Err(syn::Error::new_spanned(nv, "duplicate deny_unknown_fields"));
            }
        } else {
            return Err(syn::Error::new_spanned(
                nv.path,
                "unsupported argument; expected rename_all or deny_unknown_fields",
            ));
        }
    }

    Ok((rename_all, deny_unknown))
}

fn string_lit(nv: &MetaNameValue) -> syn::Result<LitStr> {
    match &nv.value {
        Expr::Lit(ExprLit { lit: Lit::Str(lit), .. }) => Ok(lit.clone()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn bool_lit(nv: &MetaNameValue) -> syn::Result<bool> {
    match &nv.value {
        Expr::Lit(ExprLit { lit: Lit::Bool(lit), .. }) => Ok(lit.value),
        other => Err(syn::Error::new_spanned(other, "expected a boolean literal")),
    }
}

struct SerdeAttrs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

fn existing_serde(attrs: &[Attribute]) -> syn::Result<SerdeAttrs> {
    let mut found = SerdeAttrs { rename_all: None, deny_unknown_fields: false };

    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                found.rename_all = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("deny_unknown_fields") {
                found.deny_unknown_fields = true;
            } else if meta.input.peek(syn::Token![=]) {
                // Skip values of unrelated keys such as `default = "..."`.
                let _: Expr = meta.value()?.parse()?;
            }
            Ok(())
        })?;
    }

    Ok(found)
}
