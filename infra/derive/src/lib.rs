#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by every crate of the workspace: error enums,
//! API data models, documented handlers and feature slices.
//!
//! See each macro's docstring for examples; they are `ignore`d because a
//! proc-macro crate cannot use its own macros in doctests.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro to define an API data model (request or response DTO).
///
/// # Injected Behaviors
///
/// * **Derives**: `Debug`, `Serialize`, `Deserialize` and `utoipa::ToSchema` when missing.
/// * **Serde Policy**:
///     * `rename_all = "snake_case"` by default (can be overridden).
///     * `deny_unknown_fields` by default (can be disabled).
///
/// # Example
///
/// ```rust,ignore
/// use spore_derive::api_model;
///
/// #[api_model(deny_unknown_fields = false)]
/// pub struct StatusResponse {
///     pub model_trained_at: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Attribute macro to bridge Axum handlers with `OpenAPI` documentation.
///
/// Accepts standard `utoipa::path` arguments such as `get`, `post`, `path = "..."`,
/// `params(...)`, `responses(...)`, and `tag = "..."`.
///
/// # Example
///
/// ```rust,ignore
/// use spore_derive::api_handler;
///
/// #[api_handler(
///     get,
///     path = "/health",
///     responses((status = OK, body = HealthResponse)),
///     tag = "System"
/// )]
/// pub async fn health_handler() -> Json<HealthResponse> {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Attribute macro for defining crate-specific error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]`.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a `source`
///   field (or a field marked `#[source]`/`#[from]`), enabling the `?` operator.
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` when an `Internal`
///   variant is present.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants only.
/// 2. Variants with a source must also carry `context: Option<Cow<'static, str>>`.
/// 3. Only one error enum per module: the macro emits a module-level `format_context` helper.
///
/// # Example
///
/// ```rust,ignore
/// use spore_derive::spore_error;
/// use std::borrow::Cow;
///
/// #[spore_error]
/// pub enum StoreError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &Path) -> Result<Vec<u8>, StoreError> {
///     std::fs::read(path).context("Reading artifact")
/// }
/// ```
#[proc_macro_attribute]
pub fn spore_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Attribute macro to define a feature slice handle.
///
/// 1. Renames the annotated struct to `<Name>Inner`.
/// 2. Generates `<Name>` as a cheap-to-clone `Arc` wrapper with `Deref` to the inner state.
/// 3. Implements `FeatureSlice` so the slice can be registered in the application state.
///
/// # Example
/// ```rust,ignore
/// #[spore_derive::spore_slice]
/// pub struct Prediction {
///     pub service: PredictionService,
/// }
///
/// let slice = Prediction::new(PredictionInner { service });
/// ```
#[proc_macro_attribute]
pub fn spore_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
