use super::ModelSlot;
use axum::extract::FromRef;
use fxhash::FxHashMap;
use spore_domain::config::ApiConfig;
use spore_domain::registry::{FeatureSlice, InitializedSlice};
use std::any::TypeId;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

#[spore_derive::spore_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Feature slice not registered{}: {message}", format_context(.context))]
    MissingSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    /// The model currently served. Training slices replace it, prediction slices read it.
    pub model: ModelSlot,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

/// Application context handed to every handler through axum `State`.
///
/// Built once at startup; cloning is a reference count bump.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.inner.slices.get(&TypeId::of::<T>())?.state.as_any().downcast_ref::<T>()
    }

    /// # Errors
    /// Returns [`ApiStateError::MissingSlice`] when the feature was not initialized,
    /// which handlers report as a 500.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.get_slice::<T>().ok_or_else(|| ApiStateError::MissingSlice {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    pub fn slice_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.slices.values().map(|slice| slice.name)
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<ApiState> for ModelSlot {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.model.clone()
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    model: Option<ModelSlot>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Must be the same slot the slices were initialized with, otherwise
    /// `/health` and the prediction endpoints disagree about the model.
    #[must_use]
    pub fn model(mut self, model: ModelSlot) -> Self {
        self.model = Some(model);
        self
    }

    /// Registering a second slice of the same type replaces the first.
    #[must_use]
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.insert(slice.id, slice);
        self
    }

    /// # Errors
    /// Returns [`ApiStateError::Validation`] when no config was provided.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "ApiConfig not provided".into(),
            context: None,
        })?;
        let model = self.model.unwrap_or_default();

        debug!(slices = self.slices.len(), model_loaded = model.is_loaded(), "API state assembled");

        Ok(ApiState { inner: Arc::new(ApiStateInner { config, model, slices: self.slices }) })
    }
}
