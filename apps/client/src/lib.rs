//! # SporeCheck client
//!
//! Typed async wrapper over the HTTP API plus the helpers behind the
//! `spore-client` binary.
//!
//! ```no_run
//! # async fn example() -> Result<(), spore_client::ClientError> {
//! let client = spore_client::SporeClient::new("http://localhost:8000")?;
//! let status = client.status().await?;
//! println!("model trained at {}", status.model_trained_at);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod records;

pub use crate::error::{ClientError, ClientErrorExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use spore_domain::api::{
    ErrorResponse, FitResponse, MushroomsBatch, PredictResponse, ProbaResponse, StatusResponse,
};
use spore_domain::mushroom::MushroomRecord;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_URL: &str = "http://localhost:8000";

/// Client for one SporeCheck server.
#[derive(Debug, Clone)]
pub struct SporeClient {
    http: Client,
    base: Url,
}

impl SporeClient {
    /// # Errors
    /// Returns [`ClientError::Input`] for a malformed base URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|e| ClientError::Input {
            message: format!("'{base_url}' is not a URL: {e}").into(),
            context: None,
        })?;
        // Training runs inside the request, so the timeout has to be generous.
        let http = Client::builder()
            .timeout(Duration::from_secs(600))
            .build()
            .context("Building HTTP client")?;
        Ok(Self { http, base })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base.join(path).map_err(|e| ClientError::Input {
            message: format!("cannot join '{path}' to {}: {e}", self.base).into(),
            context: None,
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        what: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await.context(what)?;
        let status = response.status();
        debug!(status = status.as_u16(), what, "Response received");

        if status.is_success() {
            return response.json::<T>().await.context(what);
        }

        let body = response.text().await.context(what)?;
        let detail = serde_json::from_str::<ErrorResponse>(&body).map_or(body, |e| e.detail);
        Err(ClientError::Api { status: status.as_u16(), detail, context: Some(what.into()) })
    }

    /// `GET /predict/`
    ///
    /// # Errors
    /// Transport failures and non-success replies.
    pub async fn predict(&self, record: &MushroomRecord) -> Result<PredictResponse, ClientError> {
        let request = self.http.get(self.url("/predict/")?).query(record);
        self.send("predict", request).await
    }

    /// `GET /predict/predict_proba/`
    ///
    /// # Errors
    /// Transport failures and non-success replies.
    pub async fn predict_proba(&self, record: &MushroomRecord) -> Result<ProbaResponse, ClientError> {
        let request = self.http.get(self.url("/predict/predict_proba/")?).query(record);
        self.send("predict_proba", request).await
    }

    /// `POST /predict/predict_batch/`
    ///
    /// # Errors
    /// Transport failures and non-success replies.
    pub async fn predict_batch(
        &self,
        mushrooms: Vec<MushroomRecord>,
    ) -> Result<Vec<PredictResponse>, ClientError> {
        let body = MushroomsBatch { mushrooms };
        let request = self.http.post(self.url("/predict/predict_batch/")?).json(&body);
        self.send("predict_batch", request).await
    }

    /// `GET /predict/predict_proba_batch/` with one repeated parameter per field.
    ///
    /// # Errors
    /// Transport failures and non-success replies.
    pub async fn predict_proba_batch(
        &self,
        records: &[MushroomRecord],
    ) -> Result<Vec<ProbaResponse>, ClientError> {
        let pairs = records::column_query(records);
        let request = self.http.get(self.url("/predict/predict_proba_batch/")?).query(&pairs);
        self.send("predict_proba_batch", request).await
    }

    /// `GET /predict/status/`
    ///
    /// # Errors
    /// Transport failures and non-success replies (500 before the first training).
    pub async fn status(&self) -> Result<StatusResponse, ClientError> {
        let request = self.http.get(self.url("/predict/status/")?);
        self.send("status", request).await
    }

    /// `POST /fit/` with `path` uploaded as the `filename` field.
    ///
    /// # Errors
    /// I/O failures reading `path`, transport failures and non-success replies.
    pub async fn fit(&self, path: &Path) -> Result<FitResponse, ClientError> {
        let bytes = tokio::fs::read(path).await.context(format!("Reading {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("dataset.csv")
            .to_owned();

        info!(file = %file_name, bytes = bytes.len(), "Uploading dataset");
        let form = Form::new().part("filename", Part::bytes(bytes).file_name(file_name));
        let request = self.http.post(self.url("/fit/")?).multipart(form);
        self.send("fit", request).await
    }
}
