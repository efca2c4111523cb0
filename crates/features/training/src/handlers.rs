use crate::service::Training;
use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::routing::post;
use spore_derive::api_handler;
use spore_kernel::domain::api::{ErrorResponse, FitResponse};
use spore_kernel::domain::constants::TRAINING_TAG;
use spore_kernel::server::{ApiError, ApiState};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Multipart field carrying the dataset.
const UPLOAD_FIELD: &str = "filename";

/// Multipart form of `POST /fit/`.
#[derive(ToSchema)]
#[allow(dead_code)]
struct FitUpload {
    /// `.csv` file, or `.zip` archive containing one.
    #[schema(value_type = String, format = Binary)]
    filename: Vec<u8>,
}

pub(crate) fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(fit_handler)).route("/fit", post(fit_handler))
}

/// Train the model on an uploaded dataset and start serving it.
#[api_handler(
    post,
    path = "/fit/",
    request_body(content = FitUpload, content_type = "multipart/form-data"),
    responses(
        (status = OK, description = "Model trained, saved and installed", body = FitResponse),
        (status = BAD_REQUEST, description = "Unsupported file type or archive without CSV", body = ErrorResponse),
        (status = UNPROCESSABLE_ENTITY, description = "No file uploaded", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Training or persistence failed", body = ErrorResponse),
    ),
    tag = TRAINING_TAG,
)]
pub(crate) async fn fit_handler(
    State(state): State<ApiState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FitResponse>, ApiError> {
    let training = state.try_get_slice::<Training>()?;
    let mut multipart = multipart.map_err(|e| ApiError::unprocessable(e.body_text()))?;

    let mut upload = None;
    while let Some(field) =
        multipart.next_field().await.map_err(|e| ApiError::unprocessable(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        // A plain form value under the upload name is not a file.
        let Some(file_name) = field.file_name().map(ToOwned::to_owned) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(|e| ApiError::unprocessable(e.body_text()))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = upload
        .ok_or_else(|| ApiError::unprocessable(format!("Field required: {UPLOAD_FIELD}")))?;

    training.fit(&file_name, bytes).await?;
    Ok(Json(FitResponse { success: true }))
}
