use crate::Prediction;
use axum::Json;
use axum::extract::State;
use axum::routing::{get, post};
use spore_derive::api_handler;
use spore_kernel::domain::api::{
    ErrorResponse, MushroomsBatch, PredictResponse, ProbaBatchQuery, ProbaResponse, StatusResponse,
};
use spore_kernel::domain::constants::PREDICTION_TAG;
use spore_kernel::domain::mushroom::MushroomRecord;
use spore_kernel::server::{ApiError, ApiState, ValidJson, ValidQuery};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub(crate) fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(predict_handler))
        .routes(routes!(predict_proba_handler))
        .routes(routes!(predict_batch_handler))
        .routes(routes!(predict_proba_batch_handler))
        .routes(routes!(status_handler))
        .route("/predict", get(predict_handler))
        .route("/predict/predict_proba", get(predict_proba_handler))
        .route("/predict/predict_batch", post(predict_batch_handler))
        .route("/predict/predict_proba_batch", get(predict_proba_batch_handler))
        .route("/predict/status", get(status_handler))
}

fn slice(state: &ApiState) -> Result<&Prediction, ApiError> {
    Ok(state.try_get_slice::<Prediction>()?)
}

/// Classify one mushroom as poisonous or edible.
#[api_handler(
    get,
    path = "/predict/",
    params(MushroomRecord),
    responses(
        (status = OK, description = "`poisonous` is null until a model is trained", body = PredictResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Missing or invalid field", body = ErrorResponse),
    ),
    tag = PREDICTION_TAG,
)]
pub(crate) async fn predict_handler(
    State(state): State<ApiState>,
    ValidQuery(record): ValidQuery<MushroomRecord>,
) -> Result<Json<PredictResponse>, ApiError> {
    Ok(Json(slice(&state)?.service.predict(&record)?))
}

/// Probability that one mushroom is poisonous.
#[api_handler(
    get,
    path = "/predict/predict_proba/",
    params(MushroomRecord),
    responses(
        (status = OK, description = "Probability in [0, 1], null until a model is trained", body = ProbaResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Missing or invalid field", body = ErrorResponse),
    ),
    tag = PREDICTION_TAG,
)]
pub(crate) async fn predict_proba_handler(
    State(state): State<ApiState>,
    ValidQuery(record): ValidQuery<MushroomRecord>,
) -> Result<Json<ProbaResponse>, ApiError> {
    Ok(Json(slice(&state)?.service.predict_proba(&record)?))
}

/// Classify a list of mushrooms; one answer per input, in order.
#[api_handler(
    post,
    path = "/predict/predict_batch/",
    request_body = MushroomsBatch,
    responses(
        (status = OK, description = "One entry per mushroom", body = [PredictResponse]),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid body", body = ErrorResponse),
    ),
    tag = PREDICTION_TAG,
)]
pub(crate) async fn predict_batch_handler(
    State(state): State<ApiState>,
    ValidJson(batch): ValidJson<MushroomsBatch>,
) -> Result<Json<Vec<PredictResponse>>, ApiError> {
    Ok(Json(slice(&state)?.service.predict_batch(&batch.mushrooms)?))
}

/// Poisonous probability for column-wise lists of attributes.
///
/// Every attribute is repeated once per mushroom; all lists must have the same length.
#[api_handler(
    get,
    path = "/predict/predict_proba_batch/",
    params(ProbaBatchQuery),
    responses(
        (status = OK, description = "One entry per mushroom", body = [ProbaResponse]),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid value or lists of different lengths", body = ErrorResponse),
    ),
    tag = PREDICTION_TAG,
)]
pub(crate) async fn predict_proba_batch_handler(
    State(state): State<ApiState>,
    ValidQuery(query): ValidQuery<ProbaBatchQuery>,
) -> Result<Json<Vec<ProbaResponse>>, ApiError> {
    let records = query.into_records()?;
    Ok(Json(slice(&state)?.service.predict_proba_batch(&records)?))
}

/// When the served model was trained.
#[api_handler(
    get,
    path = "/predict/status/",
    responses(
        (status = OK, description = "RFC 3339 training timestamp", body = StatusResponse),
        (status = INTERNAL_SERVER_ERROR, description = "No model trained yet", body = ErrorResponse),
    ),
    tag = PREDICTION_TAG,
)]
pub(crate) async fn status_handler(
    State(state): State<ApiState>,
) -> Result<Json<StatusResponse>, ApiError> {
    Ok(Json(slice(&state)?.service.status()?))
}
