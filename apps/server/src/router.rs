use axum::{Json, Router};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::response::Redirect;
use axum::routing::get;
use spore::domain::config::CorsConfig;
use spore::kernel::prelude::ApiState;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

const DOCS_PATH: &str = "/docs";
const SPEC_PATH: &str = "/openapi.json";

#[derive(OpenApi)]
#[openapi(info(
    title = "SporeCheck",
    description = "Mushroom toxicity classifier: train on the secondary mushroom dataset, then ask."
))]
struct ApiDoc;

/// Credentials are allowed, so methods and headers mirror the request instead of `*`.
fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| warn!(origin = %origin, "Skipping malformed CORS origin"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub(crate) fn init(state: ApiState) -> Router {
    let api = ApiDoc::openapi();
    let upload_limit = state.config.server.upload_limit_mb.saturating_mul(1024 * 1024);
    let cors = cors_layer(&state.config.cors);

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(api)
        .merge(spore::server::router::system_router())
        .merge(spore::server::router::feature_router())
        .with_state(state)
        .split_for_parts();

    let spec = api_doc.clone();
    let scalar_routes = Scalar::with_url(DOCS_PATH, api_doc);

    Router::new()
        .route("/", get(|| async { Redirect::temporary(DOCS_PATH) }))
        .route(SPEC_PATH, get(move || async move { Json(spec) }))
        .merge(openapi_routes)
        .merge(scalar_routes)
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
