use crate::domain::filters::Metadata;
use crate::transport::http::handlers::common::not_found;
use crate::transport::http::handlers::{health, herbs};
use crate::transport::http::types::{
    ApiResponse, CreateHerbRequest, HealthView, HerbEnvelope, HerbListView, HerbView, SystemInfo,
    UpdateHerbRequest,
};
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Request bodies larger than this are rejected before decoding.
pub const MAX_BODY_BYTES: usize = 1_048_576;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        herbs::list_herbs_handler,
        herbs::create_herb_handler,
        herbs::show_herb_handler,
        herbs::update_herb_handler,
        herbs::delete_herb_handler
    ),
    components(schemas(
        ApiResponse,
        CreateHerbRequest,
        UpdateHerbRequest,
        HerbView,
        HerbEnvelope,
        HerbListView,
        Metadata,
        HealthView,
        SystemInfo
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/v1/healthcheck", get(health::healthcheck_handler))
        .route(
            "/v1/herbs",
            get(herbs::list_herbs_handler).post(herbs::create_herb_handler),
        )
        .route(
            "/v1/herbs/:id",
            get(herbs::show_herb_handler)
                .patch(herbs::update_herb_handler)
                .delete(herbs::delete_herb_handler),
        )
        .fallback(|| async { not_found() })
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(app_state)
}
